//! Control loop - drives a PID controller and a simulation one tick per setpoint
//!
//! Strictly sequential: every command depends on the previous tick's position.

use crate::actuator::{DerivativeMode, PIDController};
use crate::error::{Result, SimError};
use crate::simulation::PhysicsSimulation;
use serde::{Deserialize, Serialize};

/// One row of a run; the same columns are persisted by [`crate::log`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: usize,
    pub setpoint: f64,
    pub position: f64,
    pub angle: f64,
    pub velocity: f64,
    pub external_force: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    records: Vec<TickRecord>,
}

impl Trajectory {
    pub fn with_capacity(ticks: usize) -> Self {
        Self {
            records: Vec::with_capacity(ticks),
        }
    }

    pub fn push(&mut self, record: TickRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.position).collect()
    }

    pub fn angles(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.angle).collect()
    }

    pub fn setpoints(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.setpoint).collect()
    }

    pub fn last(&self) -> Option<&TickRecord> {
        self.records.last()
    }

    /// Scores this trajectory against the setpoints it was driven with.
    pub fn fitness(&self, weight_factor: f64) -> Result<f64> {
        crate::fitness::evaluate(&self.positions(), &self.setpoints(), weight_factor)
    }
}

pub struct ControlLoopRunner<'a> {
    controller: &'a mut PIDController,
    simulation: &'a mut PhysicsSimulation,
    derivative_mode: DerivativeMode,
}

impl<'a> ControlLoopRunner<'a> {
    pub fn new(controller: &'a mut PIDController, simulation: &'a mut PhysicsSimulation) -> Self {
        Self {
            controller,
            simulation,
            derivative_mode: DerivativeMode::PerTick,
        }
    }

    pub fn derivative_mode(mut self, mode: DerivativeMode) -> Self {
        self.derivative_mode = mode;
        self
    }

    /// Runs one tick per setpoint. `external_force`, when given, must be
    /// index-aligned with `setpoints`; nothing is mutated if it is not.
    pub fn run(&mut self, setpoints: &[f64], external_force: Option<&[f64]>) -> Result<Trajectory> {
        if let Some(forces) = external_force {
            if forces.len() != setpoints.len() {
                return Err(SimError::invalid_input(format!(
                    "setpoints ({}) and external forces ({}) differ in length",
                    setpoints.len(),
                    forces.len()
                )));
            }
        }

        let delta_t = self.simulation.delta_t();
        let mut trajectory = Trajectory::with_capacity(setpoints.len());
        let mut last_position = 0.0;

        for (tick, &setpoint) in setpoints.iter().enumerate() {
            let force = external_force.map_or(0.0, |f| f[tick]);

            self.controller.set_setpoint(setpoint);
            let command = match self.derivative_mode {
                DerivativeMode::PerTick => self.controller.next(last_position),
                DerivativeMode::TimeBased => self.controller.next_time_based(last_position, delta_t),
            };
            let out = self.simulation.next(Some(command), force);
            last_position = out.position;

            trajectory.push(TickRecord {
                tick,
                setpoint,
                position: out.position,
                angle: out.angle,
                velocity: out.velocity,
                external_force: force,
            });
        }

        tracing::debug!(
            ticks = trajectory.len(),
            final_position = last_position,
            "control loop finished"
        );
        Ok(trajectory)
    }
}
