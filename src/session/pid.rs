use super::{ControlMode, Frame, InputEvent, MarkerState, Session, FORCE_STEP};
use crate::actuator::{DerivativeMode, PIDController};
use crate::control_loop::{TickRecord, Trajectory};
use crate::simulation::PhysicsSimulation;

/// Controller balances the ball on the selected marker. Tilt keys are
/// ignored; force keys still disturb the ball.
pub struct PidSession {
    controller: PIDController,
    simulation: PhysicsSimulation,
    derivative_mode: DerivativeMode,
    command: f64,
    external_force: f64,
    max_external_force: f64,
    marker: MarkerState,
    history: Trajectory,
}

impl PidSession {
    pub fn new(
        controller: PIDController,
        simulation: PhysicsSimulation,
        max_external_force: f64,
    ) -> Self {
        let command = simulation.state().angle_degrees();
        Self {
            controller,
            simulation,
            derivative_mode: DerivativeMode::PerTick,
            command,
            external_force: 0.0,
            max_external_force: max_external_force.abs(),
            marker: MarkerState::default(),
            history: Trajectory::default(),
        }
    }

    pub fn derivative_mode(mut self, mode: DerivativeMode) -> Self {
        self.derivative_mode = mode;
        self
    }

    pub fn controller(&self) -> &PIDController {
        &self.controller
    }

    /// Angle that will be commanded on the next tick.
    pub fn pending_command(&self) -> f64 {
        self.command
    }
}

impl Session for PidSession {
    fn mode(&self) -> ControlMode {
        ControlMode::Pid
    }

    fn handle_input(&mut self, event: InputEvent) {
        if self.marker.handle(event) {
            return;
        }
        match event {
            InputEvent::ForceLeft if self.external_force - FORCE_STEP > -self.max_external_force => {
                self.external_force -= FORCE_STEP
            }
            InputEvent::ForceRight if self.external_force + FORCE_STEP < self.max_external_force => {
                self.external_force += FORCE_STEP
            }
            _ => {}
        }
    }

    // Simulate with the pending command first, then let the controller react
    // to the new position.
    fn advance_tick(&mut self) -> TickRecord {
        let out = self.simulation.next(Some(self.command), self.external_force);

        let setpoint = self.marker.setpoint();
        self.controller.set_setpoint(setpoint);
        self.command = match self.derivative_mode {
            DerivativeMode::PerTick => self.controller.next(out.position),
            DerivativeMode::TimeBased => self
                .controller
                .next_time_based(out.position, self.simulation.delta_t()),
        };

        let record = TickRecord {
            tick: self.history.len(),
            setpoint,
            position: out.position,
            angle: out.angle,
            velocity: out.velocity,
            external_force: self.external_force,
        };
        self.history.push(record);
        record
    }

    fn render(&self) -> Frame {
        let state = self.simulation.state();
        Frame {
            tick: self.history.len(),
            angle: state.angle_degrees(),
            velocity: state.velocity,
            position: state.position,
            external_force: self.external_force,
            setpoint: self.marker.setpoint(),
            marker: self.marker,
        }
    }

    fn history(&self) -> &Trajectory {
        &self.history
    }
}
