use super::{ControlMode, Frame, InputEvent, MarkerState, Session, ANGLE_STEP, FORCE_STEP};
use crate::control_loop::{TickRecord, Trajectory};
use crate::simulation::PhysicsSimulation;

/// Operator tilts the seesaw and pushes the ball directly.
pub struct KeyboardSession {
    simulation: PhysicsSimulation,
    angle: f64,
    external_force: f64,
    max_external_force: f64,
    marker: MarkerState,
    history: Trajectory,
}

impl KeyboardSession {
    pub fn new(simulation: PhysicsSimulation, initial_angle: f64, max_external_force: f64) -> Self {
        Self {
            simulation,
            angle: initial_angle,
            external_force: 0.0,
            max_external_force: max_external_force.abs(),
            marker: MarkerState::default(),
            history: Trajectory::default(),
        }
    }

    pub fn commanded_angle(&self) -> f64 {
        self.angle
    }

    pub fn external_force(&self) -> f64 {
        self.external_force
    }
}

impl Session for KeyboardSession {
    fn mode(&self) -> ControlMode {
        ControlMode::Keyboard
    }

    fn handle_input(&mut self, event: InputEvent) {
        if self.marker.handle(event) {
            return;
        }
        let actuator = self.simulation.params().actuator;
        match event {
            InputEvent::TiltLeft if self.angle < actuator.max_angle() => self.angle += ANGLE_STEP,
            InputEvent::TiltRight if self.angle > actuator.min_angle() => self.angle -= ANGLE_STEP,
            InputEvent::ForceLeft if self.external_force - FORCE_STEP > -self.max_external_force => {
                self.external_force -= FORCE_STEP
            }
            InputEvent::ForceRight if self.external_force + FORCE_STEP < self.max_external_force => {
                self.external_force += FORCE_STEP
            }
            _ => {}
        }
    }

    fn advance_tick(&mut self) -> TickRecord {
        let out = self.simulation.next(Some(self.angle), self.external_force);
        let record = TickRecord {
            tick: self.history.len(),
            setpoint: self.marker.setpoint(),
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
