//! Simulation module - Ball-on-seesaw dynamics
//!
//! Fixed-step semi-implicit Euler. The angle is held in radians internally and
//! exposed in degrees. `mass` is only divided by, never checked per tick; the
//! constructors reject non-positive values once.

use crate::actuator::AngleActuator;
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

pub const GRAVITY_CONSTANT: f64 = 9.81;
pub const ROLLING_FRICTION_COEFFICIENT: f64 = 0.04;

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrictionMode {
    /// No friction while the ball is exactly at rest.
    #[default]
    WhenMoving,
    /// Friction always acts; at rest it points the same way as for positive velocity.
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub mass: f64,
    pub delta_t: f64,
    pub friction_coefficient: f64,
    pub friction_mode: FrictionMode,
    pub actuator: AngleActuator,
}

impl SimulationParams {
    pub fn new(mass: f64, delta_t: f64, actuator: AngleActuator) -> Result<Self> {
        Self {
            mass,
            delta_t,
            friction_coefficient: ROLLING_FRICTION_COEFFICIENT,
            friction_mode: FrictionMode::WhenMoving,
            actuator,
        }
        .validated()
    }

    pub fn with_friction(mut self, coefficient: f64, mode: FrictionMode) -> Self {
        self.friction_coefficient = coefficient;
        self.friction_mode = mode;
        self
    }

    pub fn validated(self) -> Result<Self> {
        if !(self.mass > 0.0) {
            return Err(SimError::invalid_argument(format!(
                "mass must be > 0, got {}",
                self.mass
            )));
        }
        if !(self.delta_t > 0.0) {
            return Err(SimError::invalid_argument(format!(
                "delta_t must be > 0, got {}",
                self.delta_t
            )));
        }
        if !(self.friction_coefficient >= 0.0) {
            return Err(SimError::invalid_argument(format!(
                "friction_coefficient must be >= 0, got {}",
                self.friction_coefficient
            )));
        }
        Ok(self)
    }
}

// ============================================================================
// STATE AND TICK I/O
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationState {
    /// Radians
    pub angle: f64,
    pub velocity: f64,
    pub position: f64,
}

impl SimulationState {
    pub fn from_degrees(angle: f64, velocity: f64, position: f64) -> Self {
        Self {
            angle: angle.to_radians(),
            velocity,
            position,
        }
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInput {
    /// Commanded angle in degrees; `None` keeps the current angle.
    pub angle: Option<f64>,
    pub external_force: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    /// Degrees
    pub angle: f64,
    pub velocity: f64,
    pub position: f64,
}

/// Advance one tick.
pub fn step(
    params: &SimulationParams,
    state: SimulationState,
    input: TickInput,
) -> (SimulationState, TickOutput) {
    let angle = match input.angle {
        Some(requested) => params
            .actuator
            .apply(state.angle.to_degrees(), requested)
            .to_radians(),
        None => state.angle,
    };

    let mut friction_force = params.friction_coefficient * GRAVITY_CONSTANT * angle.cos();
    if state.velocity < 0.0 {
        friction_force = -friction_force;
    } else if state.velocity == 0.0 && params.friction_mode == FrictionMode::WhenMoving {
        friction_force = 0.0;
    }

    let acceleration = -(GRAVITY_CONSTANT * angle.sin() + friction_force) / params.mass
        + input.external_force / params.mass;

    let velocity = state.velocity + acceleration * params.delta_t;
    let position = state.position + velocity * params.delta_t;

    let next = SimulationState {
        angle,
        velocity,
        position,
    };
    let output = TickOutput {
        angle: angle.to_degrees(),
        velocity,
        position,
    };
    (next, output)
}

// ============================================================================
// PHYSICS SIMULATION - Owning wrapper around `step`
// ============================================================================

#[derive(Debug, Clone)]
pub struct PhysicsSimulation {
    params: SimulationParams,
    state: SimulationState,
}

impl PhysicsSimulation {
    pub fn new(params: SimulationParams) -> Result<Self> {
        Ok(Self {
            params: params.validated()?,
            state: SimulationState::default(),
        })
    }

    /// The initial angle is clamped into the actuator range.
    pub fn with_state(params: SimulationParams, state: SimulationState) -> Result<Self> {
        let params = params.validated()?;
        let angle = params
            .actuator
            .clamp_range(state.angle.to_degrees())
            .to_radians();
        Ok(Self {
            params,
            state: SimulationState { angle, ..state },
        })
    }

    pub fn next(&mut self, angle: Option<f64>, external_force: f64) -> TickOutput {
        let (state, output) = step(
            &self.params,
            self.state,
            TickInput {
                angle,
                external_force,
            },
        );
        self.state = state;
        output
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn delta_t(&self) -> f64 {
        self.params.delta_t
    }

    /// Zeroes angle, velocity and position; parameters persist.
    pub fn reset(&mut self) {
        self.state = SimulationState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: FrictionMode) -> SimulationParams {
        let act = AngleActuator::new(-60.0, 60.0, 3.0).unwrap();
        SimulationParams::new(1.0, 0.1, act)
            .unwrap()
            .with_friction(0.04, mode)
    }

    #[test]
    fn resting_ball_feels_friction_only_in_always_mode() {
        let (_, moving) = step(&params(FrictionMode::WhenMoving), SimulationState::default(), TickInput::default());
        assert_eq!(moving.position, 0.0);

        let (_, always) = step(&params(FrictionMode::Always), SimulationState::default(), TickInput::default());
        let expected_v = -(0.04 * GRAVITY_CONSTANT) * 0.1;
        assert!((always.velocity - expected_v).abs() < 1e-12);
        assert!((always.position - expected_v * 0.1).abs() < 1e-12);
    }

    #[test]
    fn friction_opposes_negative_velocity() {
        let state = SimulationState {
            velocity: -1.0,
            ..SimulationState::default()
        };
        let (_, out) = step(&params(FrictionMode::WhenMoving), state, TickInput::default());
        // decelerating a leftward ball pushes velocity back up toward zero
        assert!(out.velocity > -1.0);
    }

    #[test]
    fn external_force_scales_with_inverse_mass() {
        let act = AngleActuator::new(-60.0, 60.0, 3.0).unwrap();
        let heavy = SimulationParams::new(2.0, 1.0, act)
            .unwrap()
            .with_friction(0.0, FrictionMode::WhenMoving);
        let input = TickInput {
            angle: None,
            external_force: 4.0,
        };
        let (_, out) = step(&heavy, SimulationState::default(), input);
        assert!((out.velocity - 2.0).abs() < 1e-12);
    }

    #[test]
    fn initial_angle_is_range_clamped() {
        let sim = PhysicsSimulation::with_state(
            params(FrictionMode::WhenMoving),
            SimulationState::from_degrees(90.0, 0.0, 0.0),
        )
        .unwrap();
        assert!((sim.state().angle_degrees() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_delta_t_rejected() {
        let act = AngleActuator::new(-60.0, 60.0, 3.0).unwrap();
        assert!(SimulationParams::new(1.0, 0.0, act).is_err());
        assert!(SimulationParams::new(-1.0, 0.1, act).is_err());
    }

    #[test]
    fn hand_built_params_are_checked_on_construction() {
        let act = AngleActuator::new(-60.0, 60.0, 3.0).unwrap();
        let zero_mass = SimulationParams {
            mass: 0.0,
            delta_t: 0.1,
            friction_coefficient: 0.04,
            friction_mode: FrictionMode::WhenMoving,
            actuator: act,
        };
        assert!(matches!(
            PhysicsSimulation::new(zero_mass),
            Err(SimError::InvalidArgument(_))
        ));

        let negative_friction = params(FrictionMode::Always).with_friction(-0.1, FrictionMode::Always);
        assert!(PhysicsSimulation::new(negative_friction).is_err());
    }
}
