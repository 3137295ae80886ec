//! Configuration loading/management
//!
//! Every tunable of a run lives in [`SystemConfig`]. Nothing downstream bakes
//! in its own literals; components are built from this struct.

use crate::actuator::{AngleActuator, DerivativeMode, PIDController, PidGains};
use crate::error::{Result, SimError};
use crate::simulation::{FrictionMode, PhysicsSimulation, SimulationParams, SimulationState};
use crate::sweep::{GainRange, SweepSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/system_config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // Physics
    pub mass: f64,
    pub delta_t: f64,
    pub initial_angle: f64,
    pub initial_velocity: f64,
    pub initial_position: f64,
    pub friction_coefficient: f64,
    pub friction_mode: FrictionMode,

    // Actuator (degrees)
    pub min_angle: f64,
    pub max_angle: f64,
    pub max_angle_change: f64,

    // Controller
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub initial_setpoint: f64,
    pub integral_limit: Option<f64>,
    pub derivative_mode: DerivativeMode,

    // Scoring
    pub weight_factor: f64,

    // Interactive sessions
    pub max_external_force: f64,

    pub sweep: SweepSettings,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            delta_t: 1.0 / 60.0,
            initial_angle: 0.0,
            initial_velocity: 0.0,
            initial_position: 0.0,
            friction_coefficient: 0.04,
            friction_mode: FrictionMode::WhenMoving,
            min_angle: -60.0,
            max_angle: 60.0,
            max_angle_change: 3.0,
            kp: -10.0,
            ki: 0.0,
            kd: -600.0,
            initial_setpoint: 0.0,
            integral_limit: None,
            derivative_mode: DerivativeMode::PerTick,
            weight_factor: 0.5,
            max_external_force: 3.0,
            sweep: SweepSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    pub kp: GainRange,
    pub ki: GainRange,
    pub kd: GainRange,
    /// Worker threads; 0 means one per available core.
    pub workers: usize,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            kp: GainRange::new(-20.0, -5.0, 5.0),
            ki: GainRange::fixed(0.0),
            kd: GainRange::new(-800.0, -200.0, 200.0),
            workers: 0,
        }
    }
}

impl SystemConfig {
    /// Checks every scalar precondition the components rely on.
    pub fn validate(&self) -> Result<()> {
        self.simulation_params()?;
        if !(self.weight_factor >= 0.0) {
            return Err(SimError::invalid_argument(format!(
                "weight_factor must be >= 0, got {}",
                self.weight_factor
            )));
        }
        if let Some(limit) = self.integral_limit {
            if limit.is_nan() {
                return Err(SimError::invalid_argument("integral_limit must be a number, got NaN"));
            }
        }
        if !(self.max_external_force >= 0.0) {
            return Err(SimError::invalid_argument(format!(
                "max_external_force must be >= 0, got {}",
                self.max_external_force
            )));
        }
        Ok(())
    }

    pub fn actuator(&self) -> Result<AngleActuator> {
        AngleActuator::new(self.min_angle, self.max_angle, self.max_angle_change)
    }

    pub fn simulation_params(&self) -> Result<SimulationParams> {
        SimulationParams::new(self.mass, self.delta_t, self.actuator()?)?
            .with_friction(self.friction_coefficient, self.friction_mode)
            .validated()
    }

    pub fn gains(&self) -> PidGains {
        PidGains::new(self.kp, self.ki, self.kd)
    }

    pub fn build_simulation(&self) -> Result<PhysicsSimulation> {
        let state = SimulationState::from_degrees(
            self.initial_angle,
            self.initial_velocity,
            self.initial_position,
        );
        PhysicsSimulation::with_state(self.simulation_params()?, state)
    }

    /// Controller with the configured gains and the given initial setpoint.
    pub fn build_controller_for(&self, gains: PidGains, setpoint: f64) -> PIDController {
        let pid = PIDController::from_gains(gains, setpoint);
        match self.integral_limit {
            Some(limit) => pid.with_integral_limit(limit),
            None => pid,
        }
    }

    pub fn build_controller(&self) -> PIDController {
        self.build_controller_for(self.gains(), self.initial_setpoint)
    }

    pub fn sweep_spec(&self) -> SweepSpec {
        SweepSpec {
            kp: self.sweep.kp,
            ki: self.sweep.ki,
            kd: self.sweep.kd,
            workers: self.sweep.workers,
        }
    }
}

// ============================================================================
// CONFIG FILE LOADING
// ============================================================================

pub fn parse_config(source: &str) -> Result<SystemConfig> {
    let cfg: SystemConfig =
        toml::from_str(source).map_err(|e| SimError::Config(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<SystemConfig> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| SimError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_config(&source)
}

/// Loads `path` if it exists, otherwise falls back to the defaults.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<SystemConfig> {
    let path = path.as_ref();
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file missing, using defaults");
        Ok(SystemConfig::default())
    }
}
