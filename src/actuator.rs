//! Actuator module - PID control and the seesaw tilt actuator

pub mod angle;
pub mod controller;

pub use angle::AngleActuator;
pub use controller::{
    pid_tick, ControllerState, Derivative, DerivativeMode, PIDController, PidGains,
};
