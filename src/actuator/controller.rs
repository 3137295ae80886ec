use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64, // Proportional
    pub ki: f64, // Integral
    pub kd: f64, // Derivative
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Per-tick state of a PID loop. `integral` and `prev_error` advance exactly
/// once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub setpoint: f64,
    pub integral: f64,
    pub prev_error: f64,
    pub error: f64,
}

impl ControllerState {
    pub fn new(setpoint: f64) -> Self {
        Self {
            setpoint,
            ..Self::default()
        }
    }
}

/// How the derivative term is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeMode {
    /// `error - prev_error`, unit-less per tick
    #[default]
    PerTick,
    /// `(error - prev_error) / time_interval`
    TimeBased,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derivative {
    PerTick,
    Interval(f64),
}

/// One controller tick as a pure function.
///
/// The integral accumulates without bound unless `integral_limit` is set, in
/// which case it is clamped to `[-|limit|, |limit|]` after accumulation.
pub fn pid_tick(
    gains: &PidGains,
    integral_limit: Option<f64>,
    state: ControllerState,
    measured_value: f64,
    derivative: Derivative,
) -> (ControllerState, f64) {
    let error = state.setpoint - measured_value;

    let mut integral = state.integral + error;
    if let Some(limit) = integral_limit {
        let limit = limit.abs();
        integral = integral.max(-limit).min(limit);
    }

    let derivative_term = match derivative {
        Derivative::PerTick => error - state.prev_error,
        Derivative::Interval(dt) if dt > 0.0 => (error - state.prev_error) / dt,
        Derivative::Interval(_) => 0.0,
    };

    let command = gains.kp * error + gains.ki * integral + gains.kd * derivative_term;

    let next = ControllerState {
        setpoint: state.setpoint,
        integral,
        prev_error: error,
        error,
    };
    (next, command)
}

#[derive(Debug, Clone)]
pub struct PIDController {
    gains: PidGains,
    state: ControllerState,

    // Anti-windup, off unless requested
    integral_limit: Option<f64>,
}

impl PIDController {
    pub fn new(kp: f64, ki: f64, kd: f64, setpoint: f64) -> Self {
        Self::from_gains(PidGains::new(kp, ki, kd), setpoint)
    }

    pub fn from_gains(gains: PidGains, setpoint: f64) -> Self {
        Self {
            gains,
            state: ControllerState::new(setpoint),
            integral_limit: None,
        }
    }

    /// A NaN limit leaves the integral unbounded.
    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit).filter(|l| !l.is_nan());
        self
    }

    /// Per-tick form: derivative is `error - prev_error`.
    pub fn next(&mut self, measured_value: f64) -> f64 {
        self.advance(measured_value, Derivative::PerTick)
    }

    /// Time-based form: derivative is divided by `time_interval`.
    pub fn next_time_based(&mut self, measured_value: f64, time_interval: f64) -> f64 {
        self.advance(measured_value, Derivative::Interval(time_interval))
    }

    fn advance(&mut self, measured_value: f64, derivative: Derivative) -> f64 {
        let (state, command) = pid_tick(
            &self.gains,
            self.integral_limit,
            self.state,
            measured_value,
            derivative,
        );
        self.state = state;
        command
    }

    pub fn get_error(&self) -> f64 {
        self.state.error
    }

    pub fn setpoint(&self) -> f64 {
        self.state.setpoint
    }

    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.state.setpoint = setpoint;
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn integral_limit(&self) -> Option<f64> {
        self.integral_limit
    }

    /// Clears accumulated error; gains and setpoint stay.
    pub fn reset(&mut self) {
        self.state.integral = 0.0;
        self.state.prev_error = 0.0;
        self.state.error = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only() {
        let mut pid = PIDController::new(2.0, 0.0, 0.0, 1.0);
        assert!((pid.next(0.25) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn integral_accumulates_raw_error() {
        let mut pid = PIDController::new(0.0, 1.0, 0.0, 1.0);
        pid.next(0.0);
        let out = pid.next(0.0);
        assert!((out - 2.0).abs() < 1e-12);
    }

    #[test]
    fn time_based_derivative_divides_by_interval() {
        let mut per_tick = PIDController::new(0.0, 0.0, 1.0, 3.0);
        let mut timed = per_tick.clone();
        let a = per_tick.next(0.0);
        let b = timed.next_time_based(0.0, 0.5);
        assert!((a - 3.0).abs() < 1e-12);
        assert!((b - 6.0).abs() < 1e-12);
    }

    #[test]
    fn non_positive_interval_drops_derivative() {
        let mut pid = PIDController::new(0.0, 0.0, 1.0, 3.0);
        assert_eq!(pid.next_time_based(0.0, 0.0), 0.0);
    }

    #[test]
    fn integral_limit_clamps_both_signs() {
        let mut pid = PIDController::new(0.0, 1.0, 0.0, 10.0).with_integral_limit(-15.0);
        for _ in 0..5 {
            pid.next(0.0);
        }
        assert_eq!(pid.state().integral, 15.0);

        pid.set_setpoint(-10.0);
        for _ in 0..10 {
            pid.next(0.0);
        }
        assert_eq!(pid.state().integral, -15.0);
    }

    #[test]
    fn nan_integral_limit_is_ignored() {
        let mut pid = PIDController::new(0.0, 1.0, 0.0, 1.0).with_integral_limit(f64::NAN);
        assert_eq!(pid.integral_limit(), None);
        assert_eq!(pid.next(0.0), 1.0);

        let gains = PidGains::new(0.0, 1.0, 0.0);
        let (state, command) = pid_tick(
            &gains,
            Some(f64::NAN),
            ControllerState::new(2.0),
            0.0,
            Derivative::PerTick,
        );
        assert_eq!(state.integral, 2.0);
        assert_eq!(command, 2.0);
    }
}
