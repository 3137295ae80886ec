use crate::error::{Result, SimError};

/// Seesaw tilt actuator. Requests are first clamped to the mechanical range,
/// then the step from the current angle is rate limited. All values in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleActuator {
    min_angle: f64,
    max_angle: f64,
    max_angle_change: f64,
}

impl AngleActuator {
    pub fn new(min_angle: f64, max_angle: f64, max_angle_change: f64) -> Result<Self> {
        if !(min_angle <= max_angle) {
            return Err(SimError::invalid_argument(format!(
                "min_angle ({min_angle}) must not exceed max_angle ({max_angle})"
            )));
        }
        if !(max_angle_change >= 0.0) {
            return Err(SimError::invalid_argument(format!(
                "max_angle_change must be >= 0, got {max_angle_change}"
            )));
        }
        Ok(Self {
            min_angle,
            max_angle,
            max_angle_change,
        })
    }

    pub fn min_angle(&self) -> f64 {
        self.min_angle
    }

    pub fn max_angle(&self) -> f64 {
        self.max_angle
    }

    pub fn max_angle_change(&self) -> f64 {
        self.max_angle_change
    }

    pub fn clamp_range(&self, angle: f64) -> f64 {
        angle.clamp(self.min_angle, self.max_angle)
    }

    /// Angle reached this tick when `requested` is commanded from `current`.
    pub fn apply(&self, current: f64, requested: f64) -> f64 {
        let target = self.clamp_range(requested);
        let step = (target - current).clamp(-self.max_angle_change, self.max_angle_change);
        current + step
    }
}
