//! Setpoint schedules and external-force disturbances for runs and sweeps

use crate::error::{Result, SimError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// SETPOINT PROFILE - Piecewise-constant target schedules
// ============================================================================

pub struct SetpointProfile;

impl SetpointProfile {
    pub fn constant(level: f64, ticks: usize) -> Vec<f64> {
        vec![level; ticks]
    }

    /// Concatenates `ticks_per_level` copies of each level, in order.
    pub fn steps(levels: &[f64], ticks_per_level: usize) -> Vec<f64> {
        levels
            .iter()
            .flat_map(|&level| std::iter::repeat(level).take(ticks_per_level))
            .collect()
    }

    /// Twenty seconds at +5 then twenty at -5.
    pub fn default_steps(fps: usize) -> Vec<f64> {
        Self::steps(&[5.0, -5.0], 20 * fps)
    }
}

// ============================================================================
// DISTURBANCE GENERATOR - Seeded external force on the ball
// ============================================================================

pub struct DisturbanceGenerator {
    rng: StdRng,
    sequence_counter: u64,
    base_force: f64,
    noise_amplitude: f64,
}

impl DisturbanceGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sequence_counter: 0,
            base_force: 0.0,
            noise_amplitude: 0.5,
        }
    }

    /// `noise_amplitude` must be finite and >= 0; samples fall in
    /// `base_force ± noise_amplitude`.
    pub fn with_noise(mut self, base_force: f64, noise_amplitude: f64) -> Result<Self> {
        if !base_force.is_finite() {
            return Err(SimError::invalid_argument(format!(
                "base force must be finite, got {base_force}"
            )));
        }
        if !(noise_amplitude >= 0.0 && noise_amplitude.is_finite()) {
            return Err(SimError::invalid_argument(format!(
                "noise amplitude must be finite and >= 0, got {noise_amplitude}"
            )));
        }
        self.base_force = base_force;
        self.noise_amplitude = noise_amplitude;
        Ok(self)
    }

    pub fn base_force(&self) -> f64 {
        self.base_force
    }

    pub fn noise_amplitude(&self) -> f64 {
        self.noise_amplitude
    }

    pub fn generate(&mut self) -> f64 {
        self.sequence_counter += 1;
        if self.noise_amplitude == 0.0 {
            return self.base_force;
        }
        let noise = self.rng.gen_range(-self.noise_amplitude..self.noise_amplitude);
        self.base_force + noise
    }

    pub fn sequence(&mut self, ticks: usize) -> Vec<f64> {
        (0..ticks).map(|_| self.generate()).collect()
    }

    pub fn get_sequence(&self) -> u64 {
        self.sequence_counter
    }

    /// Shifts the base force for all following samples.
    pub fn inject_disturbance(&mut self, force_delta: f64) {
        self.base_force += force_delta;
    }

    pub fn quiet(ticks: usize) -> Vec<f64> {
        vec![0.0; ticks]
    }
}
