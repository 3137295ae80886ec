//! Parameter sweep - exhaustive grid over PID gains, ranked by fitness
//!
//! Each candidate is independent, so candidates are fanned out to worker
//! threads over a job channel. Workers build their own controller and
//! simulation; nothing mutable is shared apart from the timing histograms.

use crate::actuator::PidGains;
use crate::config::SystemConfig;
use crate::control_loop::ControlLoopRunner;
use crate::error::{Result, SimError};
use crate::fitness;
use crate::metrics::{MetricsReport, TimingMetrics};
use crossbeam::channel::unbounded;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;

// ============================================================================
// GAIN GRID
// ============================================================================

/// Upper bound on values per range and on candidates per sweep.
pub const MAX_CANDIDATES: usize = 1_000_000;

/// Inclusive arithmetic range `start, start + step, ..., <= stop`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl GainRange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn fixed(value: f64) -> Self {
        Self::new(value, value, 1.0)
    }

    pub fn values(&self) -> Result<Vec<f64>> {
        if !(self.start.is_finite() && self.stop.is_finite()) {
            return Err(SimError::invalid_argument(format!(
                "gain range bounds must be finite, got {}..={}",
                self.start, self.stop
            )));
        }
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(SimError::invalid_argument(format!(
                "gain range step must be > 0, got {}",
                self.step
            )));
        }
        if self.start > self.stop {
            return Err(SimError::invalid_argument(format!(
                "gain range start {} exceeds stop {}",
                self.start, self.stop
            )));
        }
        // tolerance keeps `stop` in the grid despite accumulated rounding
        let span = ((self.stop - self.start) / self.step + 1e-9).floor();
        if !(span < MAX_CANDIDATES as f64) {
            return Err(SimError::invalid_argument(format!(
                "gain range {}..={} step {} exceeds {MAX_CANDIDATES} values",
                self.start, self.stop, self.step
            )));
        }
        let count = span as usize + 1;
        Ok((0..count)
            .map(|i| self.start + i as f64 * self.step)
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepSpec {
    pub kp: GainRange,
    pub ki: GainRange,
    pub kd: GainRange,
    /// 0 picks one worker per available core.
    pub workers: usize,
}

impl SweepSpec {
    /// Cartesian product in kp-major order.
    pub fn candidates(&self) -> Result<Vec<PidGains>> {
        let kps = self.kp.values()?;
        let kis = self.ki.values()?;
        let kds = self.kd.values()?;

        let total = kps
            .len()
            .checked_mul(kis.len())
            .and_then(|n| n.checked_mul(kds.len()))
            .filter(|&n| n <= MAX_CANDIDATES)
            .ok_or_else(|| {
                SimError::invalid_argument(format!(
                    "gain grid {}x{}x{} exceeds {MAX_CANDIDATES} candidates",
                    kps.len(),
                    kis.len(),
                    kds.len()
                ))
            })?;

        let mut out = Vec::with_capacity(total);
        for &kp in &kps {
            for &ki in &kis {
                for &kd in &kds {
                    out.push(PidGains::new(kp, ki, kd));
                }
            }
        }
        Ok(out)
    }

    fn worker_count(&self, candidates: usize) -> usize {
        let wanted = if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.workers
        };
        wanted.clamp(1, candidates.max(1))
    }
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub gains: PidGains,
    pub fitness: f64,
    #[serde(skip)]
    pub positions: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub candidates: usize,
    pub workers: usize,
    /// Ascending fitness; non-finite scores last.
    pub results: Vec<SweepResult>,
    pub metrics: MetricsReport,
}

impl SweepReport {
    pub fn best(&self) -> Option<&SweepResult> {
        self.results.first()
    }

    pub fn top(&self, n: usize) -> &[SweepResult] {
        &self.results[..n.min(self.results.len())]
    }
}

fn by_fitness(a: &SweepResult, b: &SweepResult) -> Ordering {
    match (a.fitness.is_finite(), b.fitness.is_finite()) {
        (true, true) => a.fitness.total_cmp(&b.fitness),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Scores one gain triple on fresh controller and simulation instances.
pub fn evaluate_candidate(
    config: &SystemConfig,
    gains: PidGains,
    setpoints: &[f64],
    external_force: Option<&[f64]>,
) -> Result<SweepResult> {
    let initial_setpoint = setpoints.first().copied().unwrap_or(config.initial_setpoint);
    let mut controller = config.build_controller_for(gains, initial_setpoint);
    let mut simulation = config.build_simulation()?;

    let trajectory = ControlLoopRunner::new(&mut controller, &mut simulation)
        .derivative_mode(config.derivative_mode)
        .run(setpoints, external_force)?;

    let positions = trajectory.positions();
    let fitness = fitness::evaluate(&positions, setpoints, config.weight_factor)?;
    Ok(SweepResult {
        gains,
        fitness,
        positions,
    })
}

pub fn run_sweep(
    config: &SystemConfig,
    spec: &SweepSpec,
    setpoints: &[f64],
    external_force: Option<&[f64]>,
    metrics: &TimingMetrics,
) -> Result<SweepReport> {
    config.validate()?;
    if let Some(forces) = external_force {
        if forces.len() != setpoints.len() {
            return Err(SimError::invalid_input(format!(
                "setpoints ({}) and external forces ({}) differ in length",
                setpoints.len(),
                forces.len()
            )));
        }
    }

    let candidates = spec.candidates()?;
    let workers = spec.worker_count(candidates.len());
    tracing::info!(
        candidates = candidates.len(),
        workers,
        ticks = setpoints.len(),
        "starting gain sweep"
    );

    let (job_tx, job_rx) = unbounded::<(usize, PidGains, Instant)>();
    let (result_tx, result_rx) = unbounded::<(usize, Result<SweepResult>)>();

    for (idx, gains) in candidates.iter().enumerate() {
        job_tx
            .send((idx, *gains, Instant::now()))
            .map_err(|e| SimError::Worker(format!("job queue closed: {e}")))?;
    }
    drop(job_tx);

    let mut slots: Vec<Option<Result<SweepResult>>> =
        std::iter::repeat_with(|| None).take(candidates.len()).collect();

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (idx, gains, queued_at) in job_rx.iter() {
                    metrics.record_queue_wait(queued_at.elapsed());
                    let started = Instant::now();
                    let result = evaluate_candidate(config, gains, setpoints, external_force);
                    metrics.record_evaluation(started.elapsed(), setpoints.len());
                    if result_tx.send((idx, result)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        for (idx, result) in result_rx.iter() {
            slots[idx] = Some(result);
        }
    });

    let mut results = Vec::with_capacity(candidates.len());
    for (idx, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(Ok(result)) => results.push(result),
            Some(Err(err)) => return Err(err),
            None => {
                return Err(SimError::Worker(format!(
                    "candidate #{idx} produced no result"
                )))
            }
        }
    }
    results.sort_by(by_fitness);

    if let Some(best) = results.first() {
        tracing::info!(
            kp = best.gains.kp,
            ki = best.gains.ki,
            kd = best.gains.kd,
            fitness = best.fitness,
            "gain sweep finished"
        );
    }

    Ok(SweepReport {
        candidates: candidates.len(),
        workers,
        results,
        metrics: metrics.report(),
    })
}
