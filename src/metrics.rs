//! Metrics module - Timing of sweep evaluations and control ticks

use crate::error::{Result, SimError};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// TIMING METRICS - Thread-safe performance tracking
// ============================================================================

#[derive(Clone)]
pub struct TimingMetrics {
    evaluation_hist: Arc<Mutex<Histogram<u64>>>,
    tick_hist: Arc<Mutex<Histogram<u64>>>,
    // Time a candidate sat in the job queue before a worker picked it up
    queue_wait_hist: Arc<Mutex<Histogram<u64>>>,
    evaluations: Arc<AtomicU64>,
}

fn histogram() -> Result<Arc<Mutex<Histogram<u64>>>> {
    let hist = Histogram::new(3).map_err(|e| SimError::Metrics(format!("{e:?}")))?;
    Ok(Arc::new(Mutex::new(hist)))
}

impl TimingMetrics {
    pub fn new() -> Result<Self> {
        Ok(Self {
            evaluation_hist: histogram()?,
            tick_hist: histogram()?,
            queue_wait_hist: histogram()?,
            evaluations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Records one full candidate evaluation of `ticks` control ticks.
    pub fn record_evaluation(&self, duration: Duration, ticks: usize) {
        let nanos = duration.as_nanos() as u64;
        self.evaluation_hist.lock().record(nanos).ok();
        if ticks > 0 {
            self.tick_hist.lock().record(nanos / ticks as u64).ok();
        }
        self.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queue_wait(&self, duration: Duration) {
        self.queue_wait_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> MetricsReport {
        let eval = self.evaluation_hist.lock();
        let tick = self.tick_hist.lock();
        let wait = self.queue_wait_hist.lock();

        MetricsReport {
            evaluation_p50: Duration::from_nanos(eval.value_at_quantile(0.5)),
            evaluation_p99: Duration::from_nanos(eval.value_at_quantile(0.99)),
            tick_p50: Duration::from_nanos(tick.value_at_quantile(0.5)),
            tick_p99: Duration::from_nanos(tick.value_at_quantile(0.99)),
            queue_wait_p50: Duration::from_nanos(wait.value_at_quantile(0.5)),
            queue_wait_p99: Duration::from_nanos(wait.value_at_quantile(0.99)),
            evaluations: self.evaluations(),
        }
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub evaluation_p50: Duration,
    pub evaluation_p99: Duration,
    pub tick_p50: Duration,
    pub tick_p99: Duration,
    pub queue_wait_p50: Duration,
    pub queue_wait_p99: Duration,
    pub evaluations: u64,
}
