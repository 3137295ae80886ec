//! Visualization module - PNG charts of runs and sweeps

pub mod chart;
pub mod dashboard;
