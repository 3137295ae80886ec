use super::chart::{generate_latency_chart, render_trajectory_chart};
use crate::control_loop::Trajectory;
use crate::metrics::MetricsReport;
use std::path::Path;

/// Writes whichever charts apply into `out_dir`. Chart failures (missing fonts
/// on headless hosts, unwritable paths) are logged and otherwise ignored.
pub fn render_report_charts(
    out_dir: &Path,
    trajectory: Option<&Trajectory>,
    report: Option<&MetricsReport>,
) {
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        tracing::warn!(dir = %out_dir.display(), error = %e, "cannot create chart directory");
        return;
    }
    if let Some(trajectory) = trajectory {
        let path = out_dir.join("trajectory.png");
        if let Err(e) = render_trajectory_chart(trajectory, &path) {
            tracing::warn!(path = %path.display(), error = %e, "trajectory chart failed");
        }
    }
    if let Some(report) = report {
        let path = out_dir.join("latency.png");
        if let Err(e) = generate_latency_chart(report, &path) {
            tracing::warn!(path = %path.display(), error = %e, "latency chart failed");
        }
    }
}
