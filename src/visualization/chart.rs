use crate::control_loop::Trajectory;
use crate::metrics::MetricsReport;
use plotters::prelude::*;
use std::path::Path;

pub fn render_trajectory_chart(
    trajectory: &Trajectory,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let records = trajectory.records();
    let ticks = records.len().max(1) as f64;
    let (lo, hi) = records
        .iter()
        .flat_map(|r| [r.setpoint, r.position])
        .filter(|v| v.is_finite())
        .fold((-1.0_f64, 1.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = (hi - lo) * 0.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Ball Position vs Setpoint", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..ticks, (lo - pad)..(hi + pad))?;

    chart.configure_mesh().x_desc("Tick").y_desc("Position (m)").draw()?;

    chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (r.tick as f64, r.setpoint)),
            &BLUE,
        ))?
        .label("setpoint")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(
            records.iter().map(|r| (r.tick as f64, r.position)),
            &RED,
        ))?
        .label("position")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

pub fn generate_latency_chart(
    report: &MetricsReport,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let to_us = |d: std::time::Duration| d.as_secs_f64() * 1e6;
    let max_us = (to_us(report.evaluation_p99) * 1.2).max(1.0);

    let mut chart = ChartBuilder::on(&root)
        .caption("Candidate Evaluation Latency (us)", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..100.0, 0.0..max_us)?;

    chart.configure_mesh().x_desc("Quantile").y_desc("Latency (us)").draw()?;

    chart.draw_series(LineSeries::new(
        vec![
            (50.0, to_us(report.evaluation_p50)),
            (99.0, to_us(report.evaluation_p99)),
        ],
        &RED,
    ))?;
    root.present()?;
    Ok(())
}
