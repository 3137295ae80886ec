//! Trajectory persistence - one CSV row per tick
//!
//! Columns: tick, setpoint, position, angle, velocity, external_force.

use crate::control_loop::{TickRecord, Trajectory};
use crate::error::Result;
use std::io::Write;
use std::path::Path;

pub fn write_trajectory<W: Write>(writer: W, trajectory: &Trajectory) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in trajectory.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_trajectory_csv(path: impl AsRef<Path>, trajectory: &Trajectory) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_trajectory(file, trajectory)?;
    tracing::debug!(path = %path.display(), rows = trajectory.len(), "trajectory written");
    Ok(())
}

pub fn read_trajectory_csv(path: impl AsRef<Path>) -> Result<Trajectory> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut trajectory = Trajectory::default();
    for row in rdr.deserialize::<TickRecord>() {
        trajectory.push(row?);
    }
    Ok(trajectory)
}
