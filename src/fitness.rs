//! Fitness module - Scores a trajectory against its setpoints (lower is better)
//!
//! After every setpoint change the ball needs some ticks to travel to the new
//! target. Those ticks form an *approach area* and their error is multiplied by
//! `weight_factor` instead of 1.0. An approach area starts at the change and
//! ends at the earlier of the next setpoint crossing or the next change, or at
//! the last tick if neither follows.

use crate::error::{Result, SimError};

/// Minimum per-tick movement for a sign change of the tracking error to count
/// as a crossing; filters out noise while the ball is at rest.
pub const CROSSING_THRESHOLD: f64 = 0.02;

/// Inclusive tick interval over the zero-prefixed sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproachArea {
    pub start: usize,
    pub end: usize,
}

impl ApproachArea {
    pub fn contains(&self, tick: usize) -> bool {
        (self.start..=self.end).contains(&tick)
    }
}

pub fn evaluate(positions: &[f64], setpoints: &[f64], weight_factor: f64) -> Result<f64> {
    evaluate_with_threshold(positions, setpoints, weight_factor, CROSSING_THRESHOLD)
}

pub fn evaluate_with_threshold(
    positions: &[f64],
    setpoints: &[f64],
    weight_factor: f64,
    threshold: f64,
) -> Result<f64> {
    if !(weight_factor >= 0.0) {
        return Err(SimError::invalid_argument(format!(
            "weight_factor must be >= 0, got {weight_factor}"
        )));
    }
    let (positions, setpoints) = prepare(positions, setpoints)?;
    let areas = areas_of_prepared(&positions, &setpoints, threshold);
    Ok(weighted_error(&positions, &setpoints, &areas, weight_factor))
}

/// Approach areas of a trajectory, in prepared (zero-prefixed) tick indices.
pub fn approach_areas(positions: &[f64], setpoints: &[f64]) -> Result<Vec<ApproachArea>> {
    let (positions, setpoints) = prepare(positions, setpoints)?;
    Ok(areas_of_prepared(&positions, &setpoints, CROSSING_THRESHOLD))
}

fn areas_of_prepared(positions: &[f64], setpoints: &[f64], threshold: f64) -> Vec<ApproachArea> {
    let changes = setpoint_changes(setpoints);
    let deltas = abs_position_deltas(positions);
    let crossings = intersections(positions, setpoints, &deltas, threshold);
    build_areas(&changes, &crossings, setpoints.len() - 1)
}

// Tick 0 is the resting state before the first command.
fn prepare(positions: &[f64], setpoints: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if positions.len() != setpoints.len() {
        return Err(SimError::invalid_input(format!(
            "positions ({}) and setpoints ({}) differ in length",
            positions.len(),
            setpoints.len()
        )));
    }
    let prefixed = |xs: &[f64]| {
        let mut v = Vec::with_capacity(xs.len() + 1);
        v.push(0.0);
        v.extend_from_slice(xs);
        v
    };
    Ok((prefixed(positions), prefixed(setpoints)))
}

fn setpoint_changes(setpoints: &[f64]) -> Vec<usize> {
    setpoints
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] != w[1])
        .map(|(i, _)| i)
        .collect()
}

fn abs_position_deltas(positions: &[f64]) -> Vec<f64> {
    positions.windows(2).map(|w| (w[1] - w[0]).abs()).collect()
}

fn intersections(positions: &[f64], setpoints: &[f64], deltas: &[f64], threshold: f64) -> Vec<usize> {
    let error: Vec<f64> = setpoints
        .iter()
        .zip(positions)
        .map(|(s, p)| s - p)
        .collect();
    error
        .windows(2)
        .zip(deltas)
        .enumerate()
        .filter(|(_, (e, delta))| e[1] * e[0] <= 0.0 && **delta > threshold)
        .map(|(i, _)| i)
        .collect()
}

// Both index lists are ascending.
fn build_areas(changes: &[usize], crossings: &[usize], last_tick: usize) -> Vec<ApproachArea> {
    changes
        .iter()
        .map(|&start| {
            let next_crossing = crossings.iter().copied().find(|&x| x > start);
            let next_change = changes.iter().copied().find(|&x| x > start);
            let end = match (next_crossing, next_change) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => last_tick,
            };
            ApproachArea { start, end }
        })
        .collect()
}

fn weighted_error(
    positions: &[f64],
    setpoints: &[f64],
    areas: &[ApproachArea],
    weight_factor: f64,
) -> f64 {
    let mut weights = vec![1.0; setpoints.len()];
    for area in areas {
        for w in &mut weights[area.start..=area.end] {
            *w = weight_factor;
        }
    }
    weights
        .iter()
        .zip(setpoints.iter().zip(positions))
        .map(|(w, (s, p))| w * (s - p).abs())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_are_detected_between_ticks() {
        assert_eq!(setpoint_changes(&[0.0, 1.0, 1.0, -1.0]), vec![0, 2]);
        assert!(setpoint_changes(&[2.0, 2.0]).is_empty());
    }

    #[test]
    fn stationary_sign_flip_is_not_a_crossing() {
        // error changes sign between ticks 1 and 2 but the ball barely moved
        let positions = [0.0, 0.995, 1.005];
        let setpoints = [1.0, 1.0, 1.0];
        let deltas = abs_position_deltas(&positions);
        assert!(intersections(&positions, &setpoints, &deltas, CROSSING_THRESHOLD).is_empty());
    }

    #[test]
    fn area_ends_at_crossing() {
        // prepared: setpoints [0,5,5,5,5], positions [0,2,4,6,5.5]
        let areas = approach_areas(&[2.0, 4.0, 6.0, 5.5], &[5.0; 4]).unwrap();
        assert_eq!(areas, vec![ApproachArea { start: 0, end: 2 }]);
    }

    #[test]
    fn area_ends_at_next_change_when_it_comes_first() {
        let areas = build_areas(&[0, 3], &[5], 8);
        assert_eq!(
            areas,
            vec![
                ApproachArea { start: 0, end: 3 },
                ApproachArea { start: 3, end: 5 },
            ]
        );
    }

    #[test]
    fn area_runs_to_last_tick_without_crossing() {
        let areas = build_areas(&[2], &[1], 9);
        assert_eq!(areas, vec![ApproachArea { start: 2, end: 9 }]);
    }

    #[test]
    fn partial_weighting() {
        let positions = [2.0, 4.0, 6.0, 5.5];
        let setpoints = [5.0; 4];
        // errors [0,3,1,1,0.5], ticks 0..=2 in the approach area
        let half = evaluate(&positions, &setpoints, 0.5).unwrap();
        assert!((half - 3.5).abs() < 1e-12);
    }
}
