//! Interactive sessions - headless front ends over the simulation core
//!
//! A session owns its controller/simulation and exposes the three
//! capabilities a presentation layer needs: feed it input, advance it one tick,
//! and read a frame to draw. Keyboard and PID variants share the trait and are
//! built by [`create_session`].

pub mod keyboard;
pub mod pid;

pub use keyboard::KeyboardSession;
pub use pid::PidSession;

use crate::config::SystemConfig;
use crate::control_loop::{TickRecord, Trajectory};
use crate::error::{Result, SimError};
use std::fmt;
use std::str::FromStr;

/// Tilt per key press, degrees
pub const ANGLE_STEP: f64 = 3.0;
/// External force per key press, newtons
pub const FORCE_STEP: f64 = 0.5;
/// Seesaw length in metres (500 px at 20 px/m)
pub const SEESAW_LENGTH: f64 = 25.0;
pub const NUM_MARKERS: u8 = 9;
pub const DEFAULT_MARKER: u8 = 4;

/// Setpoint under marker `marker`; markers are evenly spaced end to end.
pub fn marker_setpoint(marker: u8) -> f64 {
    let spacing = SEESAW_LENGTH / f64::from(NUM_MARKERS - 1);
    f64::from(marker) * spacing - SEESAW_LENGTH / 2.0
}

// ============================================================================
// INPUT EVENTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    TiltLeft,
    TiltRight,
    ForceLeft,
    ForceRight,
    Marker(u8),
    ToggleMarker,
}

impl FromStr for InputEvent {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(InputEvent::TiltLeft),
            "right" => Ok(InputEvent::TiltRight),
            "force-" | "a" => Ok(InputEvent::ForceLeft),
            "force+" | "d" => Ok(InputEvent::ForceRight),
            "0" => Ok(InputEvent::ToggleMarker),
            // number keys 1..=9 select markers 0..=8
            key => match key.parse::<u8>() {
                Ok(n @ 1..=9) => Ok(InputEvent::Marker(n - 1)),
                _ => Err(SimError::invalid_input(format!("unknown input event '{s}'"))),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerState {
    pub position: u8,
    pub visible: bool,
}

impl Default for MarkerState {
    fn default() -> Self {
        Self {
            position: DEFAULT_MARKER,
            visible: false,
        }
    }
}

impl MarkerState {
    /// Returns true when the event was a marker event.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Marker(m) if m < NUM_MARKERS => {
                self.position = m;
                true
            }
            InputEvent::Marker(_) => true,
            InputEvent::ToggleMarker => {
                self.visible = !self.visible;
                true
            }
            _ => false,
        }
    }

    pub fn setpoint(&self) -> f64 {
        marker_setpoint(self.position)
    }
}

// ============================================================================
// FRAME - Everything a renderer draws for one tick
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tick: usize,
    pub angle: f64,
    pub velocity: f64,
    pub position: f64,
    pub external_force: f64,
    pub setpoint: f64,
    pub marker: MarkerState,
}

impl Frame {
    /// Velocity with rolling-friction jitter below 0.01 m/s shown as zero.
    pub fn display_velocity(&self) -> f64 {
        if self.velocity.abs() < 0.01 {
            0.0
        } else {
            self.velocity
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Angle: {:.2}° | Velocity: {:.2} m/s | Position: {:.2} m | External Force: {:.2} N",
            self.angle,
            self.display_velocity(),
            self.position,
            self.external_force
        )
    }
}

// ============================================================================
// SESSION TRAIT AND FACTORY
// ============================================================================

pub trait Session {
    fn mode(&self) -> ControlMode;
    fn handle_input(&mut self, event: InputEvent);
    fn advance_tick(&mut self) -> TickRecord;
    fn render(&self) -> Frame;
    fn history(&self) -> &Trajectory;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Keyboard,
    Pid,
}

impl FromStr for ControlMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyboard" => Ok(ControlMode::Keyboard),
            "pid" => Ok(ControlMode::Pid),
            other => Err(SimError::NotImplemented(format!(
                "control mode '{other}' has no implementation"
            ))),
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Keyboard => write!(f, "Keyboard"),
            ControlMode::Pid => write!(f, "PID"),
        }
    }
}

pub fn create_session(mode: ControlMode, config: &SystemConfig) -> Result<Box<dyn Session>> {
    config.validate()?;
    let simulation = config.build_simulation()?;
    let session: Box<dyn Session> = match mode {
        ControlMode::Keyboard => Box::new(KeyboardSession::new(
            simulation,
            config.initial_angle,
            config.max_external_force,
        )),
        ControlMode::Pid => Box::new(
            PidSession::new(config.build_controller(), simulation, config.max_external_force)
                .derivative_mode(config.derivative_mode),
        ),
    };
    Ok(session)
}

/// Runs `ticks` ticks, applying each scripted `(tick, event)` before that tick.
pub fn replay<'s>(
    session: &'s mut dyn Session,
    script: &[(usize, InputEvent)],
    ticks: usize,
) -> &'s Trajectory {
    for tick in 0..ticks {
        for &(_, event) in script.iter().filter(|(at, _)| *at == tick) {
            session.handle_input(event);
        }
        let record = session.advance_tick();
        tracing::trace!(tick, position = record.position, angle = record.angle, "session tick");
    }
    session.history()
}
