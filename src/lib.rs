pub mod actuator;
pub mod config;
pub mod control_loop;
pub mod disturbance;
pub mod error;
pub mod fitness;
pub mod log;
pub mod metrics;
pub mod session;
pub mod simulation;
pub mod sweep;
pub mod visualization;

pub use actuator::{AngleActuator, DerivativeMode, PIDController, PidGains};
pub use config::{load_config, SystemConfig};
pub use control_loop::{ControlLoopRunner, TickRecord, Trajectory};
pub use disturbance::{DisturbanceGenerator, SetpointProfile};
pub use error::{Result, SimError};
pub use fitness::{evaluate, ApproachArea};
pub use metrics::TimingMetrics;
pub use session::{create_session, ControlMode, InputEvent, Session};
pub use simulation::{FrictionMode, PhysicsSimulation, SimulationParams, SimulationState};
pub use sweep::{run_sweep, GainRange, SweepReport, SweepSpec};
