//! Desk assistant simulator: sensor sources, the control loop, console
//! actuators, step logs and log metrics.

pub mod actuator;
pub mod logger;
pub mod metrics;
pub mod runner;
pub mod sources;

pub use actuator::ConsoleActuator;
pub use logger::CsvStepLogger;
pub use metrics::{compute_metrics, LogMetrics};
pub use runner::{run_simulation, RunOptions, RunSummary};
pub use sources::Scenario;
