pub mod action;
pub mod config;
pub mod record;
pub mod sensor;
pub mod state;

pub use action::{join_actions, split_actions, Action};
pub use config::{
    ConfigError, DeskConfig, EnergyRates, LlmConfig, LoggingConfig, SamplingConfig,
    SimulationConfig, ThresholdConfig,
};
pub use record::{StepRecord, StepRow};
pub use sensor::SensorReading;
pub use state::DeskState;

/// Physical (or simulated) outputs of a desk.
///
/// The control loop calls these every tick with the current state, changed
/// or not. Implementations must treat repeated identical calls as no-ops.
pub trait ActuatorSink: Send {
    fn set_light(&mut self, on: bool) -> anyhow::Result<()>;
    fn set_fan(&mut self, on: bool) -> anyhow::Result<()>;
    fn send_posture_notification(&mut self, message: &str) -> anyhow::Result<()>;

    /// Called on ticks where the posture alert is off.
    fn clear_posture_notification(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Durable sink for per-tick records.
pub trait StepLogger: Send {
    fn log_step(&mut self, record: &StepRecord) -> anyhow::Result<()>;

    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
