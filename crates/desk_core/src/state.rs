use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actuator status and cumulative energy for one desk.
///
/// Owned by the control loop and threaded through `Controller::step`
/// tick by tick. `energy_used_wh` never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeskState {
    pub light_on: bool,
    pub fan_on: bool,
    pub posture_alert_on: bool,
    /// Timestamp of the last tick that emitted at least one action.
    pub last_action_ts: Option<DateTime<Utc>>,
    pub energy_used_wh: f64,
}

impl DeskState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every actuator is off.
    pub fn is_idle(&self) -> bool {
        !self.light_on && !self.fan_on && !self.posture_alert_on
    }
}
