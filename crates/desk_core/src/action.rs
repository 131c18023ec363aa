use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A state transition emitted by the controller.
///
/// The snake_case tokens are a stable contract for step-log consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnOnLight,
    TurnOffLight,
    TurnOnFan,
    TurnOffFan,
    PostureAlertOn,
    ClearPostureAlert,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::TurnOnLight,
        Action::TurnOffLight,
        Action::TurnOnFan,
        Action::TurnOffFan,
        Action::PostureAlertOn,
        Action::ClearPostureAlert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TurnOnLight => "turn_on_light",
            Action::TurnOffLight => "turn_off_light",
            Action::TurnOnFan => "turn_on_fan",
            Action::TurnOffFan => "turn_off_fan",
            Action::PostureAlertOn => "posture_alert_on",
            Action::ClearPostureAlert => "clear_posture_alert",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("unknown action token: {s}"))
    }
}

/// Joins actions with `;` in emission order, as written to the step log.
pub fn join_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(";")
}

/// Inverse of [`join_actions`]. Unknown tokens are skipped.
pub fn split_actions(joined: &str) -> Vec<Action> {
    joined
        .split(';')
        .filter(|t| !t.trim().is_empty())
        .filter_map(|t| t.parse().ok())
        .collect()
}
