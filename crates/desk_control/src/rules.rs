//! Pure per-channel decision rules.
//!
//! Every function is total and side-effect free. An absent user always
//! drives the channel to its resting state (presence override).

use serde::{Deserialize, Serialize};

/// Intent for an on/off device (light, fan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchIntent {
    TurnOn,
    TurnOff,
    NoChange,
}

/// Intent for the posture alert. There is no dead zone here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureIntent {
    AlertOn,
    AlertClear,
}

/// Light: on below `on_lux`, off above `off_lux`, hold in between.
pub fn decide_light(light_lux: f64, present: bool, on_lux: f64, off_lux: f64) -> SwitchIntent {
    if !present {
        return SwitchIntent::TurnOff;
    }
    if light_lux < on_lux {
        SwitchIntent::TurnOn
    } else if light_lux > off_lux {
        SwitchIntent::TurnOff
    } else {
        SwitchIntent::NoChange
    }
}

/// Fan: on when too warm or too humid, off only when cool enough.
///
/// Humidity has no off condition; a transient humidity drop must not
/// cycle the fan.
pub fn decide_fan(
    temperature_c: f64,
    humidity_pct: f64,
    present: bool,
    on_c: f64,
    off_c: f64,
    humid_on_pct: f64,
) -> SwitchIntent {
    if !present {
        return SwitchIntent::TurnOff;
    }
    if temperature_c > on_c || humidity_pct > humid_on_pct {
        SwitchIntent::TurnOn
    } else if temperature_c < off_c {
        SwitchIntent::TurnOff
    } else {
        SwitchIntent::NoChange
    }
}

pub fn decide_posture(posture_score: f64, present: bool, bad_threshold: f64) -> PostureIntent {
    if present && posture_score < bad_threshold {
        PostureIntent::AlertOn
    } else {
        PostureIntent::AlertClear
    }
}
