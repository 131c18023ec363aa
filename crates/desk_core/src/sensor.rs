//! Canonical sensor sample consumed by the control loop.
//!
//! Sources (scenario generators, CSV replay) all produce `SensorReading`.
//! Absent fields take the documented defaults; non-finite numbers are
//! treated as absent by [`SensorReading::sanitized`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_POSTURE_SCORE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub present: bool,
    /// Pass-through for the step log; the rules never look at it.
    #[serde(default)]
    pub distance_cm: f64,
    #[serde(default)]
    pub light_lux: f64,
    #[serde(default)]
    pub temperature_c: f64,
    #[serde(default)]
    pub humidity_pct: f64,
    /// 1.0 is ideal posture, 0.0 the worst.
    #[serde(default = "default_posture_score")]
    pub posture_score: f64,
}

fn default_posture_score() -> f64 {
    DEFAULT_POSTURE_SCORE
}

impl SensorReading {
    /// A reading at `timestamp` with every other field at its default.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            present: false,
            distance_cm: 0.0,
            light_lux: 0.0,
            temperature_c: 0.0,
            humidity_pct: 0.0,
            posture_score: DEFAULT_POSTURE_SCORE,
        }
    }

    /// Replace NaN/Inf fields with their defaults.
    pub fn sanitized(&self) -> Self {
        Self {
            timestamp: self.timestamp,
            present: self.present,
            distance_cm: finite_or(self.distance_cm, 0.0),
            light_lux: finite_or(self.light_lux, 0.0),
            temperature_c: finite_or(self.temperature_c, 0.0),
            humidity_pct: finite_or(self.humidity_pct, 0.0),
            posture_score: finite_or(self.posture_score, DEFAULT_POSTURE_SCORE),
        }
    }
}

#[inline]
fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        tracing::debug!("non-finite sensor value, defaulting to {}", fallback);
        fallback
    }
}

/// Accepts `true`/`false`, `1`/`0` and numeric 0/1 (CSV exports use integers).
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(n) => Ok(n != 0),
        Flag::Float(f) => Ok(f != 0.0),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" => Ok(false),
            "1" | "true" | "yes" => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "invalid presence flag: {other}"
            ))),
        },
    }
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` taken as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognised timestamp: {raw}"))
    })
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
