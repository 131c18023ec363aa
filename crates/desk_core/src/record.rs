use crate::action::{join_actions, Action};
use crate::sensor::SensorReading;
use crate::state::DeskState;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything one tick produced, handed to a [`crate::StepLogger`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub reading: SensorReading,
    pub state: DeskState,
    pub actions: Vec<Action>,
    pub explanation: String,
    pub latency_ms: f64,
}

/// Flat row layout of the step log. Booleans are written as 0/1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRow {
    pub timestamp: DateTime<Utc>,
    pub present: u8,
    pub distance_cm: f64,
    pub light_lux: f64,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub posture_score: f64,
    pub light_on: u8,
    pub fan_on: u8,
    pub posture_alert_on: u8,
    pub energy_used_wh: f64,
    pub actions: String,
    pub latency_ms: f64,
    pub llm_message: String,
}

impl StepRow {
    pub const HEADER: [&'static str; 14] = [
        "timestamp",
        "present",
        "distance_cm",
        "light_lux",
        "temperature_c",
        "humidity_pct",
        "posture_score",
        "light_on",
        "fan_on",
        "posture_alert_on",
        "energy_used_wh",
        "actions",
        "latency_ms",
        "llm_message",
    ];
}

impl From<&StepRecord> for StepRow {
    fn from(record: &StepRecord) -> Self {
        let r = &record.reading;
        Self {
            timestamp: r.timestamp,
            present: u8::from(r.present),
            distance_cm: r.distance_cm,
            light_lux: r.light_lux,
            temperature_c: r.temperature_c,
            humidity_pct: r.humidity_pct,
            posture_score: r.posture_score,
            light_on: u8::from(record.state.light_on),
            fan_on: u8::from(record.state.fan_on),
            posture_alert_on: u8::from(record.state.posture_alert_on),
            energy_used_wh: record.state.energy_used_wh,
            actions: join_actions(&record.actions),
            latency_ms: record.latency_ms,
            llm_message: record.explanation.clone(),
        }
    }
}
