//! Summary statistics over a step log written by [`crate::logger::CsvStepLogger`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogMetrics {
    pub total_steps: usize,
    /// `None` when the log has no parsable latency.
    pub avg_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<f64>,
    /// Rows whose `actions` cell is non-empty.
    pub num_decisions: usize,
    pub light_on_ratio: f64,
    pub fan_on_ratio: f64,
    pub posture_alert_ratio: f64,
    pub total_energy_wh: f64,
    /// Fraction of rows whose numeric cells all parsed as finite numbers.
    pub uptime_ratio: f64,
}

#[derive(Debug, Deserialize)]
struct LogRow {
    present: Option<String>,
    distance_cm: Option<String>,
    light_lux: Option<String>,
    temperature_c: Option<String>,
    humidity_pct: Option<String>,
    posture_score: Option<String>,
    light_on: Option<String>,
    fan_on: Option<String>,
    posture_alert_on: Option<String>,
    energy_used_wh: Option<String>,
    actions: Option<String>,
    latency_ms: Option<String>,
}

fn finite(cell: &Option<String>) -> Option<f64> {
    cell.as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

impl LogRow {
    fn is_healthy(&self) -> bool {
        [
            &self.present,
            &self.distance_cm,
            &self.light_lux,
            &self.temperature_c,
            &self.humidity_pct,
            &self.posture_score,
            &self.light_on,
            &self.fan_on,
            &self.posture_alert_on,
            &self.energy_used_wh,
            &self.latency_ms,
        ]
        .into_iter()
        .all(|cell| finite(cell).is_some())
    }
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean of a 0/1 column over the rows where it parsed.
fn ratio(rows: &[LogRow], column: impl Fn(&LogRow) -> &Option<String>) -> f64 {
    let values: Vec<f64> = rows.iter().filter_map(|r| finite(column(r))).collect();
    mean(&values).unwrap_or(0.0)
}

/// Compute metrics from a step log file.
pub fn compute_metrics<P: AsRef<Path>>(path: P) -> Result<LogMetrics> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open step log {}", path.display()))?;

    let mut rows = Vec::new();
    let mut unreadable = 0usize;
    for row in reader.deserialize::<LogRow>() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::debug!("Unreadable log row: {}", e);
                unreadable += 1;
            }
        }
    }
    Ok(summarize(&rows, unreadable))
}

fn summarize(rows: &[LogRow], unreadable: usize) -> LogMetrics {
    let total_steps = rows.len() + unreadable;
    if total_steps == 0 {
        return LogMetrics::default();
    }

    let latencies: Vec<f64> = rows.iter().filter_map(|r| finite(&r.latency_ms)).collect();
    let healthy = rows.iter().filter(|r| r.is_healthy()).count();

    LogMetrics {
        total_steps,
        avg_latency_ms: mean(&latencies),
        p95_latency_ms: percentile(&latencies, 95.0),
        num_decisions: rows
            .iter()
            .filter(|r| r.actions.as_deref().is_some_and(|a| !a.trim().is_empty()))
            .count(),
        light_on_ratio: ratio(rows, |r| &r.light_on),
        fan_on_ratio: ratio(rows, |r| &r.fan_on),
        posture_alert_ratio: ratio(rows, |r| &r.posture_alert_on),
        total_energy_wh: rows
            .iter()
            .filter_map(|r| finite(&r.energy_used_wh))
            .fold(0.0, f64::max),
        uptime_ratio: healthy as f64 / total_steps as f64,
    }
}

fn opt_ms(v: Option<f64>) -> String {
    v.map(|ms| format!("{ms:.3} ms")).unwrap_or_else(|| "n/a".into())
}

impl fmt::Display for LogMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Desk Assistant Metrics ===")?;
        writeln!(f, "Total steps:           {}", self.total_steps)?;
        writeln!(f, "Avg latency:           {}", opt_ms(self.avg_latency_ms))?;
        writeln!(f, "P95 latency:           {}", opt_ms(self.p95_latency_ms))?;
        writeln!(f, "Decisions:             {}", self.num_decisions)?;
        writeln!(f, "Light on ratio:        {:.3}", self.light_on_ratio)?;
        writeln!(f, "Fan on ratio:          {:.3}", self.fan_on_ratio)?;
        writeln!(f, "Posture alert ratio:   {:.3}", self.posture_alert_ratio)?;
        writeln!(f, "Total energy (Wh):     {:.3}", self.total_energy_wh)?;
        write!(f, "Uptime ratio:          {:.3}", self.uptime_ratio)
    }
}
