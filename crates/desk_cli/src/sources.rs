//! Sensor sources: scripted scenarios, a seeded random day, and CSV replay.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use desk_core::sensor::{parse_timestamp, DEFAULT_POSTURE_SCORE};
use desk_core::SensorReading;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;

/// Built-in synthetic inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Dim evening office, user coming and going
    A,
    /// Hot and humid, temperature ramping 25 → 30 °C
    B,
    /// Posture score sliding from 0.9 to 0.4
    C,
    /// Seeded noisy day with 80% presence
    Random,
}

impl Scenario {
    pub fn generate(self, duration_seconds: u64, period_seconds: u64, seed: u64) -> Vec<SensorReading> {
        match self {
            Scenario::A => scenario_a(duration_seconds, period_seconds),
            Scenario::B => scenario_b(duration_seconds, period_seconds),
            Scenario::C => scenario_c(duration_seconds, period_seconds),
            Scenario::Random => random_day(duration_seconds, period_seconds, seed),
        }
    }
}

fn scenario_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 18, 0, 0)
        .single()
        .unwrap_or_default()
}

fn time_index(start: DateTime<Utc>, duration_seconds: u64, period_seconds: u64) -> Vec<DateTime<Utc>> {
    let period = period_seconds.max(1);
    (0..duration_seconds / period)
        .map(|i| start + Duration::seconds((i * period) as i64))
        .collect()
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| start + step * i as f64)
}

fn present_reading(timestamp: DateTime<Utc>) -> SensorReading {
    SensorReading {
        timestamp,
        present: true,
        distance_cm: 70.0,
        light_lux: 300.0,
        temperature_c: 24.0,
        humidity_pct: 45.0,
        posture_score: 0.85,
    }
}

/// Presence 4 ticks on, 2 off, in a dim (60 lux) room.
pub fn scenario_a(duration_seconds: u64, period_seconds: u64) -> Vec<SensorReading> {
    const PATTERN: [bool; 6] = [true, true, true, true, false, false];
    time_index(scenario_start(), duration_seconds, period_seconds)
        .into_iter()
        .enumerate()
        .map(|(i, ts)| {
            let present = PATTERN[i % PATTERN.len()];
            SensorReading {
                present,
                distance_cm: if present { 70.0 } else { 200.0 },
                light_lux: 60.0,
                ..present_reading(ts)
            }
        })
        .collect()
}

/// Present user, 70% humidity, temperature ramping 25 → 30 °C.
pub fn scenario_b(duration_seconds: u64, period_seconds: u64) -> Vec<SensorReading> {
    let index = time_index(scenario_start(), duration_seconds, period_seconds);
    let temps = linspace(25.0, 30.0, index.len());
    index
        .into_iter()
        .zip(temps)
        .map(|(ts, temperature_c)| SensorReading {
            light_lux: 350.0,
            temperature_c,
            humidity_pct: 70.0,
            ..present_reading(ts)
        })
        .collect()
}

/// Present user whose posture decays from 0.9 to 0.4.
pub fn scenario_c(duration_seconds: u64, period_seconds: u64) -> Vec<SensorReading> {
    let index = time_index(scenario_start(), duration_seconds, period_seconds);
    let scores = linspace(0.9, 0.4, index.len());
    index
        .into_iter()
        .zip(scores)
        .map(|(ts, posture_score)| SensorReading {
            posture_score,
            ..present_reading(ts)
        })
        .collect()
}

/// Uniform noise of `scale` around `base`.
fn jitter(rng: &mut StdRng, base: f64, scale: f64) -> f64 {
    base + rng.gen_range(-scale..=scale)
}

/// Noisy daytime office: ~500 lux, ~25 °C, ~55% RH, user present 80% of ticks.
pub fn random_day(duration_seconds: u64, period_seconds: u64, seed: u64) -> Vec<SensorReading> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Utc
        .with_ymd_and_hms(2020, 1, 1, 9, 0, 0)
        .single()
        .unwrap_or_default();

    time_index(start, duration_seconds, period_seconds)
        .into_iter()
        .map(|timestamp| {
            let present = rng.gen::<f64>() > 0.2;
            let distance_cm = if present {
                jitter(&mut rng, 60.0, 10.0)
            } else {
                jitter(&mut rng, 200.0, 20.0)
            };
            SensorReading {
                timestamp,
                present,
                distance_cm,
                light_lux: jitter(&mut rng, 500.0, 50.0).max(0.0),
                temperature_c: jitter(&mut rng, 25.0, 2.5),
                humidity_pct: jitter(&mut rng, 55.0, 5.5).clamp(0.0, 100.0),
                posture_score: jitter(&mut rng, 0.8, 0.15).clamp(0.0, 1.0),
            }
        })
        .collect()
}

// ============================================================================
// CSV replay
// ============================================================================

/// Loose row shape: every cell optional, unparsable cells count as missing.
#[derive(Debug, Deserialize)]
struct ReadingRow {
    timestamp: Option<String>,
    present: Option<String>,
    distance_cm: Option<String>,
    light_lux: Option<String>,
    temperature_c: Option<String>,
    humidity_pct: Option<String>,
    posture_score: Option<String>,
}

fn number(cell: &Option<String>, default: f64) -> f64 {
    cell.as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

fn flag(cell: &Option<String>) -> bool {
    match cell.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
        Some(s) => matches!(s.as_str(), "1" | "true" | "yes") || s.parse::<f64>().is_ok_and(|v| v != 0.0),
        None => false,
    }
}

impl ReadingRow {
    fn into_reading(self) -> Option<SensorReading> {
        let timestamp = parse_timestamp(self.timestamp.as_deref()?)?;
        Some(SensorReading {
            timestamp,
            present: flag(&self.present),
            distance_cm: number(&self.distance_cm, 0.0),
            light_lux: number(&self.light_lux, 0.0),
            temperature_c: number(&self.temperature_c, 0.0),
            humidity_pct: number(&self.humidity_pct, 0.0),
            posture_score: number(&self.posture_score, DEFAULT_POSTURE_SCORE),
        })
    }
}

/// Read readings from a CSV with a header row.
///
/// Missing or malformed cells take the documented defaults. Rows without a
/// usable timestamp are skipped with a warning.
pub fn read_readings_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SensorReading>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open sensor CSV: {}", path.display()))?;

    let mut readings = Vec::new();
    for (line, row) in reader.deserialize::<ReadingRow>().enumerate() {
        match row.map(ReadingRow::into_reading) {
            Ok(Some(reading)) => readings.push(reading),
            Ok(None) => tracing::warn!("Skipping row {} of {}: no valid timestamp", line + 2, path.display()),
            Err(e) => tracing::warn!("Skipping row {} of {}: {}", line + 2, path.display(), e),
        }
    }
    Ok(readings)
}

/// Write readings as CSV (the same layout [`read_readings_csv`] accepts).
pub fn write_readings_csv<P: AsRef<Path>>(path: P, readings: &[SensorReading]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for reading in readings {
        writer.serialize(reading)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_index_length_and_spacing() {
        let idx = time_index(scenario_start(), 600, 10);
        assert_eq!(idx.len(), 60);
        assert_eq!((idx[1] - idx[0]).num_seconds(), 10);
        assert_eq!(idx[0], scenario_start());
    }

    #[test]
    fn test_linspace_endpoints() {
        let v: Vec<f64> = linspace(25.0, 30.0, 6).collect();
        assert_eq!(v, vec![25.0, 26.0, 27.0, 28.0, 29.0, 30.0]);
        assert_eq!(linspace(1.0, 2.0, 1).collect::<Vec<_>>(), vec![1.0]);
        assert_eq!(linspace(1.0, 2.0, 0).count(), 0);
    }

    #[test]
    fn test_scenario_a_presence_pattern() {
        let readings = scenario_a(120, 10);
        let presence: Vec<bool> = readings.iter().map(|r| r.present).collect();
        assert_eq!(
            presence,
            vec![true, true, true, true, false, false, true, true, true, true, false, false]
        );
        assert!(readings.iter().all(|r| r.light_lux == 60.0));
        assert_eq!(readings[4].distance_cm, 200.0);
    }

    #[test]
    fn test_scenario_b_ramps_temperature() {
        let readings = scenario_b(600, 10);
        assert_eq!(readings.first().unwrap().temperature_c, 25.0);
        assert!((readings.last().unwrap().temperature_c - 30.0).abs() < 1e-9);
        assert!(readings.iter().all(|r| r.present && r.humidity_pct == 70.0));
    }

    #[test]
    fn test_scenario_c_posture_decays() {
        let readings = scenario_c(600, 10);
        assert!((readings.first().unwrap().posture_score - 0.9).abs() < 1e-9);
        assert!((readings.last().unwrap().posture_score - 0.4).abs() < 1e-9);
        assert!(readings.windows(2).all(|w| w[1].posture_score <= w[0].posture_score));
    }

    #[test]
    fn test_random_day_is_seeded_and_bounded() {
        let a = random_day(600, 10, 42);
        let b = random_day(600, 10, 42);
        assert_eq!(a, b);
        assert_ne!(a, random_day(600, 10, 7));
        for r in &a {
            assert!((0.0..=1.0).contains(&r.posture_score));
            assert!((0.0..=100.0).contains(&r.humidity_pct));
            assert!(r.light_lux >= 0.0);
        }
    }

    #[test]
    fn test_csv_replay_roundtrip_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/readings.csv");
        let original = scenario_c(60, 10);
        write_readings_csv(&path, &original).unwrap();
        assert_eq!(read_readings_csv(&path).unwrap(), original);

        let loose = dir.path().join("loose.csv");
        std::fs::write(
            &loose,
            "timestamp,present,light_lux,posture_score\n\
             2020-01-01 18:00:00,1,,oops\n\
             not-a-time,1,100,0.5\n\
             2020-01-01 18:00:10,0,120.5,0.3\n",
        )
        .unwrap();
        let readings = read_readings_csv(&loose).unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[0].present);
        assert_eq!(readings[0].light_lux, 0.0);
        assert_eq!(readings[0].posture_score, 1.0);
        assert_eq!(readings[0].temperature_c, 0.0);
        assert!(!readings[1].present);
        assert_eq!(readings[1].light_lux, 120.5);
    }
}
