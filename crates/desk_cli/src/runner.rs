//! The control loop: step, explain, actuate, log.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use desk_control::{drive_actuators, Controller};
use desk_core::{
    join_actions, ActuatorSink, DeskConfig, DeskState, SensorReading, StepLogger, StepRecord,
};
use desk_reasoning::{join_explanation, ExplanationEngine};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// `dt` charged on the first tick, which has no predecessor.
    pub period_seconds: f64,
    pub explain_every_tick: bool,
    pub posture_message: String,
    /// Print decision and explanation lines to stdout.
    pub echo: bool,
}

impl RunOptions {
    pub fn from_config(config: &DeskConfig) -> Self {
        Self {
            period_seconds: config.sampling.period_seconds as f64,
            explain_every_tick: config.simulation.explain_every_tick,
            posture_message: config.simulation.posture_message.clone(),
            echo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    /// Ticks that emitted at least one action.
    pub decisions: usize,
    pub final_state: DeskState,
}

fn elapsed_seconds(prev: Option<DateTime<Utc>>, now: DateTime<Utc>, first: f64) -> f64 {
    match prev {
        Some(prev) => (now - prev).num_milliseconds() as f64 / 1000.0,
        None => first,
    }
}

fn decision_line(reading: &SensorReading, actions: &[desk_core::Action]) -> String {
    format!(
        "[{}] present={} light={:.0}lux temp={:.1}C hum={:.0}% -> actions=[{}]",
        reading.timestamp.format("%Y-%m-%d %H:%M:%S"),
        reading.present,
        reading.light_lux,
        reading.temperature_c,
        reading.humidity_pct,
        actions
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

/// Run every reading through the controller in order.
///
/// Only logger failures abort the run. Explanation and actuator problems are
/// absorbed by their own fallbacks.
pub async fn run_simulation<I>(
    readings: I,
    controller: &Controller,
    engine: Arc<ExplanationEngine>,
    actuator: &mut dyn ActuatorSink,
    logger: &mut dyn StepLogger,
    opts: &RunOptions,
) -> Result<RunSummary>
where
    I: IntoIterator<Item = SensorReading>,
{
    let mut state = DeskState::new();
    let mut prev_ts = None;
    let mut steps = 0usize;
    let mut decisions = 0usize;

    for reading in readings {
        let dt = elapsed_seconds(prev_ts, reading.timestamp, opts.period_seconds);
        prev_ts = Some(reading.timestamp);

        let started = Instant::now();
        let (next, actions) = controller.step(&reading, &state, dt, reading.timestamp);
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        state = next;

        let pending = (opts.explain_every_tick || !actions.is_empty())
            .then(|| engine.spawn(reading.clone(), actions.clone()));

        if !actions.is_empty() {
            decisions += 1;
            if opts.echo {
                println!("{}", decision_line(&reading, &actions));
            }
        }

        drive_actuators(actuator, &state, &opts.posture_message);

        let explanation = match pending {
            Some(pending) => join_explanation(pending).await.text,
            None => String::new(),
        };
        if opts.echo && !explanation.is_empty() {
            println!("  [ASSISTANT] {}", explanation);
        }

        tracing::debug!(
            ts = %reading.timestamp,
            actions = %join_actions(&actions),
            energy_wh = state.energy_used_wh,
            latency_ms,
            "tick"
        );

        logger
            .log_step(&StepRecord {
                reading,
                state,
                actions,
                explanation,
                latency_ms,
            })
            .context("Failed to record step")?;
        steps += 1;
    }

    logger.flush()?;
    tracing::info!(
        "Simulation finished: {} steps, {} decisions, {:.2} Wh",
        steps,
        decisions,
        state.energy_used_wh
    );

    Ok(RunSummary {
        steps,
        decisions,
        final_state: state,
    })
}
