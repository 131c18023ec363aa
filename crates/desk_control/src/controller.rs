//! One control-loop tick: rules → reconciliation → energy integration.

use crate::rules::{decide_fan, decide_light, decide_posture, PostureIntent, SwitchIntent};
use chrono::{DateTime, Utc};
use desk_core::{Action, DeskConfig, DeskState, EnergyRates, SensorReading, ThresholdConfig};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Stateless tick function parameterised by thresholds and power draw.
///
/// The caller owns the [`DeskState`] and feeds the state returned by one
/// `step` into the next. One controller may serve many desks, each with its
/// own state value.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    thresholds: ThresholdConfig,
    energy: EnergyRates,
}

impl Controller {
    pub fn new(thresholds: ThresholdConfig, energy: EnergyRates) -> Self {
        Self { thresholds, energy }
    }

    pub fn from_config(config: &DeskConfig) -> Self {
        Self::new(config.thresholds.clone(), config.energy.clone())
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn energy_rates(&self) -> &EnergyRates {
        &self.energy
    }

    /// Advance `state` by one tick of `dt_seconds`.
    ///
    /// Returns the new state and the actions that actually flipped a flag,
    /// ordered light, fan, posture. Energy for the whole interval is charged
    /// against the post-transition state. Negative or non-finite `dt_seconds`
    /// counts as zero.
    pub fn step(
        &self,
        reading: &SensorReading,
        state: &DeskState,
        dt_seconds: f64,
        now: DateTime<Utc>,
    ) -> (DeskState, Vec<Action>) {
        let reading = reading.sanitized();
        let t = &self.thresholds;
        let mut next = *state;
        let mut actions = Vec::with_capacity(3);

        let light = decide_light(reading.light_lux, reading.present, t.light.on_lux, t.light.off_lux);
        if let Some(action) = reconcile_switch(
            light,
            &mut next.light_on,
            Action::TurnOnLight,
            Action::TurnOffLight,
        ) {
            actions.push(action);
        }

        let fan = decide_fan(
            reading.temperature_c,
            reading.humidity_pct,
            reading.present,
            t.temperature.on_c,
            t.temperature.off_c,
            t.humidity.on_pct,
        );
        if let Some(action) =
            reconcile_switch(fan, &mut next.fan_on, Action::TurnOnFan, Action::TurnOffFan)
        {
            actions.push(action);
        }

        let posture = decide_posture(reading.posture_score, reading.present, t.posture.bad_threshold);
        let wanted = posture == PostureIntent::AlertOn;
        if next.posture_alert_on != wanted {
            next.posture_alert_on = wanted;
            actions.push(if wanted {
                Action::PostureAlertOn
            } else {
                Action::ClearPostureAlert
            });
        }

        let hours = clamp_dt(dt_seconds) / SECONDS_PER_HOUR;
        if next.light_on {
            next.energy_used_wh += self.energy.light_w * hours;
        }
        if next.fan_on {
            next.energy_used_wh += self.energy.fan_w * hours;
        }

        if !actions.is_empty() {
            next.last_action_ts = Some(now);
            tracing::debug!(
                ts = %now,
                actions = %desk_core::join_actions(&actions),
                energy_wh = next.energy_used_wh,
                "desk state changed"
            );
        }

        (next, actions)
    }
}

/// Flip `flag` if the intent disagrees with it, returning the matching action.
fn reconcile_switch(
    intent: SwitchIntent,
    flag: &mut bool,
    on: Action,
    off: Action,
) -> Option<Action> {
    match intent {
        SwitchIntent::TurnOn if !*flag => {
            *flag = true;
            Some(on)
        }
        SwitchIntent::TurnOff if *flag => {
            *flag = false;
            Some(off)
        }
        _ => None,
    }
}

#[inline]
fn clamp_dt(dt_seconds: f64) -> f64 {
    if dt_seconds.is_finite() && dt_seconds > 0.0 {
        dt_seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 18, 0, 0).unwrap() + chrono::Duration::seconds(secs.into())
    }

    fn comfy(lux: f64) -> SensorReading {
        SensorReading {
            timestamp: ts(0),
            present: true,
            distance_cm: 70.0,
            light_lux: lux,
            temperature_c: 25.0,
            humidity_pct: 45.0,
            posture_score: 0.9,
        }
    }

    #[test]
    fn test_light_hysteresis_sequence() {
        let c = Controller::default();
        let s0 = DeskState::new();

        let (s1, a1) = c.step(&comfy(150.0), &s0, 10.0, ts(10));
        assert_eq!(a1, vec![Action::TurnOnLight]);
        assert!(s1.light_on);

        let (s2, a2) = c.step(&comfy(250.0), &s1, 10.0, ts(20));
        assert!(a2.is_empty());
        assert!(s2.light_on);

        let (s3, a3) = c.step(&comfy(450.0), &s2, 10.0, ts(30));
        assert_eq!(a3, vec![Action::TurnOffLight]);
        assert!(!s3.light_on);
    }

    #[test]
    fn test_energy_full_hour() {
        let c = Controller::default();
        let state = DeskState {
            light_on: true,
            ..DeskState::default()
        };
        // In the dead zone, so the light stays on
        let (s, _) = c.step(&comfy(300.0), &state, 3600.0, ts(0));
        assert!((s.energy_used_wh - 10.0).abs() < 1e-9);

        let state = DeskState {
            light_on: true,
            fan_on: true,
            ..DeskState::default()
        };
        let mut warm = comfy(300.0);
        warm.temperature_c = 25.5;
        let (s, actions) = c.step(&warm, &state, 3600.0, ts(0));
        assert!(actions.is_empty());
        assert!((s.energy_used_wh - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_energy_charged_to_post_transition_state() {
        let c = Controller::default();
        // Light goes on this tick and is billed for the whole interval
        let (s, actions) = c.step(&comfy(100.0), &DeskState::new(), 1800.0, ts(0));
        assert_eq!(actions, vec![Action::TurnOnLight]);
        assert!((s.energy_used_wh - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_and_nan_dt_add_nothing() {
        let c = Controller::default();
        let state = DeskState {
            light_on: true,
            energy_used_wh: 3.0,
            ..DeskState::default()
        };
        let (s, _) = c.step(&comfy(300.0), &state, -50.0, ts(0));
        assert_eq!(s.energy_used_wh, 3.0);
        let (s, _) = c.step(&comfy(300.0), &state, f64::NAN, ts(0));
        assert_eq!(s.energy_used_wh, 3.0);
    }

    #[test]
    fn test_absence_clears_everything_once() {
        let c = Controller::default();
        let state = DeskState {
            light_on: true,
            fan_on: true,
            posture_alert_on: true,
            ..DeskState::default()
        };
        let away = SensorReading::empty(ts(0));

        let (s1, a1) = c.step(&away, &state, 10.0, ts(10));
        assert_eq!(
            a1,
            vec![
                Action::TurnOffLight,
                Action::TurnOffFan,
                Action::ClearPostureAlert
            ]
        );
        assert!(s1.is_idle());
        assert_eq!(s1.last_action_ts, Some(ts(10)));

        let (s2, a2) = c.step(&away, &s1, 10.0, ts(20));
        assert!(a2.is_empty());
        assert_eq!(s2.last_action_ts, Some(ts(10)));
    }

    #[test]
    fn test_action_order_light_fan_posture() {
        let c = Controller::default();
        let reading = SensorReading {
            timestamp: ts(0),
            present: true,
            distance_cm: 70.0,
            light_lux: 50.0,
            temperature_c: 30.0,
            humidity_pct: 50.0,
            posture_score: 0.3,
        };
        let (_, actions) = c.step(&reading, &DeskState::new(), 10.0, ts(0));
        assert_eq!(
            actions,
            vec![
                Action::TurnOnLight,
                Action::TurnOnFan,
                Action::PostureAlertOn
            ]
        );
    }

    #[test]
    fn test_repeat_reading_is_idempotent() {
        let c = Controller::default();
        let reading = SensorReading {
            posture_score: 0.2,
            ..comfy(120.0)
        };
        let (s1, a1) = c.step(&reading, &DeskState::new(), 10.0, ts(10));
        assert!(!a1.is_empty());
        let (s2, a2) = c.step(&reading, &s1, 10.0, ts(20));
        assert!(a2.is_empty());
        assert_eq!(s2.last_action_ts, Some(ts(10)));
    }

    #[test]
    fn test_nan_reading_uses_defaults() {
        let c = Controller::default();
        let mut reading = comfy(f64::NAN);
        reading.posture_score = f64::NAN;
        // NaN lux → 0 lux → light on; NaN posture → 1.0 → no alert
        let (s, actions) = c.step(&reading, &DeskState::new(), 10.0, ts(0));
        assert_eq!(actions, vec![Action::TurnOnLight]);
        assert!(!s.posture_alert_on);
    }
}
