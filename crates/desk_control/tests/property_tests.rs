//! Property-based tests for the desk controller.
//!
//! Verifies the tick invariants for arbitrary readings and states: energy is
//! monotonic, absence clears every channel exactly once, the dead zone never
//! flickers, and repeated readings emit nothing.

use chrono::{DateTime, TimeZone, Utc};
use desk_control::Controller;
use desk_core::{Action, DeskState, SensorReading};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 18, 0, 0).unwrap()
}

fn arb_reading() -> impl Strategy<Value = SensorReading> {
    (
        any::<bool>(),
        0.0f64..=2000.0,
        -10.0f64..=45.0,
        0.0f64..=100.0,
        0.0f64..=1.0,
    )
        .prop_map(|(present, light_lux, temperature_c, humidity_pct, posture_score)| {
            SensorReading {
                timestamp: epoch(),
                present,
                distance_cm: 70.0,
                light_lux,
                temperature_c,
                humidity_pct,
                posture_score,
            }
        })
}

fn arb_state() -> impl Strategy<Value = DeskState> {
    (any::<bool>(), any::<bool>(), any::<bool>(), 0.0f64..=1.0e6).prop_map(
        |(light_on, fan_on, posture_alert_on, energy_used_wh)| DeskState {
            light_on,
            fan_on,
            posture_alert_on,
            last_action_ts: None,
            energy_used_wh,
        },
    )
}

fn count(actions: &[Action], pair: [Action; 2]) -> usize {
    actions.iter().filter(|a| pair.contains(a)).count()
}

// ============================================================================
// Tick invariants
// ============================================================================

proptest! {
    /// A zero-length tick never changes the energy total.
    #[test]
    fn zero_dt_keeps_energy(reading in arb_reading(), state in arb_state()) {
        let (next, _) = Controller::default().step(&reading, &state, 0.0, epoch());
        prop_assert_eq!(next.energy_used_wh, state.energy_used_wh);
    }

    /// Energy never decreases, whatever dt is.
    #[test]
    fn energy_is_monotonic(
        reading in arb_reading(),
        state in arb_state(),
        dt in -3600.0f64..=7200.0,
    ) {
        let (next, _) = Controller::default().step(&reading, &state, dt, epoch());
        prop_assert!(next.energy_used_wh >= state.energy_used_wh);
    }

    /// At most one action per channel, always in light/fan/posture order.
    #[test]
    fn one_action_per_channel_in_order(reading in arb_reading(), state in arb_state()) {
        let (_, actions) = Controller::default().step(&reading, &state, 10.0, epoch());
        prop_assert!(count(&actions, [Action::TurnOnLight, Action::TurnOffLight]) <= 1);
        prop_assert!(count(&actions, [Action::TurnOnFan, Action::TurnOffFan]) <= 1);
        prop_assert!(count(&actions, [Action::PostureAlertOn, Action::ClearPostureAlert]) <= 1);

        let rank = |a: &Action| match a {
            Action::TurnOnLight | Action::TurnOffLight => 0,
            Action::TurnOnFan | Action::TurnOffFan => 1,
            Action::PostureAlertOn | Action::ClearPostureAlert => 2,
        };
        let ranks: Vec<_> = actions.iter().map(rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        prop_assert_eq!(ranks, sorted);
    }

    /// Emitted actions are exactly the flags that flipped.
    #[test]
    fn actions_match_flag_flips(reading in arb_reading(), state in arb_state()) {
        let (next, actions) = Controller::default().step(&reading, &state, 10.0, epoch());
        prop_assert_eq!(actions.contains(&Action::TurnOnLight), !state.light_on && next.light_on);
        prop_assert_eq!(actions.contains(&Action::TurnOffLight), state.light_on && !next.light_on);
        prop_assert_eq!(actions.contains(&Action::TurnOnFan), !state.fan_on && next.fan_on);
        prop_assert_eq!(actions.contains(&Action::TurnOffFan), state.fan_on && !next.fan_on);
        prop_assert_eq!(
            actions.contains(&Action::PostureAlertOn),
            !state.posture_alert_on && next.posture_alert_on
        );
        prop_assert_eq!(
            actions.contains(&Action::ClearPostureAlert),
            state.posture_alert_on && !next.posture_alert_on
        );
        prop_assert_eq!(next.last_action_ts.is_some(), !actions.is_empty());
    }

    /// Absence turns everything off, and only the first absent tick emits.
    #[test]
    fn absence_flips_once(mut reading in arb_reading(), state in arb_state()) {
        reading.present = false;
        let c = Controller::default();
        let (s1, _) = c.step(&reading, &state, 10.0, epoch());
        prop_assert!(!s1.light_on && !s1.fan_on && !s1.posture_alert_on);
        let (s2, a2) = c.step(&reading, &s1, 10.0, epoch());
        prop_assert!(a2.is_empty());
        prop_assert_eq!(s2.last_action_ts, s1.last_action_ts);
    }

    /// Lux values strictly inside the band never toggle a light that starts off.
    #[test]
    fn dead_zone_never_flickers(luxes in prop::collection::vec(200.0001f64..399.9999, 1..50)) {
        let c = Controller::default();
        let mut state = DeskState::new();
        for lux in luxes {
            let reading = SensorReading {
                timestamp: epoch(),
                present: true,
                distance_cm: 70.0,
                light_lux: lux,
                temperature_c: 25.0,
                humidity_pct: 40.0,
                posture_score: 0.9,
            };
            let (next, actions) = c.step(&reading, &state, 10.0, epoch());
            prop_assert!(!actions.contains(&Action::TurnOnLight));
            prop_assert!(!actions.contains(&Action::TurnOffLight));
            state = next;
        }
        prop_assert!(!state.light_on);
    }

    /// Feeding the same reading twice: the second tick is silent.
    #[test]
    fn repeated_reading_is_idempotent(reading in arb_reading(), state in arb_state()) {
        let c = Controller::default();
        let (s1, _) = c.step(&reading, &state, 10.0, epoch());
        let (_, a2) = c.step(&reading, &s1, 10.0, epoch());
        prop_assert!(a2.is_empty());
    }
}
