//! Property-based tests for prompts and fallback explanations.

use chrono::{TimeZone, Utc};
use desk_core::{Action, SensorReading};
use desk_reasoning::explain_fallback;
use desk_reasoning::prompts::ContextAssembler;
use proptest::prelude::*;

fn arb_reading() -> impl Strategy<Value = SensorReading> {
    (
        any::<bool>(),
        prop_oneof![0.0..2000.0f64, Just(f64::NAN), Just(f64::INFINITY)],
        -10.0..45.0f64,
        0.0..100.0f64,
        prop_oneof![0.0..=1.0f64, Just(f64::NAN)],
    )
        .prop_map(|(present, light_lux, temperature_c, humidity_pct, posture_score)| {
            SensorReading {
                timestamp: Utc.with_ymd_and_hms(2020, 1, 1, 18, 0, 0).unwrap(),
                present,
                distance_cm: 70.0,
                light_lux,
                temperature_c,
                humidity_pct,
                posture_score,
            }
        })
}

fn arb_actions() -> impl Strategy<Value = Vec<Action>> {
    proptest::sample::subsequence(Action::ALL.to_vec(), 0..=3)
}

proptest! {
    #[test]
    fn fallback_is_never_empty(reading in arb_reading(), actions in arb_actions()) {
        let text = explain_fallback(&reading, &actions);
        prop_assert!(!text.trim().is_empty());
        prop_assert!(!text.contains("NaN"));
        prop_assert!(!text.contains("inf"));
    }

    #[test]
    fn fallback_is_deterministic(reading in arb_reading(), actions in arb_actions()) {
        prop_assert_eq!(
            explain_fallback(&reading, &actions),
            explain_fallback(&reading, &actions)
        );
    }

    #[test]
    fn prompt_lists_every_action(reading in arb_reading(), actions in arb_actions()) {
        let prompt = ContextAssembler::build_prompt(&reading, &actions);
        for action in &actions {
            prop_assert!(prompt.contains(action.as_str()));
        }
        if actions.is_empty() {
            prop_assert!(prompt.contains("Actions: none"));
        }
    }
}
