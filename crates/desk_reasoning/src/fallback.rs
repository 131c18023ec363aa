//! Rule-based explanations used whenever the remote model is unavailable.
//!
//! Deterministic: the same reading and actions always produce the same text.

use desk_core::{Action, SensorReading};

pub const AWAY_NO_CHANGE: &str =
    "You seem away from your desk, so I'm keeping everything off to save energy.";
pub const COMFORTABLE_NO_CHANGE: &str = "Conditions look comfortable, so I didn't change anything.";

/// One sentence per action, joined with spaces. Never empty.
pub fn explain_fallback(reading: &SensorReading, actions: &[Action]) -> String {
    let reading = reading.sanitized();

    if actions.is_empty() {
        return if reading.present {
            COMFORTABLE_NO_CHANGE.to_string()
        } else {
            AWAY_NO_CHANGE.to_string()
        };
    }

    let parts: Vec<String> = actions
        .iter()
        .map(|action| sentence_for(*action, &reading))
        .collect();

    parts.join(" ")
}

fn sentence_for(action: Action, r: &SensorReading) -> String {
    match action {
        Action::TurnOnLight => format!(
            "I turned on the desk light because it was quite dim (~{:.0} lux) while you were present.",
            r.light_lux
        ),
        Action::TurnOffLight if r.present => format!(
            "I turned off the desk light because it was bright enough (~{:.0} lux) without extra lighting.",
            r.light_lux
        ),
        Action::TurnOffLight => {
            "I turned off the desk light because you are not at the desk, to save energy.".to_string()
        }
        Action::TurnOnFan => format!(
            "I turned on the fan as the environment felt warm/humid (≈{:.1}°C, {:.0}% RH).",
            r.temperature_c, r.humidity_pct
        ),
        Action::TurnOffFan if r.present => format!(
            "I turned off the fan because the temperature and humidity are back in a comfortable range (≈{:.1}°C, {:.0}% RH).",
            r.temperature_c, r.humidity_pct
        ),
        Action::TurnOffFan => {
            "I turned off the fan because you are not at the desk, to save energy.".to_string()
        }
        Action::PostureAlertOn => format!(
            "I sent a posture reminder since your posture score dropped to {:.2}. Try sitting upright and relaxing your shoulders.",
            r.posture_score
        ),
        Action::ClearPostureAlert if r.present => format!(
            "Nice! Your posture looks better now (score {:.2}), so I'm clearing the posture alert.",
            r.posture_score
        ),
        Action::ClearPostureAlert => {
            "I cleared the posture alert since you stepped away from the desk.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(present: bool) -> SensorReading {
        SensorReading {
            timestamp: Utc::now(),
            present,
            distance_cm: 70.0,
            light_lux: 87.6,
            temperature_c: 28.44,
            humidity_pct: 70.2,
            posture_score: 0.456,
        }
    }

    #[test]
    fn test_no_actions_distinguishes_presence() {
        assert_eq!(explain_fallback(&reading(false), &[]), AWAY_NO_CHANGE);
        assert_eq!(explain_fallback(&reading(true), &[]), COMFORTABLE_NO_CHANGE);
    }

    #[test]
    fn test_values_are_interpolated() {
        let r = reading(true);
        assert!(explain_fallback(&r, &[Action::TurnOnLight]).contains("~88 lux"));
        let fan = explain_fallback(&r, &[Action::TurnOnFan]);
        assert!(fan.contains("28.4°C"));
        assert!(fan.contains("70% RH"));
        assert!(explain_fallback(&r, &[Action::PostureAlertOn]).contains("0.46"));
    }

    #[test]
    fn test_absent_wording() {
        let text = explain_fallback(&reading(false), &[Action::TurnOffLight, Action::TurnOffFan]);
        assert!(text.contains("not at the desk"));
        assert!(!text.contains("lux"));
    }

    #[test]
    fn test_multiple_actions_joined_in_order() {
        let text = explain_fallback(
            &reading(true),
            &[Action::TurnOnLight, Action::TurnOnFan, Action::PostureAlertOn],
        );
        let light = text.find("desk light").unwrap();
        let fan = text.find("fan").unwrap();
        let posture = text.find("posture").unwrap();
        assert!(light < fan && fan < posture);
    }

    #[test]
    fn test_every_action_has_non_empty_text() {
        for present in [true, false] {
            for action in Action::ALL {
                assert!(!explain_fallback(&reading(present), &[action]).is_empty());
            }
        }
    }

    #[test]
    fn test_nan_values_do_not_leak() {
        let mut r = reading(true);
        r.light_lux = f64::NAN;
        let text = explain_fallback(&r, &[Action::TurnOnLight]);
        assert!(text.contains("~0 lux"));
        assert!(!text.contains("NaN"));
    }
}
