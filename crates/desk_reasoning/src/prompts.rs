use desk_core::{join_actions, Action, SensorReading};

pub const SYSTEM_PROMPT: &str = "You are a friendly smart-desk assistant. \
Explain to the user, in one or two short sentences, why the desk just changed \
the light, fan or posture reminder. Mention the measured values that mattered. \
Do not use lists, markdown or emojis.";

pub struct ContextAssembler;

impl ContextAssembler {
    /// User message embedding the reading and the emitted action tokens.
    ///
    /// The last line is always `Actions: ...` (or `Actions: none`).
    pub fn build_prompt(reading: &SensorReading, actions: &[Action]) -> String {
        let reading = reading.sanitized();
        let actions = if actions.is_empty() {
            "none".to_string()
        } else {
            join_actions(actions).replace(';', ", ")
        };
        format!(
            "Time: {}\nUser present: {}\nDesk light level: {:.0} lux\nTemperature: {:.1} °C\nHumidity: {:.0} %\nPosture score: {:.2} (1.0 is ideal)\nActions: {}",
            reading.timestamp.format("%Y-%m-%d %H:%M:%S"),
            if reading.present { "yes" } else { "no" },
            reading.light_lux,
            reading.temperature_c,
            reading.humidity_pct,
            reading.posture_score,
            actions
        )
    }
}
