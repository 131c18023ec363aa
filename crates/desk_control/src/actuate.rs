use desk_core::{ActuatorSink, DeskState};

/// Push the current state to an actuator sink.
///
/// Called every tick whether or not anything changed; the sink filters
/// repeats. Sink failures are logged and never abort the loop.
pub fn drive_actuators(sink: &mut dyn ActuatorSink, state: &DeskState, posture_message: &str) {
    if let Err(e) = sink.set_light(state.light_on) {
        tracing::warn!("Actuator failed to set light: {:#}", e);
    }
    if let Err(e) = sink.set_fan(state.fan_on) {
        tracing::warn!("Actuator failed to set fan: {:#}", e);
    }
    let posture = if state.posture_alert_on {
        sink.send_posture_notification(posture_message)
    } else {
        sink.clear_posture_notification()
    };
    if let Err(e) = posture {
        tracing::warn!("Actuator failed to update posture notification: {:#}", e);
    }
}
