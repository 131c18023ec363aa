use anyhow::Result;
use desk_core::ActuatorSink;
use std::io::{self, Stdout, Write};

/// Prints actuator commands, one line per change.
///
/// Repeated commands with the same value are suppressed so the console only
/// shows transitions.
pub struct ConsoleActuator<W: Write + Send = Stdout> {
    out: W,
    light: Option<bool>,
    fan: Option<bool>,
    posture_active: bool,
}

impl ConsoleActuator<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleActuator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            light: None,
            fan: None,
            posture_active: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

impl<W: Write + Send> ActuatorSink for ConsoleActuator<W> {
    fn set_light(&mut self, on: bool) -> Result<()> {
        if self.light != Some(on) {
            writeln!(self.out, "  [ACTUATOR] Desk light -> {}", on_off(on))?;
            self.light = Some(on);
        }
        Ok(())
    }

    fn set_fan(&mut self, on: bool) -> Result<()> {
        if self.fan != Some(on) {
            writeln!(self.out, "  [ACTUATOR] Fan -> {}", on_off(on))?;
            self.fan = Some(on);
        }
        Ok(())
    }

    fn send_posture_notification(&mut self, message: &str) -> Result<()> {
        if !self.posture_active {
            writeln!(self.out, "  [ACTUATOR] Posture alert: {}", message)?;
            self.posture_active = true;
        }
        Ok(())
    }

    fn clear_posture_notification(&mut self) -> Result<()> {
        self.posture_active = false;
        Ok(())
    }
}
