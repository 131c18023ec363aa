//! # Desk control engine
//!
//! The deterministic half of the desk assistant. Each tick:
//!
//! 1. The rule functions in [`rules`] turn a sensor reading into one intent per
//!    channel (light, fan, posture alert)
//! 2. [`Controller::step`] reconciles those intents with the current
//!    [`DeskState`](desk_core::DeskState), emitting an action only when a flag flips
//! 3. Energy is integrated from the post-transition state
//!
//! ## Hysteresis
//!
//! Light and temperature each have an on- and an off-threshold. Readings
//! between the two (the dead zone) leave the device as it is, so noise
//! around a single threshold cannot make it flicker.

mod actuate;
mod controller;
pub mod rules;

pub use actuate::drive_actuators;
pub use controller::Controller;
pub use rules::{PostureIntent, SwitchIntent};
