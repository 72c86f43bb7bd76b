//! Application-level orchestration utilities.
//!
//! This module owns the bank of wheels: spawning them, routing start/stop
//! commands from the UI or CLI layers, and pacing staggered stops. Presentation
//! layers only send `UiCommand`s and consume `WheelEvent`s.

mod controller;

pub(crate) use controller::{run_controller, spawn_bank, UiCommand};
