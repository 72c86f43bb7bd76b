//! Slot-machine reel controller.
//!
//! A wheel is a looping list of items that spins one item at a time, then
//! brakes over a fixed number of items and settles with an overshoot. The
//! controller sequences those single-item transitions; moving pixels is left
//! to a host-supplied [`engine::Animator`].
//!
//! ```no_run
//! # async fn demo() -> Result<(), slot_wheel::WheelError> {
//! use slot_wheel::{engine::ReelSurface, wheel, ReelGeometry, WheelConfig, WheelId};
//!
//! let (events, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let surface = ReelSurface::new();
//! let geometry = ReelGeometry::new(5, 1.0)?;
//! let (handle, _task) = wheel::spawn(WheelId(0), geometry, WheelConfig::default(), surface, events)?;
//! handle.start();
//! # Ok(())
//! # }
//! ```

pub mod easing;
pub mod engine;
pub mod error;
pub mod model;
pub mod wheel;

pub use easing::Easing;
pub use error::WheelError;
pub use model::{
    Operation, SpinDirection, Status, WheelConfig, WheelEvent, WheelId, WheelSnapshot,
};
pub use wheel::{render_strip, ReelGeometry, WheelController, WheelHandle};
