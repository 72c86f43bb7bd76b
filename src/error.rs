//! Error types for the wheel controller.

use crate::model::{Operation, Status};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WheelError {
    /// Operation requested in a state that does not accept it. Never fatal.
    #[error("cannot {op} wheel while it is {status}")]
    InvalidOperation { op: Operation, status: Status },

    /// `stop()` arrived while a previous stop is still rolling out.
    #[error("wheel is already rolling out a stop")]
    AlreadyStopping,

    #[error("a wheel needs at least one item")]
    EmptyReel,

    #[error("item height must be positive and finite, got {0}")]
    InvalidItemHeight(f64),

    #[error("spinning brake must be greater than 1, got {0}")]
    InvalidBrake(f64),

    #[error("spinning acceleration must be greater than 1, got {0}")]
    InvalidAcceleration(f64),

    #[error("items to stop must be at least 1")]
    NoStopSteps,

    #[error("spinning duration must be non-zero")]
    ZeroDuration,
}
