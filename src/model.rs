use crate::easing::Easing;
use crate::error::WheelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-wheel configuration, applied at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Duration of one single-item transition while spinning.
    #[serde(with = "humantime_serde")]
    pub spinning_duration: Duration,
    /// Factor the duration is multiplied by on every deceleration step.
    pub spinning_brake: f64,
    /// Divisor applied by `faster()`.
    pub spinning_acceleration: f64,
    /// Number of deceleration steps after the interrupted transition.
    pub items_to_stop: u32,
    /// Logical index shown before the first spin. Wraps modulo the item count.
    pub initial_position: Option<usize>,
    pub direction: SpinDirection,
    pub spinning_easing: Easing,
    /// Easing of the final deceleration step.
    pub settle_easing: Easing,
    /// Restore `spinning_duration` to its configured value on every `start()`.
    pub reset_duration_on_start: bool,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            spinning_duration: Duration::from_millis(500),
            spinning_brake: 1.1,
            spinning_acceleration: 2.0,
            items_to_stop: 3,
            initial_position: None,
            direction: SpinDirection::Forward,
            spinning_easing: Easing::Linear,
            settle_easing: Easing::EaseOutBack,
            reset_duration_on_start: true,
        }
    }
}

impl WheelConfig {
    /// Reject configurations the controller cannot animate.
    pub fn validate(&self) -> Result<(), WheelError> {
        if self.spinning_duration.is_zero() {
            return Err(WheelError::ZeroDuration);
        }
        if !self.spinning_brake.is_finite() || self.spinning_brake <= 1.0 {
            return Err(WheelError::InvalidBrake(self.spinning_brake));
        }
        if !self.spinning_acceleration.is_finite() || self.spinning_acceleration <= 1.0 {
            return Err(WheelError::InvalidAcceleration(self.spinning_acceleration));
        }
        if self.items_to_stop == 0 {
            return Err(WheelError::NoStopSteps);
        }
        Ok(())
    }
}

/// Which way the logical position moves on each transition.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SpinDirection {
    /// Position increases: 0, 1, 2, ... and the strip scrolls up.
    #[default]
    Forward,
    /// Position decreases: 0, N-1, N-2, ...
    Backward,
}

impl SpinDirection {
    pub fn step(self) -> isize {
        match self {
            SpinDirection::Forward => 1,
            SpinDirection::Backward => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Init,
    Ready,
    Starting,
    Spinning,
    Stopping,
    Stopped,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Init => "init",
            Status::Ready => "ready",
            Status::Starting => "starting",
            Status::Spinning => "spinning",
            Status::Stopping => "stopping",
            Status::Stopped => "stopped",
        }
    }

    /// Whether the reel is moving (or about to).
    pub fn is_moving(self) -> bool {
        matches!(
            self,
            Status::Starting | Status::Spinning | Status::Stopping
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public operations a host can request from a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Start,
    Stop,
    Faster,
    Slower,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Faster => "faster",
            Operation::Slower => "slower",
        })
    }
}

/// Identifies the wheel that emitted an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WheelId(pub usize);

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wheel-{}", self.0)
    }
}

/// Point-in-time view of a wheel, published after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelSnapshot {
    pub status: Status,
    pub position: usize,
    #[serde(with = "humantime_serde")]
    pub spinning_duration: Duration,
    pub items_to_stop_to_go: Option<u32>,
}

/// Notifications emitted by a wheel. State-entry events fire once per entry.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WheelEvent {
    Ready {
        wheel: WheelId,
        position: usize,
    },
    Starting {
        wheel: WheelId,
    },
    Spinning {
        wheel: WheelId,
    },
    Stopping {
        wheel: WheelId,
    },
    Stopped {
        wheel: WheelId,
        position: usize,
    },
    /// A single-item transition completed.
    Advanced {
        wheel: WheelId,
        position: usize,
        #[serde(with = "humantime_serde")]
        duration: Duration,
    },
    /// An operation was rejected for the current state.
    Ignored {
        wheel: WheelId,
        #[serde(serialize_with = "serialize_display")]
        error: WheelError,
    },
}

impl WheelEvent {
    pub fn wheel(&self) -> WheelId {
        match self {
            WheelEvent::Ready { wheel, .. }
            | WheelEvent::Starting { wheel }
            | WheelEvent::Spinning { wheel }
            | WheelEvent::Stopping { wheel }
            | WheelEvent::Stopped { wheel, .. }
            | WheelEvent::Advanced { wheel, .. }
            | WheelEvent::Ignored { wheel, .. } => *wheel,
        }
    }

    /// The status this event announces entry into, if any.
    pub fn entered(&self) -> Option<Status> {
        match self {
            WheelEvent::Ready { .. } => Some(Status::Ready),
            WheelEvent::Starting { .. } => Some(Status::Starting),
            WheelEvent::Spinning { .. } => Some(Status::Spinning),
            WheelEvent::Stopping { .. } => Some(Status::Stopping),
            WheelEvent::Stopped { .. } => Some(Status::Stopped),
            WheelEvent::Advanced { .. } | WheelEvent::Ignored { .. } => None,
        }
    }

    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            WheelEvent::Ready { wheel, position } => {
                format!("{wheel} ready at position {position}")
            }
            WheelEvent::Starting { wheel } => format!("{wheel} starting"),
            WheelEvent::Spinning { wheel } => format!("{wheel} spinning"),
            WheelEvent::Stopping { wheel } => format!("{wheel} stopping"),
            WheelEvent::Stopped { wheel, position } => {
                format!("{wheel} stopped at position {position}")
            }
            WheelEvent::Advanced {
                wheel,
                position,
                duration,
            } => format!(
                "{wheel} advanced to {position} ({} ms)",
                duration.as_millis()
            ),
            WheelEvent::Ignored { wheel, error } => format!("{wheel}: {error}"),
        }
    }
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: fmt::Display,
{
    serializer.collect_str(value)
}
