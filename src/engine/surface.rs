use super::Animator;
use crate::easing::Easing;
use futures::future::{BoxFuture, FutureExt};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Shared strip offset, advanced frame by frame.
///
/// Clones share the same offset: the wheel task animates one clone while a
/// renderer (possibly on another thread) reads [`ReelSurface::offset`].
#[derive(Debug, Clone)]
pub struct ReelSurface {
    offset: Arc<Mutex<f64>>,
    frame: Duration,
}

impl ReelSurface {
    /// Frame interval used by [`ReelSurface::new`] (~60 fps).
    pub const DEFAULT_FRAME: Duration = Duration::from_millis(16);

    pub fn new() -> Self {
        Self::with_frame(Self::DEFAULT_FRAME)
    }

    pub fn with_frame(frame: Duration) -> Self {
        Self {
            offset: Arc::new(Mutex::new(0.0)),
            frame: frame.max(Duration::from_millis(1)),
        }
    }

    /// Current offset of the strip.
    pub fn offset(&self) -> f64 {
        *lock(&self.offset)
    }
}

impl Default for ReelSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator for ReelSurface {
    fn animate(&self, target: f64, duration: Duration, easing: Easing) -> BoxFuture<'static, ()> {
        let offset = Arc::clone(&self.offset);
        let frame = self.frame;
        async move {
            let from = *lock(&offset);
            if duration.is_zero() {
                *lock(&offset) = target;
                return;
            }

            let start = Instant::now();
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let t = (start.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0);
                *lock(&offset) = from + (target - from) * easing.apply(t);
                if t >= 1.0 {
                    break;
                }
            }
        }
        .boxed()
    }

    fn assign(&self, value: f64) {
        *lock(&self.offset) = value;
    }
}

// The offset is a plain f64, so a poisoned lock still holds a usable value.
fn lock(m: &Mutex<f64>) -> MutexGuard<'_, f64> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn animate_reaches_target() {
        let surface = ReelSurface::new();
        surface.assign(-10.0);
        surface
            .animate(-20.0, Duration::from_millis(100), Easing::Linear)
            .await;
        assert_eq!(surface.offset(), -20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_future_freezes_the_offset_midway() {
        let surface = ReelSurface::new();
        let motion = surface.animate(100.0, Duration::from_millis(400), Easing::Linear);
        let _ = tokio::time::timeout(Duration::from_millis(200), motion).await;

        let frozen = surface.offset();
        assert!(frozen > 0.0 && frozen < 100.0, "offset {frozen}");

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(surface.offset(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_jumps() {
        let surface = ReelSurface::new();
        surface.animate(5.0, Duration::ZERO, Easing::Swing).await;
        assert_eq!(surface.offset(), 5.0);
    }
}
