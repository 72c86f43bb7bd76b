//! Host animation capability.
//!
//! The wheel never touches a rendering surface directly. It asks an
//! [`Animator`] to move the strip offset to a target value and awaits the
//! returned future. Dropping that future interrupts the motion wherever it
//! currently is.

mod headless;
mod surface;

pub use headless::{HeadlessAnimator, TransitionRecord};
pub use surface::ReelSurface;

use crate::easing::Easing;
use futures::future::BoxFuture;
use std::time::Duration;

pub trait Animator: Send + Sync + 'static {
    /// Animate the strip offset to `target` over `duration`. The future
    /// resolves exactly once, when the target is reached.
    fn animate(&self, target: f64, duration: Duration, easing: Easing) -> BoxFuture<'static, ()>;

    /// Set the strip offset immediately, without animation.
    fn assign(&self, value: f64);
}

impl<A: Animator + ?Sized> Animator for std::sync::Arc<A> {
    fn animate(&self, target: f64, duration: Duration, easing: Easing) -> BoxFuture<'static, ()> {
        (**self).animate(target, duration, easing)
    }

    fn assign(&self, value: f64) {
        (**self).assign(value)
    }
}
