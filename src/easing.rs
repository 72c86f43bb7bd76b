//! Named easing curves for reel transitions.
//!
//! Each curve maps linear progress `t` in `[0, 1]` to eased progress with
//! `ease(0) == 0` and `ease(1) == 1`. Only `EaseOutBack` leaves that range in
//! between (it overshoots past 1 before settling back).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Overshoot amount of the back curve. Matches the common "easeOutBack" tuning.
const BACK_OVERSHOOT: f64 = 1.70158;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Uniform speed. Used while spinning so consecutive items join seamlessly.
    #[default]
    Linear,
    /// Half-cosine ease in and out.
    Swing,
    /// Cubic ease in and out.
    EaseInOut,
    /// Decelerates past the target, then snaps back onto it.
    EaseOutBack,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Swing => 0.5 - (t * PI).cos() / 2.0,
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
            Easing::EaseOutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + BACK_OVERSHOOT * u * u
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::Swing => "swing",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseOutBack => "ease-out-back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 4] = [
        Easing::Linear,
        Easing::Swing,
        Easing::EaseInOut,
        Easing::EaseOutBack,
    ];

    #[test]
    fn curves_hit_both_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-9, "{} at 0", easing.name());
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{} at 1", easing.name());
        }
    }

    #[test]
    fn back_curve_overshoots() {
        let peak = (1..100)
            .map(|i| Easing::EaseOutBack.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(peak > 1.05);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(Easing::Linear.apply(-0.5), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }
}
