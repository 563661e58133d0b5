//! Easing and Tweening
//!
//! Time-based interpolation with easing curves. A [`Tween`] is sampled with
//! absolute timestamps, so a late frame simply lands further along the curve
//! instead of slowing the animation down.

use serde::{Deserialize, Serialize};

/// Easing functions for smooth animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Quadratic ease out
    EaseOutQuad,

    /// Cubic ease out, used for slot snapping
    EaseOutCubic,

    /// Cubic ease in and out
    EaseInOutCubic,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// One sampled point of a [`Tween`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TweenSample {
    /// Interpolated value at the sample time
    pub value: f64,
    /// Linear progress through the duration (0.0 to 1.0)
    pub progress: f64,
    /// Whether the tween reached its end value
    pub finished: bool,
}

/// Interpolates a scalar from `from` to `to` over a fixed duration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    started_at_ms: f64,
    duration_ms: f64,
    easing: EasingFunction,
}

impl Tween {
    /// Create a tween starting at `started_at_ms`
    #[must_use]
    pub fn new(
        from: f64,
        to: f64,
        started_at_ms: f64,
        duration_ms: f64,
        easing: EasingFunction,
    ) -> Self {
        Self {
            from,
            to,
            started_at_ms,
            duration_ms: duration_ms.max(0.0),
            easing,
        }
    }

    /// Starting value
    #[must_use]
    pub fn from(&self) -> f64 {
        self.from
    }

    /// End value
    #[must_use]
    pub fn to(&self) -> f64 {
        self.to
    }

    /// Sample the tween at an absolute timestamp
    ///
    /// Timestamps before the start clamp to the starting value; a zero
    /// duration finishes on the first sample.
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> TweenSample {
        let progress = if self.duration_ms <= 0.0 {
            1.0
        } else {
            ((now_ms - self.started_at_ms) / self.duration_ms).clamp(0.0, 1.0)
        };

        let finished = progress >= 1.0;
        let value = if finished {
            self.to
        } else {
            self.from + (self.to - self.from) * self.easing.apply(progress)
        };

        TweenSample {
            value,
            progress,
            finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_linear() {
        assert!(EasingFunction::Linear.apply(0.0).abs() < f64::EPSILON);
        assert!((EasingFunction::Linear.apply(0.5) - 0.5).abs() < f64::EPSILON);
        assert!((EasingFunction::Linear.apply(1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseOutQuad,
            EasingFunction::EaseOutCubic,
            EasingFunction::EaseInOutCubic,
        ] {
            assert!(
                easing.apply(0.0).abs() < 1e-9,
                "{easing:?} at 0.0 = {}",
                easing.apply(0.0)
            );
            assert!(
                (easing.apply(1.0) - 1.0).abs() < 1e-9,
                "{easing:?} at 1.0 = {}",
                easing.apply(1.0)
            );
        }
    }

    #[test]
    fn test_ease_out_cubic_front_loaded() {
        // Half the time covers 87.5% of the distance
        assert!((EasingFunction::EaseOutCubic.apply(0.5) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_tween_sampling() {
        let tween = Tween::new(0.0, 100.0, 1000.0, 200.0, EasingFunction::Linear);

        let before = tween.sample(900.0);
        assert!(before.value.abs() < 1e-9);
        assert!(!before.finished);

        let mid = tween.sample(1100.0);
        assert!((mid.value - 50.0).abs() < 1e-9);
        assert!((mid.progress - 0.5).abs() < 1e-9);

        let end = tween.sample(1250.0);
        assert!(end.finished);
        assert!((end.value - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let tween = Tween::new(10.0, -5.0, 0.0, 0.0, EasingFunction::EaseOutCubic);
        let sample = tween.sample(0.0);
        assert!(sample.finished);
        assert!((sample.value + 5.0).abs() < f64::EPSILON);
    }
}
