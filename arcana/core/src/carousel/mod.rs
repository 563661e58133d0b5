//! Gesture-Driven Carousel
//!
//! A snapping wheel of items driven by raw pointer motion. The physics state
//! lives in a plain record owned by [`CarouselController`]; surfaces feed it
//! pointer events and frame ticks and receive two kinds of output:
//!
//! - per-frame [`SlotTransform`]s written straight into a [`RenderTarget`]
//!   (one per mounted slot), bypassing whatever declarative tree the surface
//!   uses, and
//! - a discrete [`CarouselEvent::Settled`] once motion stops, which is the only
//!   thing the declarative layer needs to reconcile.
//!
//! # Lifecycle
//!
//! ```text
//! drag start ──→ GestureTracker ──→ drag move* ──→ drag end
//!                                                    │
//!                         |velocity| > 0.15 px/ms ───┼─── otherwise
//!                                   │                │
//!                          MomentumSimulator         │
//!                                   │                │
//!                                   └──→ SnapResolver ←┘
//!                                              │
//!                                         Settled { index }
//! ```
//!
//! Two boundary regimes share the controller through [`BoundaryPolicy`]:
//! [`Circular`] for the selection wheel and [`Clamped`] for the finite
//! reviewer.

mod boundary;
mod controller;
mod gesture;
mod momentum;
mod projector;
mod snap;

pub use boundary::{BoundaryKind, BoundaryPolicy, Circular, Clamped, DragLimits, MountedSlot};
pub use controller::{CarouselController, CarouselEvent, CarouselState, Direction};
pub use gesture::GestureTracker;
pub use momentum::{MomentumSimulator, MomentumStep};
pub use projector::{RenderProjector, RenderTarget, SlotTransform, TransformBuffer};
pub use snap::SnapResolver;

/// Default distance between adjacent item centers, in pixels
pub const DEFAULT_SPACING: f64 = 90.0;

/// Release speed (px/ms) above which a drag hands off to momentum
pub const MOMENTUM_THRESHOLD: f64 = 0.15;

/// Speed (px/ms) below which momentum stops
pub const STOP_VELOCITY: f64 = 0.05;

/// Pixels momentum may run past a clamped boundary before it is cut short
pub const OVERSCROLL_SLACK: f64 = 20.0;

/// Fraction of overscroll that survives the rubber band
pub const RUBBER_BAND_RESISTANCE: f64 = 0.2;

/// Tuning for one carousel instance
#[derive(Clone, Debug, PartialEq)]
pub struct CarouselConfig {
    /// Distance between adjacent item centers, in pixels
    pub spacing: f64,
    /// Per-frame velocity multiplier during momentum
    pub friction: f64,
    /// Duration of the snap animation in milliseconds
    pub snap_duration_ms: f64,
    /// Slots kept mounted on each side of the centered item
    pub window: usize,
}

impl CarouselConfig {
    /// Tuning for the infinite selection wheel
    #[must_use]
    pub fn wheel() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            friction: 0.97,
            snap_duration_ms: 280.0,
            window: 20,
        }
    }

    /// Tuning for the finite post-selection reviewer
    #[must_use]
    pub fn reviewer() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            friction: 0.93,
            snap_duration_ms: 400.0,
            window: 10,
        }
    }

    /// Override the spacing (non-positive values fall back to the default)
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = if spacing > 0.0 {
            spacing
        } else {
            DEFAULT_SPACING
        };
        self
    }

    /// Override the mounted window radius
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self::wheel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let wheel = CarouselConfig::wheel();
        assert!((wheel.friction - 0.97).abs() < f64::EPSILON);
        assert!((wheel.snap_duration_ms - 280.0).abs() < f64::EPSILON);
        assert_eq!(wheel.window, 20);

        let reviewer = CarouselConfig::reviewer();
        assert!((reviewer.friction - 0.93).abs() < f64::EPSILON);
        assert!((reviewer.snap_duration_ms - 400.0).abs() < f64::EPSILON);
        assert_eq!(reviewer.window, 10);
    }

    #[test]
    fn test_invalid_spacing_falls_back() {
        let config = CarouselConfig::wheel().with_spacing(-4.0);
        assert!((config.spacing - DEFAULT_SPACING).abs() < f64::EPSILON);
    }
}
