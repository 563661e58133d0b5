//! Animation Primitives
//!
//! Frame-driven timing shared by the carousel physics. Everything here is
//! plain data advanced by an explicit `now_ms` timestamp supplied by the
//! surface's frame loop, so the same code runs under a terminal tick, a
//! browser `requestAnimationFrame`, or a test that fabricates timestamps.
//!
//! # Architecture
//!
//! ```text
//! Surface frame loop (one call per display refresh)
//!     │  now_ms
//!     ▼
//! CarouselController::tick
//!     ├─→ MomentumSimulator (fixed FRAME_BUDGET_MS per step)
//!     └─→ SnapResolver ──→ Tween ──→ EasingFunction
//! ```

mod timing;

pub use timing::{EasingFunction, Tween, TweenSample};

/// Nominal frame budget in milliseconds (one display refresh at ~60 Hz).
///
/// Momentum integrates `position += velocity * FRAME_BUDGET_MS` per frame
/// regardless of the real frame interval.
pub const FRAME_BUDGET_MS: f64 = 16.0;
