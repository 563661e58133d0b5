//! Momentum after release

use crate::animation::FRAME_BUDGET_MS;

use super::{DragLimits, OVERSCROLL_SLACK, STOP_VELOCITY};

/// Friction is capped below 1.0 so every simulation terminates
const MAX_FRICTION: f64 = 0.999;

/// Outcome of one momentum frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MomentumStep {
    /// Still moving; render this offset
    Coasting {
        /// Offset for this frame
        offset: f64,
    },
    /// Motion ended; snap from this offset
    Settled {
        /// Offset to hand to the snap animation
        offset: f64,
        /// Whether the run was cut short at a clamped boundary
        hit_boundary: bool,
    },
}

/// Decaying trajectory from a release velocity
///
/// Each frame applies `v *= friction; pos += v * 16`. The run ends when the
/// speed drops to [`STOP_VELOCITY`] or, under clamped limits, when the
/// position runs more than [`OVERSCROLL_SLACK`] past a boundary.
#[derive(Clone, Debug)]
pub struct MomentumSimulator {
    velocity: f64,
    position: f64,
    friction: f64,
    limits: Option<DragLimits>,
    frames: u32,
}

impl MomentumSimulator {
    /// Start a run from `start_offset` with release velocity `velocity` (px/ms)
    #[must_use]
    pub fn new(velocity: f64, start_offset: f64, friction: f64, limits: Option<DragLimits>) -> Self {
        Self {
            velocity,
            position: start_offset,
            friction: friction.clamp(0.0, MAX_FRICTION),
            limits,
            frames: 0,
        }
    }

    /// Advance one frame
    pub fn step(&mut self) -> MomentumStep {
        self.frames += 1;
        self.velocity *= self.friction;
        self.position += self.velocity * FRAME_BUDGET_MS;

        if let Some(limits) = self.limits {
            if limits.overshoot(self.position) > OVERSCROLL_SLACK {
                self.position = limits.clamp(self.position);
                self.velocity = 0.0;
                return MomentumStep::Settled {
                    offset: self.position,
                    hit_boundary: true,
                };
            }
        }

        if self.velocity.abs() > STOP_VELOCITY {
            MomentumStep::Coasting {
                offset: self.position,
            }
        } else {
            MomentumStep::Settled {
                offset: self.position,
                hit_boundary: false,
            }
        }
    }

    /// Run to completion and return the hand-off offset
    pub fn run(&mut self) -> f64 {
        loop {
            if let MomentumStep::Settled { offset, .. } = self.step() {
                return offset;
            }
        }
    }

    /// Upper bound on frames before an unconstrained run stops
    ///
    /// Speed after `n` frames is `|v0| * f^n`, so the run ends once
    /// `n >= ln(STOP_VELOCITY / |v0|) / ln(f)`.
    #[must_use]
    pub fn frame_bound(velocity: f64, friction: f64) -> u32 {
        let speed = velocity.abs();
        let friction = friction.clamp(f64::MIN_POSITIVE, MAX_FRICTION);
        if speed * friction <= STOP_VELOCITY {
            return 1;
        }
        let frames = ((STOP_VELOCITY / speed).ln() / friction.ln()).ceil();
        // Bounded by MAX_FRICTION, far below u32::MAX
        frames.max(1.0) as u32
    }

    /// Current velocity in px/ms
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Current offset in pixels
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Frames simulated so far
    #[must_use]
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_integration() {
        let mut sim = MomentumSimulator::new(1.0, 10.0, 0.97, None);
        let step = sim.step();
        assert_eq!(
            step,
            MomentumStep::Coasting {
                offset: 10.0 + 0.97 * 16.0
            }
        );
    }

    #[test]
    fn test_terminates_within_bound() {
        for &(v0, friction) in &[(2.5, 0.97), (-4.0, 0.93), (0.2, 0.97), (12.0, 0.93)] {
            let mut sim = MomentumSimulator::new(v0, 0.0, friction, None);
            sim.run();
            let bound = MomentumSimulator::frame_bound(v0, friction);
            // One frame of slack for floating-point drift in repeated multiplication
            assert!(
                sim.frames() <= bound + 1,
                "v0={v0} f={friction}: {} frames > bound {bound}",
                sim.frames()
            );
        }
    }

    #[test]
    fn test_slow_release_settles_immediately() {
        let mut sim = MomentumSimulator::new(0.04, 5.0, 0.97, None);
        match sim.step() {
            MomentumStep::Settled {
                offset,
                hit_boundary,
            } => {
                assert!(!hit_boundary);
                assert!((offset - (5.0 + 0.04 * 0.97 * 16.0)).abs() < 1e-9);
            }
            other => panic!("expected settle, got {other:?}"),
        }
    }

    #[test]
    fn test_handoff_matches_last_position() {
        let mut sim = MomentumSimulator::new(-1.5, 0.0, 0.93, None);
        let offset = sim.run();
        assert!((offset - sim.position()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_cuts_run_short() {
        let limits = DragLimits {
            min: -90.0,
            max: 0.0,
        };
        let mut sim = MomentumSimulator::new(3.0, 0.0, 0.93, Some(limits));

        match sim.step() {
            MomentumStep::Settled {
                offset,
                hit_boundary,
            } => {
                assert!(hit_boundary);
                assert!(offset.abs() < f64::EPSILON);
            }
            other => panic!("expected boundary settle, got {other:?}"),
        }
    }

    #[test]
    fn test_small_overshoot_within_slack_keeps_coasting() {
        let limits = DragLimits {
            min: -90.0,
            max: 0.0,
        };
        // 0.5 * 0.93 * 16 = 7.44px past the edge, inside the 20px slack
        let mut sim = MomentumSimulator::new(0.5, 0.0, 0.93, Some(limits));
        assert!(matches!(sim.step(), MomentumStep::Coasting { .. }));
    }
}
