//! Carousel Controller
//!
//! Owns the physics record and sequences gesture, momentum, and snap. The
//! controller is driven entirely by the caller: pointer events come in through
//! the `on_drag_*` methods and time advances through [`CarouselController::tick`].
//! No timers or threads are involved, so a surface can tick it from whatever
//! frame clock it has.

use rand::Rng;
use tracing::debug;

use crate::deck::Card;
use crate::selection::{Selection, SelectionError, Toggle};

use super::{
    BoundaryPolicy, CarouselConfig, GestureTracker, MomentumSimulator, MomentumStep, MountedSlot,
    RenderProjector, RenderTarget, SnapResolver, MOMENTUM_THRESHOLD,
};

/// Physics state, separate from anything the UI observes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CarouselState {
    /// Index of the centered item
    pub current_index: usize,
    /// Transient pixel offset; exactly 0 when at rest
    pub drag_offset: f64,
    /// Current velocity in px/ms
    pub velocity: f64,
    /// Whether a pointer gesture is in progress
    pub is_dragging: bool,
    /// Whether momentum or a snap is running
    pub is_animating: bool,
}

/// Discrete notifications for the declarative layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarouselEvent {
    /// Motion stopped on a new centered item
    Settled {
        /// The new current index
        index: usize,
    },
}

/// Direction of a discrete step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Center the item to the left
    Previous,
    /// Center the item to the right
    Next,
}

impl Direction {
    fn delta(self) -> i64 {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Animation currently driving the offset
#[derive(Clone, Debug)]
enum Motion {
    Momentum(MomentumSimulator),
    Snap(SnapResolver),
}

/// Gesture-driven carousel over `len` items
#[derive(Debug)]
pub struct CarouselController<B: BoundaryPolicy> {
    policy: B,
    config: CarouselConfig,
    len: usize,
    state: CarouselState,
    gesture: GestureTracker,
    motion: Option<Motion>,
    projector: RenderProjector,
}

impl<B: BoundaryPolicy> CarouselController<B> {
    /// Create a controller at rest on the first item
    pub fn new(policy: B, config: CarouselConfig, len: usize) -> Self {
        let projector = RenderProjector::new(config.spacing);
        Self {
            policy,
            config,
            len,
            state: CarouselState::default(),
            gesture: GestureTracker::new(),
            motion: None,
            projector,
        }
    }

    /// Current physics state
    #[must_use]
    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    /// Index of the centered item
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The boundary policy in use
    #[must_use]
    pub fn policy(&self) -> &B {
        &self.policy
    }

    /// Tuning in use
    #[must_use]
    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Replace the item list length; stops any motion and renormalizes
    pub fn set_len(&mut self, len: usize) {
        self.cancel();
        self.len = len;
        self.state.current_index = self.policy.normalize(self.state.current_index as i64, len);
    }

    /// Item nearest the center right now, including any in-flight offset
    #[must_use]
    pub fn previewed_index(&self) -> usize {
        self.policy
            .normalize(self.state.current_index as i64 - self.offset_slots(), self.len)
    }

    /// Items mounted around the previewed item
    ///
    /// Slots stay relative to the current index, so a long flick moves the
    /// window along with the strip instead of leaving the center empty.
    #[must_use]
    pub fn mounted_slots(&self) -> Vec<MountedSlot> {
        self.policy.mounted_slots(
            self.state.current_index,
            self.len,
            self.config.window,
            -self.offset_slots(),
        )
    }

    /// Whole slots covered by the current offset
    fn offset_slots(&self) -> i64 {
        (self.state.drag_offset / self.config.spacing).round() as i64
    }

    /// Write the current offset to every mounted slot
    pub fn project<T: RenderTarget + ?Sized>(&self, target: &mut T) {
        self.projector
            .project(self.state.drag_offset, &self.mounted_slots(), target);
    }

    /// Pointer down at `x`
    ///
    /// Any running animation is cut short: the whole slots it already covered
    /// are committed to the index and the offset returns to 0, so the new
    /// drag starts from a rest position.
    pub fn on_drag_start(&mut self, x: f64, now_ms: f64) -> Option<CarouselEvent> {
        let mut event = None;

        if self.motion.take().is_some() {
            let covered = self.offset_slots();
            let before = self.state.current_index;
            self.state.current_index = self
                .policy
                .normalize(before as i64 - covered, self.len);
            self.state.drag_offset = 0.0;
            self.state.is_animating = false;
            debug!(
                from = before,
                to = self.state.current_index,
                "Animation interrupted by drag"
            );
            if self.state.current_index != before {
                event = Some(CarouselEvent::Settled {
                    index: self.state.current_index,
                });
            }
        }

        self.gesture.start(x, now_ms);
        self.state.velocity = 0.0;
        self.state.is_dragging = true;
        event
    }

    /// Pointer moved to `x`
    pub fn on_drag_move<T: RenderTarget + ?Sized>(&mut self, x: f64, now_ms: f64, target: &mut T) {
        if !self.state.is_dragging {
            return;
        }
        let Some(raw) = self.gesture.update(x, now_ms) else {
            return;
        };

        self.state.drag_offset = self.policy.constrain_drag(
            raw,
            self.state.current_index,
            self.len,
            self.config.spacing,
        );
        self.state.velocity = self.gesture.velocity();
        self.project(target);
    }

    /// Pointer released; hands off to momentum or straight to a snap
    pub fn on_drag_end(&mut self, now_ms: f64) {
        if !self.state.is_dragging {
            return;
        }
        self.state.is_dragging = false;
        let velocity = self.gesture.end().unwrap_or(0.0);
        self.state.velocity = velocity;

        let motion = if velocity.abs() > MOMENTUM_THRESHOLD {
            debug!(velocity, offset = self.state.drag_offset, "Momentum started");
            let limits = self.policy.drag_limits(
                self.state.current_index,
                self.len,
                self.config.spacing,
            );
            Motion::Momentum(MomentumSimulator::new(
                velocity,
                self.state.drag_offset,
                self.config.friction,
                limits,
            ))
        } else {
            self.state.velocity = 0.0;
            Motion::Snap(self.plan_snap(now_ms))
        };

        self.motion = Some(motion);
        self.state.is_animating = true;
    }

    /// Advance any running animation to `now_ms`
    ///
    /// Returns [`CarouselEvent::Settled`] on the frame the snap completes.
    pub fn tick<T: RenderTarget + ?Sized>(
        &mut self,
        now_ms: f64,
        target: &mut T,
    ) -> Option<CarouselEvent> {
        match self.motion.take()? {
            Motion::Momentum(mut sim) => {
                match sim.step() {
                    MomentumStep::Coasting { offset } => {
                        self.state.drag_offset = offset;
                        self.state.velocity = sim.velocity();
                        self.motion = Some(Motion::Momentum(sim));
                    }
                    MomentumStep::Settled {
                        offset,
                        hit_boundary,
                    } => {
                        debug!(offset, hit_boundary, frames = sim.frames(), "Momentum settled");
                        self.state.drag_offset = offset;
                        self.state.velocity = 0.0;
                        self.motion = Some(Motion::Snap(self.plan_snap(now_ms)));
                    }
                }
                self.project(target);
                None
            }
            Motion::Snap(snap) => {
                let sample = snap.sample(now_ms);
                if !sample.finished {
                    self.state.drag_offset = sample.value;
                    self.motion = Some(Motion::Snap(snap));
                    self.project(target);
                    return None;
                }

                let index = snap.settled_index(self.state.current_index, self.len, &self.policy);
                self.state.current_index = index;
                self.state.drag_offset = 0.0;
                self.state.velocity = 0.0;
                self.state.is_animating = false;
                self.project(target);
                debug!(index, "Carousel settled");
                Some(CarouselEvent::Settled { index })
            }
        }
    }

    /// Move one item left or right without animating
    ///
    /// Ignored while dragging or animating, and at either end of a clamped
    /// strip.
    pub fn step(&mut self, direction: Direction) -> Option<CarouselEvent> {
        if self.state.is_dragging || self.state.is_animating || self.len == 0 {
            return None;
        }
        let before = self.state.current_index;
        let index = self
            .policy
            .normalize(before as i64 + direction.delta(), self.len);
        if index == before {
            return None;
        }
        self.state.current_index = index;
        Some(CarouselEvent::Settled { index })
    }

    /// Jump straight to `index` (normalized), stopping any motion
    pub fn jump_to(&mut self, index: usize) {
        self.cancel();
        self.state.current_index = self.policy.normalize(index as i64, self.len);
    }

    /// Stop all motion and drop any gesture, leaving the index unchanged
    pub fn cancel(&mut self) {
        self.motion = None;
        self.gesture.reset();
        self.state.drag_offset = 0.0;
        self.state.velocity = 0.0;
        self.state.is_dragging = false;
        self.state.is_animating = false;
    }

    /// Toggle the centered item of `items` in `selection`
    ///
    /// # Errors
    ///
    /// [`SelectionError::Busy`] while the carousel is moving,
    /// [`SelectionError::NoCard`] when `items` has nothing at the current
    /// index, and [`SelectionError::Full`] when adding to a complete spread.
    pub fn select_current<R: Rng + ?Sized>(
        &self,
        items: &[Card],
        selection: &mut Selection,
        rng: &mut R,
    ) -> Result<Toggle, SelectionError> {
        if self.state.is_animating || self.state.is_dragging {
            return Err(SelectionError::Busy);
        }
        let index = self.state.current_index;
        let card = items.get(index).ok_or(SelectionError::NoCard(index))?;
        selection.toggle(card, rng)
    }

    fn plan_snap(&self, now_ms: f64) -> SnapResolver {
        SnapResolver::new(
            self.state.drag_offset,
            self.state.current_index,
            self.len,
            &self.policy,
            &self.config,
            now_ms,
        )
    }
}
