//! Snapping to the nearest slot

use crate::animation::{EasingFunction, Tween, TweenSample};

use super::{BoundaryPolicy, CarouselConfig};

/// Eases an offset onto the nearest whole slot
///
/// The target is `round(offset / spacing)` slots, adjusted by the boundary
/// policy so the settled index stays valid. The index only changes when the
/// controller commits the finished snap.
#[derive(Clone, Debug)]
pub struct SnapResolver {
    tween: Tween,
    target_slots: i64,
}

impl SnapResolver {
    /// Plan a snap from `from_offset` at carousel position `index`
    #[must_use]
    pub fn new<B: BoundaryPolicy + ?Sized>(
        from_offset: f64,
        index: usize,
        len: usize,
        policy: &B,
        config: &CarouselConfig,
        now_ms: f64,
    ) -> Self {
        let naive = (from_offset / config.spacing).round() as i64;
        let target_slots = policy.resolve_snap(naive, index, len);
        let target_offset = target_slots as f64 * config.spacing;

        Self {
            tween: Tween::new(
                from_offset,
                target_offset,
                now_ms,
                config.snap_duration_ms,
                EasingFunction::EaseOutCubic,
            ),
            target_slots,
        }
    }

    /// Slots the strip moves by when the snap completes
    #[must_use]
    pub fn target_slots(&self) -> i64 {
        self.target_slots
    }

    /// Pixel offset the snap eases towards
    #[must_use]
    pub fn target_offset(&self) -> f64 {
        self.tween.to()
    }

    /// Interpolated offset at `now_ms`
    #[must_use]
    pub fn sample(&self, now_ms: f64) -> TweenSample {
        self.tween.sample(now_ms)
    }

    /// Index the carousel lands on once this snap completes
    #[must_use]
    pub fn settled_index<B: BoundaryPolicy + ?Sized>(
        &self,
        index: usize,
        len: usize,
        policy: &B,
    ) -> usize {
        policy.normalize(index as i64 - self.target_slots, len)
    }
}
