//! Boundary Policies
//!
//! The two regimes a carousel can run under. The controller never branches on
//! the regime itself; everything that differs between an endless wheel and a
//! finite strip goes through [`BoundaryPolicy`].

use std::fmt;

use super::RUBBER_BAND_RESISTANCE;

/// Which boundary regime a policy implements
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Modulo wraparound, no limits
    Circular,
    /// Hard limits with rubber-band overscroll
    Clamped,
}

/// An item kept mounted around the centered one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MountedSlot {
    /// Slot offset from the center (negative = left)
    pub slot: i32,
    /// Index of the item shown in this slot
    pub item: usize,
}

/// Pixel range a drag may cover before hitting an end of the strip
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragLimits {
    /// Most negative offset (dragging left until the last item is centered)
    pub min: f64,
    /// Most positive offset (dragging right until the first item is centered)
    pub max: f64,
}

impl DragLimits {
    /// Compress the part of `raw` that lies beyond the limits
    #[must_use]
    pub fn rubber_band(&self, raw: f64, resistance: f64) -> f64 {
        if raw > self.max {
            self.max + (raw - self.max) * resistance
        } else if raw < self.min {
            self.min + (raw - self.min) * resistance
        } else {
            raw
        }
    }

    /// Clamp `offset` into the limits
    #[must_use]
    pub fn clamp(&self, offset: f64) -> f64 {
        offset.clamp(self.min, self.max)
    }

    /// Distance by which `offset` lies outside the limits (0 when inside)
    #[must_use]
    pub fn overshoot(&self, offset: f64) -> f64 {
        if offset > self.max {
            offset - self.max
        } else if offset < self.min {
            self.min - offset
        } else {
            0.0
        }
    }
}

/// Boundary behavior injected into a carousel controller
pub trait BoundaryPolicy: fmt::Debug {
    /// Which regime this is
    fn kind(&self) -> BoundaryKind;

    /// Bring any index back into the valid range for `len` items
    fn normalize(&self, index: i64, len: usize) -> usize;

    /// Drag limits at `index`, or `None` when offsets are unrestricted
    fn drag_limits(&self, index: usize, len: usize, spacing: f64) -> Option<DragLimits>;

    /// Map a raw drag offset to the offset actually rendered
    fn constrain_drag(&self, raw: f64, index: usize, len: usize, spacing: f64) -> f64;

    /// Adjust a naive snap target (in slots) so the settled index stays valid
    fn resolve_snap(&self, slots: i64, index: usize, len: usize) -> i64;

    /// Items to keep mounted, `window` slots each way around `anchor`
    ///
    /// Slots are counted from `index`; `anchor` is the slot nearest the
    /// center while the strip is moving (0 at rest).
    fn mounted_slots(&self, index: usize, len: usize, window: usize, anchor: i64)
        -> Vec<MountedSlot>;
}

/// Endless wheel: every index is taken modulo the item count
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Circular;

impl BoundaryPolicy for Circular {
    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Circular
    }

    fn normalize(&self, index: i64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        // usize -> i64 cannot overflow for any realistic deck
        index.rem_euclid(len as i64) as usize
    }

    fn drag_limits(&self, _index: usize, _len: usize, _spacing: f64) -> Option<DragLimits> {
        None
    }

    fn constrain_drag(&self, raw: f64, _index: usize, _len: usize, _spacing: f64) -> f64 {
        raw
    }

    fn resolve_snap(&self, slots: i64, _index: usize, _len: usize) -> i64 {
        slots
    }

    fn mounted_slots(
        &self,
        index: usize,
        len: usize,
        window: usize,
        anchor: i64,
    ) -> Vec<MountedSlot> {
        if len == 0 {
            return Vec::new();
        }
        // Never mount the same item twice on a short wheel
        let radius = i64::try_from(window.min((len - 1) / 2)).unwrap_or(i64::MAX);
        let first = anchor.saturating_sub(radius);
        let last = anchor.saturating_add(radius);
        (first..=last)
            .filter_map(|slot| {
                Some(MountedSlot {
                    slot: i32::try_from(slot).ok()?,
                    item: self.normalize((index as i64).saturating_add(slot), len),
                })
            })
            .collect()
    }
}

/// Finite strip with rubber-band resistance past either end
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clamped {
    resistance: f64,
}

impl Clamped {
    /// Create a clamped policy with a custom rubber-band resistance
    #[must_use]
    pub fn with_resistance(resistance: f64) -> Self {
        Self {
            resistance: resistance.clamp(0.0, 1.0),
        }
    }

    /// Fraction of overscroll that survives the rubber band
    #[must_use]
    pub fn resistance(&self) -> f64 {
        self.resistance
    }
}

impl Default for Clamped {
    fn default() -> Self {
        Self {
            resistance: RUBBER_BAND_RESISTANCE,
        }
    }
}

impl BoundaryPolicy for Clamped {
    fn kind(&self) -> BoundaryKind {
        BoundaryKind::Clamped
    }

    fn normalize(&self, index: i64, len: usize) -> usize {
        let max_index = len.saturating_sub(1) as i64;
        index.clamp(0, max_index) as usize
    }

    fn drag_limits(&self, index: usize, len: usize, spacing: f64) -> Option<DragLimits> {
        let max_index = len.saturating_sub(1);
        let index = index.min(max_index);
        Some(DragLimits {
            min: -((max_index - index) as f64) * spacing,
            max: index as f64 * spacing,
        })
    }

    fn constrain_drag(&self, raw: f64, index: usize, len: usize, spacing: f64) -> f64 {
        match self.drag_limits(index, len, spacing) {
            Some(limits) => limits.rubber_band(raw, self.resistance),
            None => raw,
        }
    }

    fn resolve_snap(&self, slots: i64, index: usize, len: usize) -> i64 {
        let max_index = len.saturating_sub(1) as i64;
        let index = index as i64;
        let landing = index - slots;
        if landing < 0 {
            index
        } else if landing > max_index {
            index - max_index
        } else {
            slots
        }
    }

    fn mounted_slots(
        &self,
        index: usize,
        len: usize,
        window: usize,
        anchor: i64,
    ) -> Vec<MountedSlot> {
        let Some(max_index) = len.checked_sub(1) else {
            return Vec::new();
        };
        let radius = i64::try_from(window).unwrap_or(i64::MAX);
        let index = index.min(max_index) as i64;
        // Only slots that land on an item: -index ..= max_index - index
        let first = anchor.saturating_sub(radius).max(-index);
        let last = anchor.saturating_add(radius).min(max_index as i64 - index);
        (first..=last)
            .filter_map(|slot| {
                Some(MountedSlot {
                    slot: i32::try_from(slot).ok()?,
                    item: (index + slot) as usize,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_normalize_wraps_both_ways() {
        let policy = Circular;
        assert_eq!(policy.normalize(-1, 78), 77);
        assert_eq!(policy.normalize(78, 78), 0);
        assert_eq!(policy.normalize(-157, 78), 77);
        assert_eq!(policy.normalize(5, 0), 0);
    }

    #[test]
    fn test_circular_leaves_offsets_alone() {
        let policy = Circular;
        assert!((policy.constrain_drag(-12_345.0, 0, 78, 90.0) + 12_345.0).abs() < f64::EPSILON);
        assert!(policy.drag_limits(0, 78, 90.0).is_none());
        assert_eq!(policy.resolve_snap(-40, 3, 78), -40);
    }

    #[test]
    fn test_clamped_limits_follow_index() {
        let policy = Clamped::default();
        let limits = policy.drag_limits(3, 10, 90.0).unwrap();
        assert!((limits.max - 270.0).abs() < f64::EPSILON);
        assert!((limits.min + 540.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rubber_band_at_first_item() {
        let policy = Clamped::default();
        let realized = policy.constrain_drag(500.0, 0, 10, 90.0);
        assert!((realized - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rubber_band_overflow_is_scaled_exactly() {
        let policy = Clamped::default();
        let limits = policy.drag_limits(9, 10, 90.0).unwrap();

        for overflow in [0.5, 7.0, 90.0, 1234.5] {
            let right = policy.constrain_drag(limits.max + overflow, 9, 10, 90.0);
            assert!((right - limits.max - overflow * 0.2).abs() < 1e-9);

            let left = policy.constrain_drag(limits.min - overflow, 9, 10, 90.0);
            assert!((limits.min - left - overflow * 0.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_clamped_resolve_snap_stays_in_range() {
        let policy = Clamped::default();
        // At index 1, snapping 3 slots right would land on -2
        assert_eq!(policy.resolve_snap(3, 1, 10), 1);
        // At index 8, snapping 4 slots left would land on 12
        assert_eq!(policy.resolve_snap(-4, 8, 10), -1);
        assert_eq!(policy.resolve_snap(2, 5, 10), 2);
    }

    #[test]
    fn test_mounted_windows() {
        let clamped = Clamped::default().mounted_slots(1, 10, 3, 0);
        let slots: Vec<i32> = clamped.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![-1, 0, 1, 2, 3]);
        assert_eq!(clamped[0].item, 0);

        let circular = Circular.mounted_slots(0, 78, 2, 0);
        let items: Vec<usize> = circular.iter().map(|m| m.item).collect();
        assert_eq!(items, vec![76, 77, 0, 1, 2]);

        // A five-card wheel mounts each card once
        assert_eq!(Circular.mounted_slots(0, 5, 20, 0).len(), 5);
    }

    #[test]
    fn test_mounted_window_follows_anchor() {
        // Thirty slots into a flick the wheel mounts around slot -30
        let circular = Circular.mounted_slots(0, 78, 2, -30);
        let slots: Vec<i32> = circular.iter().map(|m| m.slot).collect();
        assert_eq!(slots, vec![-32, -31, -30, -29, -28]);
        assert_eq!(circular[2].item, 48);

        // Rubber band past the first item keeps the real items mounted
        let clamped = Clamped::default().mounted_slots(0, 10, 2, -1);
        let items: Vec<usize> = clamped.iter().map(|m| m.item).collect();
        assert_eq!(items, vec![0, 1]);
    }

    #[test]
    fn test_huge_window_is_bounded_by_items() {
        assert_eq!(Clamped::default().mounted_slots(4, 10, usize::MAX, 0).len(), 10);
        assert_eq!(Clamped::default().mounted_slots(0, 10, 2_000_000_000, 0).len(), 10);
        assert_eq!(Circular.mounted_slots(0, 78, usize::MAX, 0).len(), 77);
        assert!(Clamped::default().mounted_slots(0, 0, 10, 0).is_empty());
    }
}
