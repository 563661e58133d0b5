//! Direct-Write Render Projection
//!
//! During a drag or animation the carousel produces a new layout every frame.
//! Routing that through a declarative UI tree would rebuild the tree at
//! display rate, so instead the projector writes each mounted slot's
//! transform straight into a [`RenderTarget`]. The declarative layer only
//! hears about the discrete index once motion settles.

use std::collections::BTreeMap;

use super::MountedSlot;

/// Lower bound on item scale
const MIN_SCALE: f64 = 0.55;
/// Scale lost per slot of distance from center
const SCALE_FALLOFF: f64 = 0.15;
/// Lower bound on item opacity
const MIN_OPACITY: f64 = 0.08;
/// Opacity lost per slot of distance from center
const OPACITY_FALLOFF: f64 = 0.25;
/// Vertical drop factor (pixels per squared slot)
const DROP_FACTOR: f64 = 3.0;
/// Tilt per slot, in degrees
const TILT_DEGREES: f64 = 2.5;
/// Stacking order of the centered item
const BASE_Z_INDEX: i32 = 10;

/// Visual transform of one mounted item
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotTransform {
    /// Horizontal translation in pixels
    pub translate_x: f64,
    /// Vertical translation in pixels
    pub translate_y: f64,
    /// Uniform scale factor
    pub scale: f64,
    /// Opacity (0.0 to 1.0)
    pub opacity: f64,
    /// Rotation in degrees
    pub rotation_deg: f64,
    /// Stacking order (higher = on top)
    pub z_index: i32,
}

impl SlotTransform {
    /// Transform for an item at fractional slot position `effective`
    #[must_use]
    pub fn at(effective: f64, spacing: f64) -> Self {
        let distance = effective.abs();
        Self {
            translate_x: effective * spacing,
            translate_y: distance * distance * DROP_FACTOR,
            scale: (1.0 - distance * SCALE_FALLOFF).max(MIN_SCALE),
            opacity: (1.0 - distance * OPACITY_FALLOFF).max(MIN_OPACITY),
            rotation_deg: effective * TILT_DEGREES,
            // Distances are bounded by the mounted window
            z_index: BASE_Z_INDEX - distance.round() as i32,
        }
    }
}

/// Receives per-frame transforms, independent of any UI framework
pub trait RenderTarget {
    /// Apply `transform` to the item mounted at `slot`
    fn set_transform(&mut self, slot: i32, transform: SlotTransform);
}

/// Render target that records the latest transform per slot
///
/// Surfaces that paint in immediate mode (a terminal, a canvas) can read
/// this back when drawing the frame.
#[derive(Clone, Debug, Default)]
pub struct TransformBuffer {
    transforms: BTreeMap<i32, SlotTransform>,
}

impl TransformBuffer {
    /// Create an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest transform written for `slot`
    #[must_use]
    pub fn get(&self, slot: i32) -> Option<&SlotTransform> {
        self.transforms.get(&slot)
    }

    /// Slots and transforms in back-to-front stacking order
    #[must_use]
    pub fn paint_order(&self) -> Vec<(i32, SlotTransform)> {
        let mut entries: Vec<_> = self.transforms.iter().map(|(s, t)| (*s, *t)).collect();
        entries.sort_by_key(|(_, t)| t.z_index);
        entries
    }

    /// Number of slots written
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Forget all transforms (the mounted set changed)
    pub fn clear(&mut self) {
        self.transforms.clear();
    }
}

impl RenderTarget for TransformBuffer {
    fn set_transform(&mut self, slot: i32, transform: SlotTransform) {
        self.transforms.insert(slot, transform);
    }
}

/// Maps a pixel offset onto every mounted slot
#[derive(Clone, Copy, Debug)]
pub struct RenderProjector {
    spacing: f64,
}

impl RenderProjector {
    /// Create a projector for the given item spacing
    #[must_use]
    pub fn new(spacing: f64) -> Self {
        Self { spacing }
    }

    /// Write transforms for `slots` shifted by `offset_px`
    pub fn project<T: RenderTarget + ?Sized>(
        &self,
        offset_px: f64,
        slots: &[MountedSlot],
        target: &mut T,
    ) {
        let fraction = offset_px / self.spacing;
        for mounted in slots {
            let effective = f64::from(mounted.slot) + fraction;
            target.set_transform(mounted.slot, SlotTransform::at(effective, self.spacing));
        }
    }
}
