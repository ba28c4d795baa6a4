//! Crop/zoom of an image constrained to a fixed template slot.
//!
//! The adjustment stores translation as a fraction of the excess (scaled
//! image size minus slot size) rather than pixels, so the same value replays
//! identically whether the slot is rendered as a thumbnail or a full export.

use serde::{Deserialize, Serialize};
use slotframe_gesture::{
    GestureComposer, GestureThresholds, Manipulation, Rect, Size, TouchEvent, Vector,
};

use crate::bridge::BridgeHandle;
use crate::element::{ElementId, ElementKind, ScaleBounds};
use crate::session::{GestureSession, ManipulationTarget, SessionOutcome};

/// Scale and excess-fraction translation of a slot image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotCropAdjustment {
    /// Zoom, `1.0` covers the slot exactly
    pub scale: f32,
    /// Fraction of half the horizontal excess, in `[-1, 1]`
    pub translate_x: f32,
    /// Fraction of half the vertical excess, in `[-1, 1]`
    pub translate_y: f32,
}

impl SlotCropAdjustment {
    pub fn new(scale: f32, translate_x: f32, translate_y: f32) -> Self {
        Self {
            scale,
            translate_x,
            translate_y,
        }
    }

    /// Image covering the slot, centered.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Clamp every field into the built-in photo range.
    pub fn normalized(&self) -> Self {
        self.normalized_within(ElementKind::Photo.default_bounds())
    }

    /// Clamp scale into `bounds` (never below 1, the image must cover the
    /// slot) and the fractions into `[-1, 1]`. At scale 1 there is no excess,
    /// so translation is forced to zero.
    pub fn normalized_within(&self, bounds: ScaleBounds) -> Self {
        let scale = bounds.clamp(self.scale).max(1.0);
        if scale <= 1.0 {
            return Self::new(1.0, 0.0, 0.0);
        }
        Self::new(
            scale,
            clamp_fraction(self.translate_x),
            clamp_fraction(self.translate_y),
        )
    }

    /// Pixel shift of the image center from the slot center.
    ///
    /// Returns `None` when the slot or image is degenerate.
    pub fn image_offset(&self, slot: Size, image: Size) -> Option<Vector> {
        let adjustment = self.sanitized();
        let half_excess = half_excess(slot, image, adjustment.scale)?;
        Some(Vector::new(
            adjustment.translate_x * half_excess.dx,
            adjustment.translate_y * half_excess.dy,
        ))
    }

    /// Part of the image visible through the slot, in image-normalized
    /// coordinates (`0..1` on both axes).
    pub fn visible_region(&self, slot: Size, image: Size) -> Option<Rect> {
        let adjustment = self.sanitized();
        let scaled = base_image_size(slot, image)?.scaled(adjustment.scale);
        let offset = adjustment.image_offset(slot, image)?;

        // Slot origin expressed in the scaled image's pixel space.
        let left = scaled.width / 2.0 - slot.width / 2.0 - offset.dx;
        let top = scaled.height / 2.0 - slot.height / 2.0 - offset.dy;
        Some(Rect::new(
            left / scaled.width,
            top / scaled.height,
            slot.width / scaled.width,
            slot.height / scaled.height,
        ))
    }
}

impl SlotCropAdjustment {
    /// Geometry only needs a covering scale and bounded fractions; the
    /// upper scale limit is policy and was applied when the value was stored.
    fn sanitized(&self) -> Self {
        self.normalized_within(ScaleBounds::new(1.0, f32::MAX))
    }
}

impl Default for SlotCropAdjustment {
    fn default() -> Self {
        Self::identity()
    }
}

fn clamp_fraction(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

/// Size at which the image exactly covers the slot at scale 1.
///
/// An image wider than the slot (by aspect) is fitted to the slot height,
/// otherwise to the slot width. Returns `None` for degenerate sizes.
pub fn base_image_size(slot: Size, image: Size) -> Option<Size> {
    let slot_aspect = slot.aspect_ratio()?;
    let image_aspect = image.aspect_ratio()?;
    if image_aspect > slot_aspect {
        Some(Size::new(slot.height * image_aspect, slot.height))
    } else {
        Some(Size::new(slot.width, slot.width / image_aspect))
    }
}

/// Half of `scaled image - slot` on each axis, never negative.
fn half_excess(slot: Size, image: Size, scale: f32) -> Option<Vector> {
    let scaled = base_image_size(slot, image)?.scaled(scale);
    Some(Vector::new(
        ((scaled.width - slot.width) / 2.0).max(0.0),
        ((scaled.height - slot.height) / 2.0).max(0.0),
    ))
}

fn fraction_of(offset: f32, half_excess: f32) -> f32 {
    if half_excess <= f32::EPSILON {
        0.0
    } else {
        clamp_fraction(offset / half_excess)
    }
}

/// Slot and image geometry used to map gestures onto an adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CropGeometry {
    slot: Size,
    image: Size,
    bounds: ScaleBounds,
}

impl ManipulationTarget for CropGeometry {
    type Value = SlotCropAdjustment;

    fn apply(&self, start: SlotCropAdjustment, m: &Manipulation) -> SlotCropAdjustment {
        let start = start.normalized_within(self.bounds);
        let Some(start_offset) = start.image_offset(self.slot, self.image) else {
            return start;
        };

        let scale = self.bounds.clamp(start.scale * m.scale_factor).max(1.0);
        // Zoom about the slot center, then pan.
        let zoom = scale / start.scale;
        let offset = start_offset * zoom + m.translation;

        let Some(half) = half_excess(self.slot, self.image, scale) else {
            return start;
        };
        SlotCropAdjustment::new(
            scale,
            fraction_of(offset.dx, half.dx),
            fraction_of(offset.dy, half.dy),
        )
        .normalized_within(self.bounds)
    }

    fn finalize(&self, value: SlotCropAdjustment) -> SlotCropAdjustment {
        value.normalized_within(self.bounds)
    }
}

/// Gesture handling for one image slot. Lives on the gesture thread.
#[derive(Debug)]
pub struct SlotCropManipulator {
    id: ElementId,
    geometry: CropGeometry,
    composer: GestureComposer,
    session: GestureSession<SlotCropAdjustment>,
    committed: SlotCropAdjustment,
    live: SlotCropAdjustment,
    /// Number of commits made so far
    revision: u64,
    bridge: BridgeHandle,
}

impl SlotCropManipulator {
    pub fn new(
        id: ElementId,
        slot: Size,
        image: Size,
        initial: SlotCropAdjustment,
        bounds: ScaleBounds,
        thresholds: GestureThresholds,
        bridge: BridgeHandle,
    ) -> Self {
        let initial = initial.normalized_within(bounds);
        Self {
            id,
            geometry: CropGeometry {
                slot,
                image,
                bounds,
            },
            composer: GestureComposer::new(thresholds),
            session: GestureSession::new(),
            committed: initial,
            live: initial,
            revision: 0,
            bridge,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Value to draw right now, including uncommitted gesture deltas.
    pub fn live_adjustment(&self) -> SlotCropAdjustment {
        self.live
    }

    pub fn committed_adjustment(&self) -> SlotCropAdjustment {
        self.committed
    }

    pub fn is_manipulating(&self) -> bool {
        self.session.is_active()
    }

    /// Revision of the latest local commit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Slot or image dimensions changed. Stored fractions stay valid, and
    /// the base image size follows on the next frame.
    pub fn set_geometry(&mut self, slot: Size, image: Size) {
        self.geometry.slot = slot;
        self.geometry.image = image;
    }

    /// One-way sync from the application's authoritative value.
    ///
    /// `revision` is the latest local commit the model had applied. An echo
    /// older than our own latest commit is dropped; returns whether the value
    /// was taken.
    pub fn sync_from_model(&mut self, adjustment: SlotCropAdjustment, revision: u64) -> bool {
        if revision < self.revision {
            log::debug!(
                "slot {} ignoring stale sync (revision {} < {})",
                self.id,
                revision,
                self.revision
            );
            return false;
        }
        let adjustment = adjustment.normalized_within(self.geometry.bounds);
        self.committed = adjustment;
        if self.session.is_active() {
            self.session.rebase(adjustment);
        } else {
            self.live = adjustment;
        }
        true
    }

    /// Feed one touch event.
    pub fn handle_touch(
        &mut self,
        event: TouchEvent,
    ) -> Option<SessionOutcome<SlotCropAdjustment>> {
        let gesture = self.composer.handle(event)?;
        let outcome = self
            .session
            .drive(&self.geometry, gesture, self.committed, &mut self.live);

        match outcome {
            SessionOutcome::Commit(adjustment) => {
                log::debug!("slot {} crop committed: {:?}", self.id, adjustment);
                self.committed = adjustment;
                self.revision += 1;
                self.bridge.commit_adjustment(self.id, adjustment, self.revision);
            }
            SessionOutcome::Tap(_) => {
                self.bridge.select(self.id);
            }
            SessionOutcome::Reverted(_) => {
                log::debug!("slot {} gesture cancelled", self.id);
            }
            SessionOutcome::Frame(_) | SessionOutcome::Idle => {}
        }
        Some(outcome)
    }
}
