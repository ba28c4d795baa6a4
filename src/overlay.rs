//! Manipulator for a freely placed element (logo, text, date).
//!
//! One parameterized implementation serves every element kind; the kind only
//! selects the scale bounds. Gesture frames update the live transform on the
//! gesture thread. Only gesture end clamps, snaps and commits through the
//! bridge.

use slotframe_gesture::{
    GestureComposer, GestureThresholds, Manipulation, Point, Rect, Size, TouchEvent,
};

use crate::bridge::BridgeHandle;
use crate::constants::{DEFAULT_OVERSCROLL_MARGIN, DEFAULT_SNAP_TARGETS, DEFAULT_SNAP_TOLERANCE};
use crate::element::{ElementId, ElementKind, ScaleBounds};
use crate::policy::{clamp_translation, rotated_half_extents, snap_rotation};
use crate::session::{GestureSession, ManipulationTarget, SessionOutcome};
use crate::transform::Transform;

/// Clamp and snap settings for an overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPolicy {
    pub bounds: ScaleBounds,
    /// How far the element may be dragged past the canvas edge mid-gesture
    pub overscroll_margin: f32,
    pub snap_targets: Vec<f32>,
    pub snap_tolerance: f32,
}

impl OverlayPolicy {
    pub fn for_kind(kind: ElementKind) -> Self {
        Self {
            bounds: kind.default_bounds(),
            overscroll_margin: DEFAULT_OVERSCROLL_MARGIN,
            snap_targets: DEFAULT_SNAP_TARGETS.to_vec(),
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
        }
    }
}

/// Everything needed to turn a manipulation into a transform.
#[derive(Debug, Clone)]
struct OverlayGeometry {
    canvas: Size,
    /// Unscaled pixel size of the element
    base_size: Size,
    policy: OverlayPolicy,
}

impl OverlayGeometry {
    /// Clamp the element center with the given margin. Returns `start`
    /// unchanged on a degenerate canvas.
    fn place(
        &self,
        start: Transform,
        center: Point,
        scale: f32,
        rotation: f32,
        margin: f32,
    ) -> Transform {
        let half = rotated_half_extents(self.base_size.half(), rotation);
        let clamped = clamp_translation(center, scale, half, Rect::from_size(self.canvas), margin);
        match Transform::from_absolute(clamped, self.canvas) {
            Some((x, y)) => Transform::new(x, y, scale, rotation),
            None => start,
        }
    }
}

impl ManipulationTarget for OverlayGeometry {
    type Value = Transform;

    fn apply(&self, start: Transform, m: &Manipulation) -> Transform {
        let Some(center) = start.to_absolute(self.canvas) else {
            return start;
        };
        let scale = self.policy.bounds.clamp(start.scale * m.scale_factor);
        let rotation = start.rotation + m.rotation.to_degrees();
        self.place(
            start,
            center + m.translation,
            scale,
            rotation,
            self.policy.overscroll_margin,
        )
    }

    fn finalize(&self, value: Transform) -> Transform {
        let rotation = snap_rotation(
            value.rotation,
            &self.policy.snap_targets,
            self.policy.snap_tolerance,
        );
        let scale = self.policy.bounds.clamp(value.scale);
        let Some(center) = value.to_absolute(self.canvas) else {
            return value.with_scale(scale).with_rotation(rotation);
        };
        // Spring back inside the canvas.
        self.place(value, center, scale, rotation, 0.0).clamp_position()
    }
}

/// Gesture handling for one freely placed element. Lives on the gesture
/// thread and never writes the model directly.
#[derive(Debug)]
pub struct OverlayManipulator {
    id: ElementId,
    kind: ElementKind,
    geometry: OverlayGeometry,
    composer: GestureComposer,
    session: GestureSession<Transform>,
    committed: Transform,
    live: Transform,
    /// Number of commits made so far
    revision: u64,
    bridge: BridgeHandle,
}

impl OverlayManipulator {
    #[expect(clippy::too_many_arguments)]
    pub fn new(
        id: ElementId,
        kind: ElementKind,
        base_size: Size,
        canvas: Size,
        initial: Transform,
        policy: OverlayPolicy,
        thresholds: GestureThresholds,
        bridge: BridgeHandle,
    ) -> Self {
        Self {
            id,
            kind,
            geometry: OverlayGeometry {
                canvas,
                base_size,
                policy,
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

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Transform to draw right now, including uncommitted gesture deltas.
    pub fn live_transform(&self) -> Transform {
        self.live
    }

    pub fn committed_transform(&self) -> Transform {
        self.committed
    }

    pub fn is_manipulating(&self) -> bool {
        self.session.is_active()
    }

    /// Revision of the latest local commit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Pixel center of the live transform.
    pub fn live_center(&self) -> Option<Point> {
        self.live.to_absolute(self.geometry.canvas)
    }

    /// The canvas was resized. The normalized model is untouched; only the
    /// pixel space deltas are measured in changes.
    pub fn set_canvas_size(&mut self, canvas: Size) {
        if canvas.is_degenerate() {
            log::debug!("{} ignoring degenerate canvas {:?}", self.id, canvas);
            return;
        }
        self.geometry.canvas = canvas;
    }

    /// The element's content changed size (new text, new logo).
    pub fn set_base_size(&mut self, base_size: Size) {
        self.geometry.base_size = base_size;
    }

    /// One-way sync from the authoritative model. Never commits.
    ///
    /// `revision` is the latest local commit the model had applied when it
    /// produced `transform`. Anything older than our own latest commit would
    /// rewind the baseline and is dropped. During an active gesture the start
    /// snapshot is rebased, so the rest of the gesture applies its deltas to
    /// the new value. Returns whether the value was taken.
    pub fn sync_from_model(&mut self, transform: Transform, revision: u64) -> bool {
        if revision < self.revision {
            log::debug!(
                "{} ignoring stale sync (revision {} < {})",
                self.id,
                revision,
                self.revision
            );
            return false;
        }
        self.committed = transform;
        if self.session.is_active() {
            self.session.rebase(transform);
        } else {
            self.live = transform;
        }
        true
    }

    /// Feed one touch event.
    pub fn handle_touch(&mut self, event: TouchEvent) -> Option<SessionOutcome<Transform>> {
        let gesture = self.composer.handle(event)?;
        let outcome = self
            .session
            .drive(&self.geometry, gesture, self.committed, &mut self.live);

        match outcome {
            SessionOutcome::Commit(transform) => {
                log::debug!("{} {} committed: {:?}", self.kind.name(), self.id, transform);
                self.committed = transform;
                self.revision += 1;
                self.bridge.commit_transform(self.id, transform, self.revision);
            }
            SessionOutcome::Tap(_) => {
                self.bridge.select(self.id);
            }
            SessionOutcome::Reverted(transform) => {
                log::debug!("{} gesture cancelled, back to {:?}", self.id, transform);
            }
            SessionOutcome::Frame(_) | SessionOutcome::Idle => {}
        }
        Some(outcome)
    }

    pub fn request_delete(&self) -> bool {
        self.bridge.request_delete(self.id)
    }

    pub fn request_duplicate(&self) -> bool {
        self.bridge.request_duplicate(self.id)
    }
}
