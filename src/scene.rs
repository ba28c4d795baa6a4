//! Application-thread owner of the authoritative element values.
//!
//! Every write goes through here and is clamped on the way in. Writes for
//! ids that no longer exist are dropped: a commit can race with a delete.

use std::collections::BTreeMap;

use crate::constants::DUPLICATE_OFFSET;
use crate::element::{ElementId, ElementKind, KindBounds};
use crate::slot_crop::SlotCropAdjustment;
use crate::transform::{Transform, TransformPatch};

/// Authoritative value of one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementValue {
    /// Freely placed on the canvas
    Free(Transform),
    /// Image inside a fixed template slot
    Slot(SlotCropAdjustment),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneElement {
    pub kind: ElementKind,
    pub value: ElementValue,
    /// Latest gesture-thread commit applied to this element
    pub revision: u64,
}

#[derive(Debug, Clone)]
pub struct Scene {
    elements: BTreeMap<ElementId, SceneElement>,
    selected: Option<ElementId>,
    bounds: KindBounds,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_bounds(KindBounds::default())
    }

    pub fn with_bounds(bounds: KindBounds) -> Self {
        Self {
            elements: BTreeMap::new(),
            selected: None,
            bounds,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    fn clamp_transform(&self, kind: ElementKind, transform: Transform) -> Transform {
        transform
            .clamp_position()
            .with_scale(self.bounds.for_kind(kind).clamp(transform.scale))
    }

    /// Add a freely placed element. The initial value is clamped.
    pub fn add_overlay(&mut self, kind: ElementKind, transform: Transform) -> ElementId {
        let id = self.allocate_id();
        let transform = if transform.is_finite() {
            self.clamp_transform(kind, transform)
        } else {
            Transform::default()
        };
        self.elements.insert(
            id,
            SceneElement {
                kind,
                value: ElementValue::Free(transform),
                revision: 0,
            },
        );
        log::debug!("added {} {}", kind.name(), id);
        id
    }

    /// Add an image slot. The adjustment is clamped to the photo bounds.
    pub fn add_slot(&mut self, adjustment: SlotCropAdjustment) -> ElementId {
        let id = self.allocate_id();
        self.elements.insert(
            id,
            SceneElement {
                kind: ElementKind::Photo,
                value: ElementValue::Slot(adjustment.normalized_within(self.bounds.photo)),
                revision: 0,
            },
        );
        log::debug!("added slot {}", id);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&SceneElement> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    pub fn bounds(&self) -> &KindBounds {
        &self.bounds
    }

    /// Latest gesture commit applied to `id`.
    pub fn revision(&self, id: ElementId) -> Option<u64> {
        Some(self.elements.get(&id)?.revision)
    }

    /// Record that gesture commit `revision` of `id` has been applied.
    pub fn acknowledge(&mut self, id: ElementId, revision: u64) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.revision = revision;
        }
    }

    pub fn transform(&self, id: ElementId) -> Option<Transform> {
        match self.elements.get(&id)?.value {
            ElementValue::Free(transform) => Some(transform),
            ElementValue::Slot(_) => None,
        }
    }

    pub fn adjustment(&self, id: ElementId) -> Option<SlotCropAdjustment> {
        match self.elements.get(&id)?.value {
            ElementValue::Slot(adjustment) => Some(adjustment),
            ElementValue::Free(_) => None,
        }
    }

    /// Replace a transform. Returns the stored (clamped) value, or `None`
    /// if the id is unknown or not a free element.
    pub fn apply_transform(&mut self, id: ElementId, transform: Transform) -> Option<Transform> {
        if !transform.is_finite() {
            log::warn!("ignoring non-finite transform for {}: {:?}", id, transform);
            return None;
        }
        let Some(element) = self.elements.get(&id).copied() else {
            log::debug!("stale transform commit for {}", id);
            return None;
        };
        if !matches!(element.value, ElementValue::Free(_)) {
            log::debug!("transform commit for slot {} ignored", id);
            return None;
        }
        let clamped = self.clamp_transform(element.kind, transform);
        self.elements.insert(
            id,
            SceneElement {
                value: ElementValue::Free(clamped),
                ..element
            },
        );
        Some(clamped)
    }

    /// Merge a partial transform into the current one.
    pub fn apply_patch(&mut self, id: ElementId, patch: &TransformPatch) -> Option<Transform> {
        let Some(current) = self.transform(id) else {
            log::debug!("stale transform set for {}", id);
            return None;
        };
        self.apply_transform(id, current.merge(patch))
    }

    /// Replace a slot adjustment. Returns the stored (normalized) value.
    pub fn apply_adjustment(
        &mut self,
        id: ElementId,
        adjustment: SlotCropAdjustment,
    ) -> Option<SlotCropAdjustment> {
        let bounds = self.bounds.photo;
        let Some(element) = self.elements.get_mut(&id) else {
            log::debug!("stale crop commit for {}", id);
            return None;
        };
        let ElementValue::Slot(stored) = &mut element.value else {
            log::debug!("crop commit for free element {} ignored", id);
            return None;
        };
        *stored = adjustment.normalized_within(bounds);
        Some(*stored)
    }

    /// Remove an element. Clears the selection if it pointed there.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if self.elements.remove(&id).is_none() {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("removed {}", id);
        true
    }

    /// Copy a free element, slightly offset. Slots are fixed by the template
    /// and cannot be duplicated.
    pub fn duplicate(&mut self, id: ElementId) -> Option<ElementId> {
        let element = *self.elements.get(&id)?;
        let ElementValue::Free(transform) = element.value else {
            log::debug!("slot {} cannot be duplicated", id);
            return None;
        };
        let shifted = transform.with_position(
            transform.x + DUPLICATE_OFFSET,
            transform.y + DUPLICATE_OFFSET,
        );
        Some(self.add_overlay(element.kind, shifted))
    }

    /// Select an element. Returns `false` for an unknown id.
    pub fn select(&mut self, id: ElementId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Clear the selection. Returns `false` if nothing was selected.
    pub fn deselect(&mut self) -> bool {
        self.selected.take().is_some()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ScaleBounds;

    #[test]
    fn test_initial_values_are_clamped() {
        let mut scene = Scene::new();
        let id = scene.add_overlay(ElementKind::Logo, Transform::new(2.0, 0.5, 100.0, 45.0));
        assert_eq!(scene.transform(id), Some(Transform::new(1.0, 0.5, 5.0, 45.0)));

        let bad = scene.add_overlay(ElementKind::Text, Transform::new(f32::NAN, 0.5, 1.0, 0.0));
        assert_eq!(scene.transform(bad), Some(Transform::default()));
    }

    #[test]
    fn test_custom_bounds() {
        let bounds = KindBounds {
            text: ScaleBounds::new(1.0, 1.5),
            ..KindBounds::default()
        };
        let mut scene = Scene::with_bounds(bounds);
        let id = scene.add_overlay(ElementKind::Text, Transform::default());
        let stored = scene.apply_transform(id, Transform::default().with_scale(4.0));
        assert_eq!(stored.map(|t| t.scale), Some(1.5));
    }

    #[test]
    fn test_non_finite_commit_is_ignored() {
        let mut scene = Scene::new();
        let id = scene.add_overlay(ElementKind::Logo, Transform::default());
        assert_eq!(scene.apply_transform(id, Transform::new(0.5, f32::INFINITY, 1.0, 0.0)), None);
        assert_eq!(scene.transform(id), Some(Transform::default()));
    }

    #[test]
    fn test_value_kinds_do_not_cross() {
        let mut scene = Scene::new();
        let slot = scene.add_slot(SlotCropAdjustment::new(2.0, 0.5, 0.0));
        let free = scene.add_overlay(ElementKind::Date, Transform::default());

        assert_eq!(scene.transform(slot), None);
        assert_eq!(scene.adjustment(free), None);
        assert_eq!(scene.apply_transform(slot, Transform::default()), None);
        assert_eq!(scene.apply_adjustment(free, SlotCropAdjustment::identity()), None);
        assert_eq!(scene.duplicate(slot), None);
    }

    #[test]
    fn test_adjustment_normalized_on_write() {
        let mut scene = Scene::new();
        let slot = scene.add_slot(SlotCropAdjustment::identity());
        let stored = scene.apply_adjustment(slot, SlotCropAdjustment::new(1.0, 0.7, -0.3));
        assert_eq!(stored, Some(SlotCropAdjustment::identity()));
        let stored = scene.apply_adjustment(slot, SlotCropAdjustment::new(6.0, 1.5, -0.3));
        assert_eq!(stored, Some(SlotCropAdjustment::new(4.0, 1.0, -0.3)));
    }

    #[test]
    fn test_slot_uses_configured_photo_bounds() {
        let bounds = KindBounds {
            photo: ScaleBounds::new(1.0, 8.0),
            ..KindBounds::default()
        };
        let mut scene = Scene::with_bounds(bounds);
        let slot = scene.add_slot(SlotCropAdjustment::new(10.0, 0.0, 0.0));
        assert_eq!(scene.adjustment(slot).map(|a| a.scale), Some(8.0));
        let stored = scene.apply_adjustment(slot, SlotCropAdjustment::new(6.0, 0.2, 0.0));
        assert_eq!(stored, Some(SlotCropAdjustment::new(6.0, 0.2, 0.0)));
    }

    #[test]
    fn test_revision_survives_value_writes() {
        let mut scene = Scene::new();
        let id = scene.add_overlay(ElementKind::Logo, Transform::default());
        assert_eq!(scene.revision(id), Some(0));
        scene.apply_transform(id, Transform::new(0.3, 0.3, 1.0, 0.0));
        scene.acknowledge(id, 4);
        scene.apply_patch(id, &TransformPatch::scale(2.0));
        assert_eq!(scene.revision(id), Some(4));
        assert_eq!(scene.revision(ElementId(99)), None);

        let copy = scene.duplicate(id).unwrap();
        assert_eq!(scene.revision(copy), Some(0));
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut scene = Scene::new();
        let id = scene.add_overlay(ElementKind::Logo, Transform::default());
        assert!(scene.select(id));
        assert_eq!(scene.selected(), Some(id));
        assert!(scene.remove(id));
        assert_eq!(scene.selected(), None);
        assert!(!scene.remove(id));
        assert!(!scene.select(id));
        assert!(!scene.deselect());
    }

    #[test]
    fn test_duplicate_offsets_copy() {
        let mut scene = Scene::new();
        let id = scene.add_overlay(ElementKind::Logo, Transform::new(0.98, 0.5, 2.0, 30.0));
        let copy = scene.duplicate(id).unwrap();
        assert_ne!(copy, id);
        let t = scene.transform(copy).unwrap();
        assert_eq!(t.x, 1.0);
        assert!((t.y - 0.55).abs() < 1e-6);
        assert_eq!((t.scale, t.rotation), (2.0, 30.0));
        assert_eq!(scene.ids().collect::<Vec<_>>(), vec![id, copy]);
    }
}
