//! Normalized transform model for freely placed elements.
//!
//! Positions are stored as fractions of the canvas size so the same value
//! lands on the same relative spot whatever size the canvas is rendered at.
//! Pixel positions are derived at read time from the current canvas size.

use serde::{Deserialize, Serialize};
use slotframe_gesture::{Point, Size};

use crate::constants::DEFAULT_POSITION;

/// State of one freely placed element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Horizontal center as a fraction of canvas width
    pub x: f32,
    /// Vertical center as a fraction of canvas height
    pub y: f32,
    /// Unitless size multiplier
    pub scale: f32,
    /// Rotation in degrees, unbounded
    pub rotation: f32,
}

impl Transform {
    /// Create a new transform.
    pub fn new(x: f32, y: f32, scale: f32, rotation: f32) -> Self {
        Self {
            x,
            y,
            scale,
            rotation,
        }
    }

    /// Centered, unscaled, unrotated.
    pub fn centered() -> Self {
        Self::new(DEFAULT_POSITION.0, DEFAULT_POSITION.1, 1.0, 0.0)
    }

    /// Pixel position of the element center on a canvas of the given size.
    ///
    /// Returns `None` for a degenerate canvas instead of producing NaN.
    pub fn to_absolute(&self, canvas: Size) -> Option<Point> {
        if canvas.is_degenerate() {
            return None;
        }
        Some(Point::new(self.x * canvas.width, self.y * canvas.height))
    }

    /// Normalized `(x, y)` for a pixel position on a canvas of the given size.
    ///
    /// Returns `None` for a degenerate canvas or a non-finite point.
    pub fn from_absolute(point: Point, canvas: Size) -> Option<(f32, f32)> {
        if canvas.is_degenerate() || !point.is_finite() {
            return None;
        }
        Some((point.x / canvas.width, point.y / canvas.height))
    }

    /// Same transform at a new normalized position.
    pub fn with_position(&self, x: f32, y: f32) -> Self {
        Self { x, y, ..*self }
    }

    pub fn with_scale(&self, scale: f32) -> Self {
        Self { scale, ..*self }
    }

    pub fn with_rotation(&self, rotation: f32) -> Self {
        Self { rotation, ..*self }
    }

    /// Overlay the fields present in `patch`.
    pub fn merge(&self, patch: &TransformPatch) -> Self {
        Self {
            x: patch.x.unwrap_or(self.x),
            y: patch.y.unwrap_or(self.y),
            scale: patch.scale.unwrap_or(self.scale),
            rotation: patch.rotation.unwrap_or(self.rotation),
        }
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f32 {
        normalize_degrees(self.rotation)
    }

    /// Keep the center on the canvas.
    pub fn clamp_position(&self) -> Self {
        self.with_position(self.x.clamp(0.0, 1.0), self.y.clamp(0.0, 1.0))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::centered()
    }
}

/// Fold an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// A partial transform; `None` fields are left untouched by [`Transform::merge`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
}

impl TransformPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn scale(scale: f32) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f32) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.scale.is_none() && self.rotation.is_none()
    }
}
