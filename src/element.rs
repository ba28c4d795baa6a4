//! Element identity and per-kind constraints.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{DATE_SCALE_RANGE, LOGO_SCALE_RANGE, PHOTO_SCALE_RANGE, TEXT_SCALE_RANGE};

/// Identifier of one element on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an element is. Drives its scale range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Logo,
    Text,
    Date,
    Photo,
}

impl ElementKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Logo => "Logo",
            ElementKind::Text => "Text",
            ElementKind::Date => "Date",
            ElementKind::Photo => "Photo",
        }
    }

    /// Built-in scale range for this kind.
    pub fn default_bounds(&self) -> ScaleBounds {
        let (min, max) = match self {
            ElementKind::Logo => LOGO_SCALE_RANGE,
            ElementKind::Text => TEXT_SCALE_RANGE,
            ElementKind::Date => DATE_SCALE_RANGE,
            ElementKind::Photo => PHOTO_SCALE_RANGE,
        };
        ScaleBounds::new(min, max)
    }
}

/// Inclusive scale range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f32,
    pub max: f32,
}

impl ScaleBounds {
    /// Create bounds; a reversed pair is swapped.
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn clamp(&self, scale: f32) -> f32 {
        crate::policy::clamp_scale(scale, self.min, self.max)
    }

    pub fn contains(&self, scale: f32) -> bool {
        scale >= self.min && scale <= self.max
    }
}

/// Scale range for every element kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindBounds {
    #[serde(default = "default_logo_bounds")]
    pub logo: ScaleBounds,
    #[serde(default = "default_text_bounds")]
    pub text: ScaleBounds,
    #[serde(default = "default_date_bounds")]
    pub date: ScaleBounds,
    #[serde(default = "default_photo_bounds")]
    pub photo: ScaleBounds,
}

fn default_logo_bounds() -> ScaleBounds {
    ElementKind::Logo.default_bounds()
}

fn default_text_bounds() -> ScaleBounds {
    ElementKind::Text.default_bounds()
}

fn default_date_bounds() -> ScaleBounds {
    ElementKind::Date.default_bounds()
}

fn default_photo_bounds() -> ScaleBounds {
    ElementKind::Photo.default_bounds()
}

impl KindBounds {
    pub fn for_kind(&self, kind: ElementKind) -> ScaleBounds {
        match kind {
            ElementKind::Logo => self.logo,
            ElementKind::Text => self.text,
            ElementKind::Date => self.date,
            ElementKind::Photo => self.photo,
        }
    }
}

impl Default for KindBounds {
    fn default() -> Self {
        Self {
            logo: default_logo_bounds(),
            text: default_text_bounds(),
            date: default_date_bounds(),
            photo: default_photo_bounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_range_wider_than_text() {
        let logo = ElementKind::Logo.default_bounds();
        let text = ElementKind::Text.default_bounds();
        assert!(logo.min < text.min);
        assert!(logo.max > text.max);
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let b = ScaleBounds::new(3.0, 0.5);
        assert_eq!(b, ScaleBounds::new(0.5, 3.0));
        assert!(b.contains(1.0));
        assert_eq!(b.clamp(10.0), 3.0);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ElementKind::Logo).unwrap();
        assert_eq!(json, "\"logo\"");
    }

    #[test]
    fn test_kind_bounds_partial_json_uses_defaults() {
        let json = r#"{"logo": {"min": 0.1, "max": 8.0}}"#;
        let bounds: KindBounds = serde_json::from_str(json).unwrap();
        assert_eq!(bounds.for_kind(ElementKind::Logo), ScaleBounds::new(0.1, 8.0));
        assert_eq!(bounds.for_kind(ElementKind::Photo), ElementKind::Photo.default_bounds());
    }
}
