//! Default gesture thresholds.
//!
//! All distances are logical pixels. They can be overridden per recognizer
//! through [`GestureThresholds`](crate::GestureThresholds).

use std::time::Duration;

/// Minimum centroid travel before a pan activates. A stationary tap must never
/// be read as a pan.
pub const PAN_MIN_DISTANCE: f32 = 5.0;

/// Minimum change of the two-finger span before a pinch activates.
pub const PINCH_MIN_SPAN_DELTA: f32 = 5.0;

/// Minimum accumulated twist before a rotation activates (about 3 degrees).
pub const ROTATION_MIN_RADIANS: f32 = 0.05;

/// Longest press still recognized as a tap.
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(250);

/// Furthest a finger may wander and still produce a tap.
pub const TAP_MAX_DISTANCE: f32 = 10.0;

/// Spans shorter than this are too noisy to derive a scale factor from.
pub const MIN_PINCH_SPAN: f32 = 1.0;
