//! Primitive gesture recognizers.
//!
//! Each recognizer consumes the raw touch stream (after the event has been
//! folded into the [`TouchSet`]) and reports its own phase transitions.
//! Composition rules live in [`crate::composer`].

mod pan;
mod pinch;
mod rotation;
mod tap;

pub use pan::PanRecognizer;
pub use pinch::{PinchRecognizer, PinchValue};
pub use rotation::RotationRecognizer;
pub use tap::{TapRecognizer, TapValue};

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    PAN_MIN_DISTANCE, PINCH_MIN_SPAN_DELTA, ROTATION_MIN_RADIANS, TAP_MAX_DISTANCE,
    TAP_MAX_DURATION,
};
use crate::{TouchEvent, TouchSet};

/// Lifecycle of a single recognizer within one interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognizerState {
    /// Watching touches, not yet activated
    #[default]
    Possible,
    /// Crossed its activation threshold on the last event
    Began,
    /// Active and reporting updates
    Changed,
    /// Finished normally
    Ended,
    /// Interrupted after activating
    Cancelled,
    /// Gave up without activating
    Failed,
}

impl RecognizerState {
    pub fn is_active(&self) -> bool {
        matches!(self, RecognizerState::Began | RecognizerState::Changed)
    }

    /// Finished for the rest of the interaction.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RecognizerState::Ended | RecognizerState::Cancelled | RecognizerState::Failed
        )
    }
}

/// A phase transition reported by a recognizer, carrying its value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate<V> {
    Began(V),
    Changed(V),
    Ended(V),
    Cancelled,
}

impl<V: Copy> GestureUpdate<V> {
    pub fn value(&self) -> Option<V> {
        match self {
            GestureUpdate::Began(v) | GestureUpdate::Changed(v) | GestureUpdate::Ended(v) => {
                Some(*v)
            }
            GestureUpdate::Cancelled => None,
        }
    }
}

/// Common interface of every recognizer in the graph.
pub trait Recognizer {
    type Value: Copy;

    /// Handle one touch event. `touches` already reflects the event.
    fn handle(&mut self, event: &TouchEvent, touches: &TouchSet)
        -> Option<GestureUpdate<Self::Value>>;

    fn state(&self) -> RecognizerState;

    /// Give up for the rest of the interaction. Returns `Cancelled` if the
    /// recognizer had already activated.
    fn fail(&mut self) -> Option<GestureUpdate<Self::Value>>;

    /// Return to `Possible` for the next interaction.
    fn reset(&mut self);

    fn is_active(&self) -> bool {
        self.state().is_active()
    }
}

/// Tunable activation thresholds for the primitive recognizers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThresholds {
    /// Centroid travel (px) before pan activates
    #[serde(default = "default_pan_min_distance")]
    pub pan_min_distance: f32,

    /// Span change (px) before pinch activates
    #[serde(default = "default_pinch_min_span_delta")]
    pub pinch_min_span_delta: f32,

    /// Accumulated twist (radians) before rotation activates
    #[serde(default = "default_rotation_min_radians")]
    pub rotation_min_radians: f32,

    /// Longest press (ms) still counted as a tap
    #[serde(default = "default_tap_max_duration_ms")]
    pub tap_max_duration_ms: u64,

    /// Furthest travel (px) still counted as a tap
    #[serde(default = "default_tap_max_distance")]
    pub tap_max_distance: f32,
}

fn default_pan_min_distance() -> f32 {
    PAN_MIN_DISTANCE
}

fn default_pinch_min_span_delta() -> f32 {
    PINCH_MIN_SPAN_DELTA
}

fn default_rotation_min_radians() -> f32 {
    ROTATION_MIN_RADIANS
}

fn default_tap_max_duration_ms() -> u64 {
    TAP_MAX_DURATION.as_millis() as u64
}

fn default_tap_max_distance() -> f32 {
    TAP_MAX_DISTANCE
}

impl GestureThresholds {
    pub fn tap_max_duration(&self) -> Duration {
        Duration::from_millis(self.tap_max_duration_ms)
    }
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pan_min_distance: default_pan_min_distance(),
            pinch_min_span_delta: default_pinch_min_span_delta(),
            rotation_min_radians: default_rotation_min_radians(),
            tap_max_duration_ms: default_tap_max_duration_ms(),
            tap_max_distance: default_tap_max_distance(),
        }
    }
}
