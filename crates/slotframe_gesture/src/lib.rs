//! slotframe_gesture - touch gesture recognition for slotframe
//!
//! This crate turns a raw touch stream into high-level manipulation and tap
//! events. It knows nothing about transforms or canvases; the `slotframe`
//! crate maps its output onto element state.

mod callback;
pub mod composer;
pub mod constants;
mod event;
mod geometry;
pub mod recognizers;
mod touches;

pub use callback::{LatestCallback, LatestCallback0};
pub use composer::{
    Exclusive, GestureComposer, GestureEvent, Manipulation, Prioritized, Simultaneous,
};
pub use event::{TouchEvent, TouchId};
pub use geometry::{Point, Rect, Size, Vector};
pub use recognizers::{GestureThresholds, GestureUpdate, Recognizer, RecognizerState, TapValue};
pub use touches::{TouchPoint, TouchSet};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::composer::{GestureComposer, GestureEvent, Manipulation};
    pub use crate::event::{TouchEvent, TouchId};
    pub use crate::geometry::{Point, Rect, Size, Vector};
    pub use crate::recognizers::{GestureThresholds, GestureUpdate};
    pub use crate::LatestCallback;
}
