//! slotframe - touch manipulation engine for template photo editors
//!
//! Positions logos, text, dates and slot-cropped photos with pan, pinch,
//! rotation and tap gestures. Gesture recognition runs on a real-time thread;
//! values are committed to the application thread only when a gesture ends.

pub mod bridge;
pub mod config;
pub mod constants;
pub mod element;
pub mod overlay;
pub mod policy;
pub mod runtime;
pub mod scale_slider;
pub mod scene;
pub mod session;
pub mod slot_crop;
pub mod transform;

pub use slotframe_gesture as gesture;

pub use bridge::{AppBridge, BridgeHandle, BridgeMessage, ModelSync};
pub use config::{ConfigError, EngineConfig, LogLevel};
pub use element::{ElementId, ElementKind, KindBounds, ScaleBounds};
pub use overlay::{OverlayManipulator, OverlayPolicy};
pub use runtime::{GestureInput, GestureRuntime, LiveValue, LiveView, RuntimeError};
pub use scale_slider::{ScaleSlider, ScaleSliderState, SliderOutput, ThumbAnimation};
pub use scene::{ElementValue, Scene, SceneElement};
pub use session::{GestureSession, ManipulationTarget, SessionOutcome, SessionPhase};
pub use slot_crop::{SlotCropAdjustment, SlotCropManipulator, base_image_size};
pub use transform::{Transform, TransformPatch};
