//! Global constants for the slotframe engine

/// Default normalized position (canvas center)
pub const DEFAULT_POSITION: (f32, f32) = (0.5, 0.5);

/// Overscroll allowed past the canvas edge while dragging, in pixels.
/// The committed position springs back inside the canvas.
pub const DEFAULT_OVERSCROLL_MARGIN: f32 = 50.0;

/// Angles (degrees) a committed rotation snaps to
pub const DEFAULT_SNAP_TARGETS: [f32; 4] = [0.0, 90.0, 180.0, 270.0];

/// How close (degrees) a rotation must be to a target to snap
pub const DEFAULT_SNAP_TOLERANCE: f32 = 5.0;

/// Scale range for logos: small watermark up to hero placement
pub const LOGO_SCALE_RANGE: (f32, f32) = (0.2, 5.0);

/// Scale range for text, kept narrow for legibility
pub const TEXT_SCALE_RANGE: (f32, f32) = (0.5, 3.0);

/// Scale range for date stamps
pub const DATE_SCALE_RANGE: (f32, f32) = (0.5, 3.0);

/// Crop zoom range for photos inside a slot
pub const PHOTO_SCALE_RANGE: (f32, f32) = (1.0, 4.0);

/// Scale-slider thumb diameter; the usable track is the track minus this
pub const SLIDER_THUMB_SIZE: f32 = 24.0;

/// Duration of the tap-to-jump thumb animation
pub const SLIDER_JUMP_DURATION_MS: u64 = 150;

/// Capacity of the gesture thread's input queue
pub const GESTURE_QUEUE_CAPACITY: usize = 256;

/// Normalized offset applied to a duplicated element so it does not hide the source.
pub const DUPLICATE_OFFSET: f32 = 0.05;
