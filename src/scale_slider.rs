//! Vertical scale slider.
//!
//! The thumb position maps linearly onto `[min_scale, max_scale]` with the
//! axis inverted: the top of the track is `max_scale`. Dragging previews the
//! scale and commits on release. Tapping the track animates the thumb to the
//! tapped spot and then commits the same way a drag would.

use std::time::Duration;

use crate::bridge::BridgeHandle;
use crate::constants::{SLIDER_JUMP_DURATION_MS, SLIDER_THUMB_SIZE};
use crate::element::{ElementId, ScaleBounds};
use crate::transform::TransformPatch;

/// Movement (px) below which a press on the track counts as a tap.
const TAP_SLOP: f32 = 6.0;

/// Scale change reported by the slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliderOutput {
    /// Live feedback while dragging or animating; not committed
    Preview(f32),
    /// Released or animation finished
    Commit(f32),
}

/// Ease-out interpolation of the thumb between two positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbAnimation {
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

impl ThumbAnimation {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    fn ease_out(t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        t * (2.0 - t)
    }

    /// Step the animation. Returns the new position.
    pub fn advance(&mut self, dt: Duration) -> f32 {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.position()
    }

    pub fn position(&self) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * Self::ease_out(t)
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Idle,
    /// Finger down, not yet known to be a drag
    Pressed {
        start_y: f32,
        grab_offset: f32,
        on_thumb: bool,
    },
    Dragging { grab_offset: f32 },
    Animating(ThumbAnimation),
}

/// Transient slider state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSliderState {
    /// Thumb top edge, in pixels from the top of the track
    pub thumb_position: f32,
    interaction: Interaction,
}

impl ScaleSliderState {
    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging { .. })
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.interaction, Interaction::Animating(_))
    }
}

/// A one-dimensional scale control.
#[derive(Debug, Clone)]
pub struct ScaleSlider {
    bounds: ScaleBounds,
    track_height: f32,
    thumb_size: f32,
    jump_duration: Duration,
    state: ScaleSliderState,
    target: Option<(ElementId, BridgeHandle)>,
}

impl ScaleSlider {
    /// Create a slider over `bounds` on a track `track_height` pixels tall,
    /// with the thumb placed at `scale`.
    pub fn new(bounds: ScaleBounds, track_height: f32, scale: f32) -> Self {
        let mut slider = Self {
            bounds,
            track_height,
            thumb_size: SLIDER_THUMB_SIZE,
            jump_duration: Duration::from_millis(SLIDER_JUMP_DURATION_MS),
            state: ScaleSliderState {
                thumb_position: 0.0,
                interaction: Interaction::Idle,
            },
            target: None,
        };
        slider.state.thumb_position = slider.scale_to_position(scale);
        slider
    }

    /// Set the thumb size.
    pub fn thumb_size(mut self, thumb_size: f32) -> Self {
        let scale = self.scale();
        self.thumb_size = thumb_size.max(0.0);
        self.state.thumb_position = self.scale_to_position(scale);
        self
    }

    /// Set the tap-to-jump animation length.
    pub fn jump_duration(mut self, duration: Duration) -> Self {
        self.jump_duration = duration;
        self
    }

    /// Send commits for `id` through the bridge as external scale setters.
    pub fn bind(mut self, id: ElementId, bridge: BridgeHandle) -> Self {
        self.target = Some((id, bridge));
        self
    }

    pub fn state(&self) -> &ScaleSliderState {
        &self.state
    }

    /// Track length the thumb can travel.
    pub fn usable_track_height(&self) -> f32 {
        (self.track_height - self.thumb_size).max(0.0)
    }

    /// Map a thumb position to a scale. Top of the track is the maximum.
    pub fn position_to_scale(&self, position: f32) -> f32 {
        let usable = self.usable_track_height();
        if usable <= 0.0 || !position.is_finite() {
            return self.bounds.min;
        }
        let ratio = (position / usable).clamp(0.0, 1.0);
        self.bounds.max - ratio * (self.bounds.max - self.bounds.min)
    }

    /// Inverse of [`Self::position_to_scale`].
    pub fn scale_to_position(&self, scale: f32) -> f32 {
        let usable = self.usable_track_height();
        let range = self.bounds.max - self.bounds.min;
        if usable <= 0.0 || range.abs() < f32::EPSILON {
            return 0.0;
        }
        let ratio = (self.bounds.max - self.bounds.clamp(scale)) / range;
        ratio * usable
    }

    pub fn scale(&self) -> f32 {
        self.position_to_scale(self.state.thumb_position)
    }

    /// Reflect an externally changed scale. Ignored while the user holds the
    /// thumb.
    pub fn set_scale(&mut self, scale: f32) {
        if matches!(
            self.state.interaction,
            Interaction::Dragging { .. } | Interaction::Pressed { .. }
        ) {
            return;
        }
        self.state.interaction = Interaction::Idle;
        self.state.thumb_position = self.scale_to_position(scale);
    }

    /// Thumb position that puts the thumb's center under `y`.
    fn position_under(&self, y: f32) -> f32 {
        (y - self.thumb_size / 2.0).clamp(0.0, self.usable_track_height())
    }

    fn thumb_contains(&self, y: f32) -> bool {
        y >= self.state.thumb_position && y <= self.state.thumb_position + self.thumb_size
    }

    /// Finger down at `y` (pixels from the top of the track).
    pub fn press(&mut self, y: f32) {
        let on_thumb = self.thumb_contains(y);
        let grab_offset = if on_thumb {
            y - (self.state.thumb_position + self.thumb_size / 2.0)
        } else {
            0.0
        };
        self.state.interaction = Interaction::Pressed {
            start_y: y,
            grab_offset,
            on_thumb,
        };
    }

    /// Finger moved to `y`.
    pub fn drag(&mut self, y: f32) -> Option<SliderOutput> {
        let grab_offset = match self.state.interaction {
            Interaction::Pressed {
                start_y,
                grab_offset,
                ..
            } => {
                if (y - start_y).abs() < TAP_SLOP {
                    return None;
                }
                log::trace!("slider drag started at {}", start_y);
                grab_offset
            }
            Interaction::Dragging { grab_offset } => grab_offset,
            Interaction::Idle | Interaction::Animating(_) => return None,
        };
        self.state.interaction = Interaction::Dragging { grab_offset };
        self.state.thumb_position = self.position_under(y - grab_offset);
        Some(SliderOutput::Preview(self.scale()))
    }

    /// Finger lifted at `y`.
    pub fn release(&mut self, y: f32) -> Option<SliderOutput> {
        match self.state.interaction {
            Interaction::Dragging { .. } => {
                self.state.interaction = Interaction::Idle;
                Some(self.commit(self.scale()))
            }
            Interaction::Pressed { on_thumb: true, .. } => {
                // Tapping the thumb itself leaves it where it is.
                self.state.interaction = Interaction::Idle;
                None
            }
            Interaction::Pressed { .. } => {
                // Tap on the track: jump there.
                let target = self.position_under(y);
                let animation =
                    ThumbAnimation::new(self.state.thumb_position, target, self.jump_duration);
                self.state.interaction = Interaction::Animating(animation);
                self.advance(Duration::ZERO)
            }
            Interaction::Idle | Interaction::Animating(_) => None,
        }
    }

    /// Drive a running tap-to-jump animation by `dt`.
    pub fn advance(&mut self, dt: Duration) -> Option<SliderOutput> {
        let Interaction::Animating(mut animation) = self.state.interaction else {
            return None;
        };
        self.state.thumb_position = animation.advance(dt);
        if animation.is_finished() {
            self.state.interaction = Interaction::Idle;
            self.state.thumb_position = animation.target();
            return Some(self.commit(self.scale()));
        }
        self.state.interaction = Interaction::Animating(animation);
        Some(SliderOutput::Preview(self.scale()))
    }

    /// Abandon the interaction; the thumb returns to `committed_scale`.
    pub fn cancel(&mut self, committed_scale: f32) {
        self.state.interaction = Interaction::Idle;
        self.state.thumb_position = self.scale_to_position(committed_scale);
    }

    fn commit(&self, scale: f32) -> SliderOutput {
        if let Some((id, bridge)) = &self.target {
            bridge.set_transform(*id, TransformPatch::scale(scale));
        }
        SliderOutput::Commit(scale)
    }
}
