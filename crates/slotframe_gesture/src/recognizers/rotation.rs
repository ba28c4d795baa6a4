use std::f32::consts::PI;

use super::{GestureUpdate, Recognizer, RecognizerState};
use crate::constants::{MIN_PINCH_SPAN, ROTATION_MIN_RADIANS};
use crate::{TouchEvent, TouchId, TouchSet};

/// Wrap an angle difference into `(-PI, PI]`.
fn wrap_delta(delta: f32) -> f32 {
    let mut d = delta % (2.0 * PI);
    if d > PI {
        d -= 2.0 * PI;
    } else if d <= -PI {
        d += 2.0 * PI;
    }
    d
}

/// Two-finger twist, reported as accumulated radians since the pair formed.
///
/// Angles are unwrapped event to event, so a full turn reports `2*PI` rather
/// than snapping back to zero. Segments re-arm the same way as
/// [`PinchRecognizer`](super::PinchRecognizer).
#[derive(Debug, Clone)]
pub struct RotationRecognizer {
    min_radians: f32,
    state: RecognizerState,
    pair: Option<(TouchId, TouchId)>,
    last_angle: f32,
    total: f32,
}

impl RotationRecognizer {
    pub fn new(min_radians: f32) -> Self {
        Self {
            min_radians,
            state: RecognizerState::Possible,
            pair: None,
            last_angle: 0.0,
            total: 0.0,
        }
    }

    /// Accumulated rotation of the current segment, in radians.
    pub fn radians(&self) -> f32 {
        self.total
    }
}

impl Default for RotationRecognizer {
    fn default() -> Self {
        Self::new(ROTATION_MIN_RADIANS)
    }
}

impl Recognizer for RotationRecognizer {
    type Value = f32;

    fn handle(&mut self, event: &TouchEvent, touches: &TouchSet) -> Option<GestureUpdate<f32>> {
        if matches!(
            self.state,
            RecognizerState::Cancelled | RecognizerState::Failed
        ) {
            return None;
        }

        if let TouchEvent::Cancel { .. } = event {
            return self.fail();
        }

        let current = touches.pair();
        let current_ids = current.map(|(a, b)| (a.id, b.id));

        if let Some((first, second)) = self.pair.filter(|_| current_ids != self.pair) {
            self.pair = None;
            if let (Some(a), Some(b)) = (touches.position_of(first), touches.position_of(second)) {
                let span = b - a;
                if span.length() >= MIN_PINCH_SPAN {
                    self.total += wrap_delta(span.angle() - self.last_angle);
                    self.last_angle = span.angle();
                }
            }
            if self.state.is_active() {
                self.state = RecognizerState::Ended;
                return Some(GestureUpdate::Ended(self.total));
            }
            self.state = RecognizerState::Possible;
        }

        let (a, b) = current?;
        let span = b.current - a.current;
        if span.length() < MIN_PINCH_SPAN {
            // Angle is undefined when the fingers coincide.
            return None;
        }
        let angle = span.angle();

        if self.pair.is_none() {
            self.pair = current_ids;
            self.last_angle = angle;
            self.total = 0.0;
            self.state = RecognizerState::Possible;
            return None;
        }

        self.total += wrap_delta(angle - self.last_angle);
        self.last_angle = angle;

        match self.state {
            RecognizerState::Possible => {
                if self.total.abs() >= self.min_radians {
                    self.state = RecognizerState::Began;
                    log::trace!("rotation began at {:.3} rad", self.total);
                    Some(GestureUpdate::Began(self.total))
                } else {
                    None
                }
            }
            _ => {
                self.state = RecognizerState::Changed;
                Some(GestureUpdate::Changed(self.total))
            }
        }
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn fail(&mut self) -> Option<GestureUpdate<f32>> {
        self.pair = None;
        if self.state.is_active() {
            self.state = RecognizerState::Cancelled;
            Some(GestureUpdate::Cancelled)
        } else {
            if !self.state.is_finished() {
                self.state = RecognizerState::Failed;
            }
            None
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.min_radians);
    }
}
