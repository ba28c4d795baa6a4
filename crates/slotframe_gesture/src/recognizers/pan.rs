use super::{GestureUpdate, Recognizer, RecognizerState};
use crate::constants::PAN_MIN_DISTANCE;
use crate::{Point, TouchEvent, TouchSet, Vector};

/// Tracks the translation of the touch centroid.
///
/// The reported translation is measured from where the interaction began, so
/// the distance covered before activation is not lost. When a finger is added
/// or lifted the centroid jumps; the recognizer re-anchors on the new
/// centroid and keeps the translation accumulated so far.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    min_distance: f32,
    state: RecognizerState,
    /// Centroid at the last re-anchor
    anchor: Option<Point>,
    /// Translation accumulated before the current anchor
    offset: Vector,
    /// Touch count the anchor was taken with
    touch_count: usize,
    translation: Vector,
}

impl PanRecognizer {
    pub fn new(min_distance: f32) -> Self {
        Self {
            min_distance,
            state: RecognizerState::Possible,
            anchor: None,
            offset: Vector::zero(),
            touch_count: 0,
            translation: Vector::zero(),
        }
    }

    pub fn translation(&self) -> Vector {
        self.translation
    }
}

impl Default for PanRecognizer {
    fn default() -> Self {
        Self::new(PAN_MIN_DISTANCE)
    }
}

impl Recognizer for PanRecognizer {
    type Value = Vector;

    fn handle(&mut self, event: &TouchEvent, touches: &TouchSet) -> Option<GestureUpdate<Vector>> {
        if self.state.is_finished() {
            return None;
        }

        if let TouchEvent::Cancel { .. } = event {
            return self.fail();
        }

        if let (TouchEvent::Up { .. }, Some(anchor)) = (event, self.anchor) {
            // The lift position still counts toward the pan.
            if touches.len() + 1 == self.touch_count {
                if let Some(centroid) = touches.centroid_before_lift() {
                    self.translation = self.offset + (centroid - anchor);
                }
            }
        }

        let Some(centroid) = touches.centroid() else {
            // Last finger lifted.
            if self.state.is_active() || self.translation.length() >= self.min_distance {
                self.state = RecognizerState::Ended;
                return Some(GestureUpdate::Ended(self.translation));
            }
            self.state = RecognizerState::Failed;
            return None;
        };

        match self.anchor {
            Some(anchor) if touches.len() == self.touch_count => {
                self.translation = self.offset + (centroid - anchor);
            }
            _ => {
                self.offset = self.translation;
                self.anchor = Some(centroid);
                self.touch_count = touches.len();
                return None;
            }
        }

        match self.state {
            RecognizerState::Possible => {
                if self.translation.length() >= self.min_distance {
                    self.state = RecognizerState::Began;
                    log::trace!("pan began at {:?}", self.translation);
                    Some(GestureUpdate::Began(self.translation))
                } else {
                    None
                }
            }
            _ => {
                self.state = RecognizerState::Changed;
                Some(GestureUpdate::Changed(self.translation))
            }
        }
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn fail(&mut self) -> Option<GestureUpdate<Vector>> {
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
        *self = Self::new(self.min_distance);
    }
}
