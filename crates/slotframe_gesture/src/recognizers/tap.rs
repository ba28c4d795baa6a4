use std::time::Duration;

use super::{GestureUpdate, Recognizer, RecognizerState};
use crate::constants::{TAP_MAX_DISTANCE, TAP_MAX_DURATION};
use crate::{Point, TouchEvent, TouchId, TouchSet};

/// Value reported by [`TapRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapValue {
    pub position: Point,
}

/// Short, single-finger, near-stationary press used for selection.
///
/// Only ever reports `Ended`; a tap has no continuous phase.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    max_duration: Duration,
    max_distance: f32,
    state: RecognizerState,
    start: Option<(TouchId, Point, Duration)>,
}

impl TapRecognizer {
    pub fn new(max_duration: Duration, max_distance: f32) -> Self {
        Self {
            max_duration,
            max_distance,
            state: RecognizerState::Possible,
            start: None,
        }
    }
}

impl Default for TapRecognizer {
    fn default() -> Self {
        Self::new(TAP_MAX_DURATION, TAP_MAX_DISTANCE)
    }
}

impl Recognizer for TapRecognizer {
    type Value = TapValue;

    fn handle(
        &mut self,
        event: &TouchEvent,
        touches: &TouchSet,
    ) -> Option<GestureUpdate<TapValue>> {
        if self.state.is_finished() {
            return None;
        }

        match *event {
            TouchEvent::Down { id, position, time } => {
                if self.start.is_none() && touches.len() == 1 {
                    self.start = Some((id, position, time));
                } else {
                    // A second finger turns this into something else.
                    self.state = RecognizerState::Failed;
                }
                None
            }
            TouchEvent::Move { id, position, time } => {
                if let Some((start_id, start_pos, start_time)) = self.start {
                    if id == start_id
                        && (start_pos.distance(position) > self.max_distance
                            || time.saturating_sub(start_time) > self.max_duration)
                    {
                        self.state = RecognizerState::Failed;
                    }
                }
                None
            }
            TouchEvent::Up { id, position, time } => {
                let (start_id, start_pos, start_time) = self.start?;
                if id != start_id {
                    return None;
                }
                let held = time.saturating_sub(start_time);
                if held <= self.max_duration && start_pos.distance(position) <= self.max_distance {
                    self.state = RecognizerState::Ended;
                    Some(GestureUpdate::Ended(TapValue { position }))
                } else {
                    log::trace!("tap rejected: held {:?}", held);
                    self.state = RecognizerState::Failed;
                    None
                }
            }
            TouchEvent::Cancel { .. } => {
                self.state = RecognizerState::Failed;
                None
            }
        }
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn fail(&mut self) -> Option<GestureUpdate<TapValue>> {
        if !self.state.is_finished() {
            self.state = RecognizerState::Failed;
        }
        None
    }

    fn reset(&mut self) {
        *self = Self::new(self.max_duration, self.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizers::test_support::*;

    #[test]
    fn test_quick_tap_fires() {
        let mut tap = TapRecognizer::default();
        let mut touches = TouchSet::new();
        feed(&mut tap, &mut touches, down(1, 50.0, 50.0, 0));
        feed(&mut tap, &mut touches, moved(1, 52.0, 51.0, 40));
        let fired = feed(&mut tap, &mut touches, up(1, 52.0, 51.0, 120));
        assert_eq!(
            fired,
            Some(GestureUpdate::Ended(TapValue {
                position: Point::new(52.0, 51.0)
            }))
        );
    }

    #[test]
    fn test_long_press_is_not_a_tap() {
        let mut tap = TapRecognizer::default();
        let mut touches = TouchSet::new();
        feed(&mut tap, &mut touches, down(1, 50.0, 50.0, 0));
        assert!(feed(&mut tap, &mut touches, up(1, 50.0, 50.0, 400)).is_none());
        assert_eq!(tap.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_travel_fails_tap() {
        let mut tap = TapRecognizer::default();
        let mut touches = TouchSet::new();
        feed(&mut tap, &mut touches, down(1, 0.0, 0.0, 0));
        feed(&mut tap, &mut touches, moved(1, 30.0, 0.0, 20));
        assert!(feed(&mut tap, &mut touches, up(1, 0.0, 0.0, 40)).is_none());
    }

    #[test]
    fn test_two_fingers_fail_tap() {
        let mut tap = TapRecognizer::default();
        let mut touches = TouchSet::new();
        feed(&mut tap, &mut touches, down(1, 0.0, 0.0, 0));
        feed(&mut tap, &mut touches, down(2, 10.0, 0.0, 10));
        assert_eq!(tap.state(), RecognizerState::Failed);
    }
}
