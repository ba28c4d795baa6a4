use super::{GestureUpdate, Recognizer, RecognizerState};
use crate::constants::{MIN_PINCH_SPAN, PINCH_MIN_SPAN_DELTA};
use crate::{Point, TouchEvent, TouchId, TouchSet};

/// Value reported by [`PinchRecognizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchValue {
    /// Current span divided by the span when the two fingers were paired
    pub scale_factor: f32,
    /// Midpoint between the two fingers
    pub focal: Point,
}

impl Default for PinchValue {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            focal: Point::zero(),
        }
    }
}

/// Two-finger pinch.
///
/// A segment starts when the two earliest touches are paired and ends when
/// either of them lifts. After a segment ends the recognizer re-arms, so
/// putting a second finger back down starts a fresh segment within the same
/// interaction.
#[derive(Debug, Clone)]
pub struct PinchRecognizer {
    min_span_delta: f32,
    state: RecognizerState,
    pair: Option<(TouchId, TouchId)>,
    start_span: f32,
    value: PinchValue,
}

impl PinchRecognizer {
    pub fn new(min_span_delta: f32) -> Self {
        Self {
            min_span_delta,
            state: RecognizerState::Possible,
            pair: None,
            start_span: 0.0,
            value: PinchValue::default(),
        }
    }

    pub fn value(&self) -> PinchValue {
        self.value
    }
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self::new(PINCH_MIN_SPAN_DELTA)
    }
}

impl Recognizer for PinchRecognizer {
    type Value = PinchValue;

    fn handle(
        &mut self,
        event: &TouchEvent,
        touches: &TouchSet,
    ) -> Option<GestureUpdate<PinchValue>> {
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
            // One of the paired fingers lifted; its lift position is final.
            self.pair = None;
            if let (Some(a), Some(b)) = (touches.position_of(first), touches.position_of(second)) {
                self.value = PinchValue {
                    scale_factor: a.distance(b) / self.start_span,
                    focal: Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
                };
            }
            if self.state.is_active() {
                self.state = RecognizerState::Ended;
                return Some(GestureUpdate::Ended(self.value));
            }
            self.state = RecognizerState::Possible;
        }

        let (a, b) = current?;
        let span = a.current.distance(b.current);
        let focal = Point::new(
            (a.current.x + b.current.x) / 2.0,
            (a.current.y + b.current.y) / 2.0,
        );

        if self.pair.is_none() {
            if span < MIN_PINCH_SPAN {
                return None;
            }
            self.pair = current_ids;
            self.start_span = span;
            self.state = RecognizerState::Possible;
            self.value = PinchValue {
                scale_factor: 1.0,
                focal,
            };
            return None;
        }

        self.value = PinchValue {
            scale_factor: span / self.start_span,
            focal,
        };

        match self.state {
            RecognizerState::Possible => {
                if (span - self.start_span).abs() >= self.min_span_delta {
                    self.state = RecognizerState::Began;
                    log::trace!("pinch began, factor {:.3}", self.value.scale_factor);
                    Some(GestureUpdate::Began(self.value))
                } else {
                    None
                }
            }
            _ => {
                self.state = RecognizerState::Changed;
                Some(GestureUpdate::Changed(self.value))
            }
        }
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn fail(&mut self) -> Option<GestureUpdate<PinchValue>> {
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
        *self = Self::new(self.min_span_delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizers::test_support::*;

    const EPSILON: f32 = 0.0001;

    fn factor(update: Option<GestureUpdate<PinchValue>>) -> f32 {
        update.and_then(|u| u.value()).map(|v| v.scale_factor).unwrap()
    }

    #[test]
    fn test_single_finger_never_pinches() {
        let mut pinch = PinchRecognizer::default();
        let mut touches = TouchSet::new();
        assert!(feed(&mut pinch, &mut touches, down(1, 0.0, 0.0, 0)).is_none());
        assert!(feed(&mut pinch, &mut touches, moved(1, 50.0, 0.0, 10)).is_none());
        assert_eq!(pinch.state(), RecognizerState::Possible);
    }

    #[test]
    fn test_spread_doubles_factor() {
        let mut pinch = PinchRecognizer::new(5.0);
        let mut touches = TouchSet::new();
        feed(&mut pinch, &mut touches, down(1, 100.0, 100.0, 0));
        assert!(feed(&mut pinch, &mut touches, down(2, 200.0, 100.0, 5)).is_none());

        let began = feed(&mut pinch, &mut touches, moved(2, 210.0, 100.0, 10));
        assert!(matches!(began, Some(GestureUpdate::Began(_))));
        assert!((factor(began) - 1.1).abs() < EPSILON);

        let changed = feed(&mut pinch, &mut touches, moved(2, 300.0, 100.0, 20));
        assert!((factor(changed) - 2.0).abs() < EPSILON);
        assert_eq!(pinch.value().focal, Point::new(200.0, 100.0));

        let ended = feed(&mut pinch, &mut touches, up(1, 100.0, 100.0, 30));
        assert!(matches!(ended, Some(GestureUpdate::Ended(_))));
        assert!((factor(ended) - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_lift_position_sets_final_factor() {
        let mut pinch = PinchRecognizer::new(5.0);
        let mut touches = TouchSet::new();
        feed(&mut pinch, &mut touches, down(1, 0.0, 0.0, 0));
        feed(&mut pinch, &mut touches, down(2, 100.0, 0.0, 0));
        feed(&mut pinch, &mut touches, moved(2, 150.0, 0.0, 10));
        let ended = feed(&mut pinch, &mut touches, up(2, 300.0, 0.0, 20));
        assert!(matches!(ended, Some(GestureUpdate::Ended(_))));
        assert!((factor(ended) - 3.0).abs() < EPSILON);
    }

    #[test]
    fn test_rearms_for_second_segment() {
        let mut pinch = PinchRecognizer::new(5.0);
        let mut touches = TouchSet::new();
        feed(&mut pinch, &mut touches, down(1, 0.0, 0.0, 0));
        feed(&mut pinch, &mut touches, down(2, 100.0, 0.0, 0));
        feed(&mut pinch, &mut touches, moved(2, 50.0, 0.0, 10));
        feed(&mut pinch, &mut touches, up(2, 50.0, 0.0, 20));
        assert_eq!(pinch.state(), RecognizerState::Ended);

        // New second finger: fresh segment relative to the new span.
        assert!(feed(&mut pinch, &mut touches, down(3, 10.0, 0.0, 30)).is_none());
        let began = feed(&mut pinch, &mut touches, moved(3, 20.0, 0.0, 40));
        assert!(matches!(began, Some(GestureUpdate::Began(_))));
        assert!((factor(began) - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_cancel_mid_pinch() {
        let mut pinch = PinchRecognizer::new(5.0);
        let mut touches = TouchSet::new();
        feed(&mut pinch, &mut touches, down(1, 0.0, 0.0, 0));
        feed(&mut pinch, &mut touches, down(2, 100.0, 0.0, 0));
        feed(&mut pinch, &mut touches, moved(2, 150.0, 0.0, 10));
        let cancelled = feed(&mut pinch, &mut touches, TouchEvent::Cancel { time: ms(20) });
        assert_eq!(cancelled, Some(GestureUpdate::Cancelled));
    }
}
