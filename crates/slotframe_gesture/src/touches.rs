//! Bookkeeping for the fingers currently in contact.

use std::time::Duration;

use crate::{Point, TouchEvent, TouchId};

/// One finger in contact with the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: TouchId,
    /// Where the finger went down
    pub start: Point,
    /// Latest reported position
    pub current: Point,
    /// Timestamp of the down event
    pub down_time: Duration,
}

/// Active touches, kept in the order they went down.
#[derive(Debug, Clone, Default)]
pub struct TouchSet {
    touches: Vec<TouchPoint>,
    /// Finger removed by the last event, at its lift position
    lifted: Option<TouchPoint>,
}

impl TouchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold an event into the set.
    ///
    /// Returns `false` for events that do not belong to the current contact
    /// set (a move or lift for an unknown finger, or a repeated down).
    pub fn apply(&mut self, event: &TouchEvent) -> bool {
        self.lifted = None;
        match *event {
            TouchEvent::Down { id, position, time } => {
                if self.get(id).is_some() {
                    return false;
                }
                self.touches.push(TouchPoint {
                    id,
                    start: position,
                    current: position,
                    down_time: time,
                });
                true
            }
            TouchEvent::Move { id, position, .. } => {
                match self.touches.iter_mut().find(|t| t.id == id) {
                    Some(touch) => {
                        touch.current = position;
                        true
                    }
                    None => false,
                }
            }
            TouchEvent::Up { id, position, .. } => {
                let Some(index) = self.touches.iter().position(|t| t.id == id) else {
                    return false;
                };
                let mut touch = self.touches.remove(index);
                touch.current = position;
                self.lifted = Some(touch);
                true
            }
            TouchEvent::Cancel { .. } => {
                self.touches.clear();
                true
            }
        }
    }

    pub fn get(&self, id: TouchId) -> Option<&TouchPoint> {
        self.touches.iter().find(|t| t.id == id)
    }

    /// The finger lifted by the most recent event, with `current` set to
    /// where it left the surface.
    pub fn lifted(&self) -> Option<&TouchPoint> {
        self.lifted.as_ref()
    }

    /// Position of a finger that is down or was lifted by the last event.
    pub fn position_of(&self, id: TouchId) -> Option<Point> {
        self.get(id)
            .or(self.lifted.as_ref().filter(|t| t.id == id))
            .map(|t| t.current)
    }

    /// Mean position of the contact set as it was just before the last lift,
    /// with the lifted finger at its lift position.
    pub fn centroid_before_lift(&self) -> Option<Point> {
        let lifted = self.lifted.as_ref()?;
        let n = (self.touches.len() + 1) as f32;
        let (sx, sy) = self
            .touches
            .iter()
            .fold((lifted.current.x, lifted.current.y), |(sx, sy), t| {
                (sx + t.current.x, sy + t.current.y)
            });
        Some(Point::new(sx / n, sy / n))
    }

    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchPoint> {
        self.touches.iter()
    }

    /// Mean position of all current touches.
    pub fn centroid(&self) -> Option<Point> {
        if self.touches.is_empty() {
            return None;
        }
        let n = self.touches.len() as f32;
        let (sx, sy) = self
            .touches
            .iter()
            .fold((0.0, 0.0), |(sx, sy), t| (sx + t.current.x, sy + t.current.y));
        Some(Point::new(sx / n, sy / n))
    }

    /// The two earliest touches, which drive pinch and rotation.
    pub fn pair(&self) -> Option<(&TouchPoint, &TouchPoint)> {
        match self.touches.as_slice() {
            [a, b, ..] => Some((a, b)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.touches.clear();
        self.lifted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(id: u64, x: f32, y: f32) -> TouchEvent {
        TouchEvent::Down {
            id: TouchId(id),
            position: Point::new(x, y),
            time: Duration::ZERO,
        }
    }

    #[test]
    fn test_centroid_and_pair() {
        let mut set = TouchSet::new();
        assert!(set.centroid().is_none());
        assert!(set.apply(&down(1, 0.0, 0.0)));
        assert!(set.pair().is_none());
        assert!(set.apply(&down(2, 10.0, 20.0)));
        assert_eq!(set.centroid(), Some(Point::new(5.0, 10.0)));
        let (a, b) = set.pair().unwrap();
        assert_eq!((a.id, b.id), (TouchId(1), TouchId(2)));
    }

    #[test]
    fn test_unknown_and_duplicate_events_rejected() {
        let mut set = TouchSet::new();
        assert!(set.apply(&down(1, 0.0, 0.0)));
        assert!(!set.apply(&down(1, 5.0, 5.0)));
        assert!(!set.apply(&TouchEvent::Move {
            id: TouchId(9),
            position: Point::zero(),
            time: Duration::ZERO,
        }));
        assert!(!set.apply(&TouchEvent::Up {
            id: TouchId(9),
            position: Point::zero(),
            time: Duration::ZERO,
        }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_lift_position_is_kept_for_one_event() {
        let mut set = TouchSet::new();
        set.apply(&down(1, 0.0, 0.0));
        set.apply(&down(2, 100.0, 0.0));
        assert!(set.apply(&TouchEvent::Up {
            id: TouchId(2),
            position: Point::new(140.0, 20.0),
            time: Duration::ZERO,
        }));
        assert_eq!(set.len(), 1);
        assert_eq!(set.lifted().map(|t| t.current), Some(Point::new(140.0, 20.0)));
        assert_eq!(set.position_of(TouchId(2)), Some(Point::new(140.0, 20.0)));
        assert_eq!(set.centroid_before_lift(), Some(Point::new(70.0, 10.0)));

        set.apply(&TouchEvent::Move {
            id: TouchId(1),
            position: Point::new(5.0, 0.0),
            time: Duration::ZERO,
        });
        assert!(set.lifted().is_none());
        assert!(set.position_of(TouchId(2)).is_none());
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut set = TouchSet::new();
        set.apply(&down(1, 0.0, 0.0));
        set.apply(&down(2, 1.0, 1.0));
        assert!(set.apply(&TouchEvent::Cancel { time: Duration::ZERO }));
        assert!(set.is_empty());
    }
}
