use std::time::Duration;

use crate::Point;

/// Identifies one finger (or pointer) for the lifetime of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TouchId(pub u64);

/// Raw touch input delivered to the gesture thread.
///
/// `time` is monotonic and only meaningful relative to other events of the
/// same stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// A finger touched down.
    Down {
        id: TouchId,
        position: Point,
        time: Duration,
    },
    /// A finger moved.
    Move {
        id: TouchId,
        position: Point,
        time: Duration,
    },
    /// A finger lifted.
    Up {
        id: TouchId,
        position: Point,
        time: Duration,
    },
    /// The system interrupted the interaction (screen lock, backgrounding,
    /// another view claiming the touches). All contacts are dropped.
    Cancel { time: Duration },
}

impl TouchEvent {
    pub fn down(id: u64, position: Point, time: Duration) -> Self {
        TouchEvent::Down {
            id: TouchId(id),
            position,
            time,
        }
    }

    pub fn moved(id: u64, position: Point, time: Duration) -> Self {
        TouchEvent::Move {
            id: TouchId(id),
            position,
            time,
        }
    }

    pub fn up(id: u64, position: Point, time: Duration) -> Self {
        TouchEvent::Up {
            id: TouchId(id),
            position,
            time,
        }
    }

    pub fn time(&self) -> Duration {
        match self {
            TouchEvent::Down { time, .. }
            | TouchEvent::Move { time, .. }
            | TouchEvent::Up { time, .. }
            | TouchEvent::Cancel { time } => *time,
        }
    }

    pub fn touch_id(&self) -> Option<TouchId> {
        match self {
            TouchEvent::Down { id, .. }
            | TouchEvent::Move { id, .. }
            | TouchEvent::Up { id, .. } => {
                Some(*id)
            }
            TouchEvent::Cancel { .. } => None,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            TouchEvent::Down { position, .. }
            | TouchEvent::Move { position, .. }
            | TouchEvent::Up { position, .. } => Some(*position),
            TouchEvent::Cancel { .. } => None,
        }
    }
}
