//! Per-gesture session state.
//!
//! A session captures the committed value when a manipulation starts and
//! computes every frame relative to that snapshot, so rounding error never
//! accumulates across incremental updates. It lives on the gesture thread
//! only and is discarded at gesture end or cancel.
//!
//! ```text
//! Idle -> Started -> Updating -> (Ended) -> Idle
//!            \           \
//!             +-----------+-- Cancelled --> Idle (live value reverts)
//! ```

use std::fmt::Debug;

use slotframe_gesture::{GestureEvent, GestureUpdate, Manipulation, Point};

/// Phase of a [`GestureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Snapshot captured, no frame applied yet
    Started,
    /// At least one frame applied
    Updating,
}

/// Maps a manipulation onto a value type.
pub trait ManipulationTarget {
    type Value: Copy + PartialEq + Debug;

    /// Live value for a frame: clamped for usability, never snapped.
    fn apply(&self, start: Self::Value, manipulation: &Manipulation) -> Self::Value;

    /// Value to commit at gesture end: final clamping and snapping.
    fn finalize(&self, value: Self::Value) -> Self::Value;
}

/// What the caller should do after feeding an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome<V> {
    /// Nothing changed
    Idle,
    /// The live value changed; redraw on the gesture thread only
    Frame(V),
    /// Gesture ended; commit this value through the bridge
    Commit(V),
    /// Gesture cancelled; the live value reverted to this snapshot
    Reverted(V),
    /// Selection tap
    Tap(Point),
}

/// Start-of-gesture snapshot and phase.
#[derive(Debug, Clone, Default)]
pub struct GestureSession<V> {
    phase: SessionPhase,
    start: Option<V>,
}

impl<V: Copy + PartialEq + Debug> GestureSession<V> {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            start: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    /// The snapshot deltas are computed against.
    pub fn start_snapshot(&self) -> Option<V> {
        self.start
    }

    /// Capture the snapshot and enter `Started`.
    pub fn begin(&mut self, snapshot: V) {
        if self.is_active() {
            log::debug!("gesture session restarted while {:?}", self.phase);
        }
        self.phase = SessionPhase::Started;
        self.start = Some(snapshot);
    }

    /// Replace the snapshot of an active session after an external change.
    pub fn rebase(&mut self, snapshot: V) {
        if self.is_active() {
            self.start = Some(snapshot);
        }
    }

    /// Leave the session, returning the snapshot it held.
    fn finish(&mut self) -> Option<V> {
        self.phase = SessionPhase::Idle;
        self.start.take()
    }

    /// Feed one composer event.
    ///
    /// `committed` is the last committed value (the baseline for a new
    /// gesture); `live` is the value currently displayed on the gesture thread
    /// and is updated in place.
    pub fn drive<T>(
        &mut self,
        target: &T,
        event: GestureEvent,
        committed: V,
        live: &mut V,
    ) -> SessionOutcome<V>
    where
        T: ManipulationTarget<Value = V>,
    {
        match event {
            GestureEvent::Tap(tap) => SessionOutcome::Tap(tap.position),
            GestureEvent::Manipulation(GestureUpdate::Began(m)) => {
                self.begin(committed);
                *live = target.apply(committed, &m);
                SessionOutcome::Frame(*live)
            }
            GestureEvent::Manipulation(GestureUpdate::Changed(m)) => {
                let Some(start) = self.start else {
                    return SessionOutcome::Idle;
                };
                self.phase = SessionPhase::Updating;
                *live = target.apply(start, &m);
                SessionOutcome::Frame(*live)
            }
            GestureEvent::Manipulation(GestureUpdate::Ended(m)) => {
                // A manipulation can begin and end on the same lift.
                let start = self.finish().unwrap_or(committed);
                let value = target.finalize(target.apply(start, &m));
                *live = value;
                SessionOutcome::Commit(value)
            }
            GestureEvent::Manipulation(GestureUpdate::Cancelled) => {
                let snapshot = self.finish().unwrap_or(committed);
                *live = snapshot;
                SessionOutcome::Reverted(snapshot)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotframe_gesture::{TapValue, Vector};

    /// Scalar target: value is translation.dx added to the start, finalize rounds.
    struct Offset;

    impl ManipulationTarget for Offset {
        type Value = f32;

        fn apply(&self, start: f32, m: &Manipulation) -> f32 {
            start + m.translation.dx
        }

        fn finalize(&self, value: f32) -> f32 {
            value.round()
        }
    }

    fn pan(dx: f32) -> Manipulation {
        Manipulation {
            translation: Vector::new(dx, 0.0),
            ..Manipulation::default()
        }
    }

    fn began(dx: f32) -> GestureEvent {
        GestureEvent::Manipulation(GestureUpdate::Began(pan(dx)))
    }

    fn changed(dx: f32) -> GestureEvent {
        GestureEvent::Manipulation(GestureUpdate::Changed(pan(dx)))
    }

    fn ended(dx: f32) -> GestureEvent {
        GestureEvent::Manipulation(GestureUpdate::Ended(pan(dx)))
    }

    #[test]
    fn test_full_lifecycle_commits_relative_to_snapshot() {
        let mut session = GestureSession::new();
        let mut live = 10.0;

        let out = session.drive(&Offset, began(5.0), 10.0, &mut live);
        assert_eq!(out, SessionOutcome::Frame(15.0));
        assert_eq!(session.phase(), SessionPhase::Started);

        // The committed argument is ignored mid-gesture: the snapshot rules.
        let out = session.drive(&Offset, changed(7.25), 99.0, &mut live);
        assert_eq!(out, SessionOutcome::Frame(17.25));
        assert_eq!(session.phase(), SessionPhase::Updating);

        let out = session.drive(&Offset, ended(7.25), 99.0, &mut live);
        assert_eq!(out, SessionOutcome::Commit(17.0));
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.start_snapshot(), None);
    }

    #[test]
    fn test_cancel_reverts_live_value() {
        let mut session = GestureSession::new();
        let mut live = 10.0;
        session.drive(&Offset, began(50.0), 10.0, &mut live);
        assert_eq!(live, 60.0);
        let cancelled = GestureEvent::Manipulation(GestureUpdate::Cancelled);
        let out = session.drive(&Offset, cancelled, 10.0, &mut live);
        assert_eq!(out, SessionOutcome::Reverted(10.0));
        assert_eq!(live, 10.0);
        assert!(!session.is_active());
    }

    #[test]
    fn test_rebase_only_when_active() {
        let mut session: GestureSession<f32> = GestureSession::new();
        session.rebase(3.0);
        assert_eq!(session.start_snapshot(), None);
        session.begin(1.0);
        session.rebase(3.0);
        assert_eq!(session.start_snapshot(), Some(3.0));
    }

    #[test]
    fn test_tap_passes_through() {
        let mut session = GestureSession::new();
        let mut live = 0.0;
        let tap = GestureEvent::Tap(TapValue {
            position: Point::new(1.0, 2.0),
        });
        assert_eq!(
            session.drive(&Offset, tap, 0.0, &mut live),
            SessionOutcome::Tap(Point::new(1.0, 2.0))
        );
    }

    #[test]
    fn test_end_without_start_commits_from_baseline() {
        let mut session = GestureSession::new();
        let mut live = 4.0;
        let out = session.drive(&Offset, ended(40.0), 4.0, &mut live);
        assert_eq!(out, SessionOutcome::Commit(44.0));
        assert_eq!(live, 44.0);
        assert!(!session.is_active());
    }

    #[test]
    fn test_update_without_start_is_ignored() {
        let mut session = GestureSession::new();
        let mut live = 4.0;
        let out = session.drive(&Offset, changed(1.0), 4.0, &mut live);
        assert_eq!(out, SessionOutcome::Idle);
        assert_eq!(live, 4.0);
    }
}
