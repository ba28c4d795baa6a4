//! Gesture composition.
//!
//! The recognizer graph used by every manipulator is
//!
//! ```text
//! Exclusive(
//!     Simultaneous(Pan, Pinch, Rotation),   // priority
//!     Tap,
//! )
//! ```
//!
//! Pan, pinch and rotation run together so a user can drag, pinch and twist
//! in one motion. Once that unit activates, tap is failed for the rest of the
//! interaction, so a drag that ends where it started is never also a select.

use crate::recognizers::{
    GestureThresholds, GestureUpdate, PanRecognizer, PinchRecognizer, Recognizer,
    RecognizerState, RotationRecognizer, TapRecognizer, TapValue,
};
use crate::{TouchEvent, TouchSet, Vector};

/// Combined value of the simultaneous manipulation unit, relative to the
/// start of the interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manipulation {
    /// Centroid translation in pixels
    pub translation: Vector,
    /// Multiplicative scale change (1.0 = unchanged)
    pub scale_factor: f32,
    /// Rotation change in radians
    pub rotation: f32,
}

impl Default for Manipulation {
    fn default() -> Self {
        Self {
            translation: Vector::zero(),
            scale_factor: 1.0,
            rotation: 0.0,
        }
    }
}

/// Pan, pinch and rotation recognized at the same time.
///
/// Pinch and rotation may start and stop several times while a pan
/// continues (a finger lifted and put back). Each finished segment is folded
/// into an accumulated factor/angle so the next segment continues from it.
#[derive(Debug, Clone)]
pub struct Simultaneous {
    pan: PanRecognizer,
    pinch: PinchRecognizer,
    rotation: RotationRecognizer,
    state: RecognizerState,
    translation: Vector,
    folded_scale: f32,
    segment_scale: f32,
    folded_rotation: f32,
    segment_rotation: f32,
}

impl Simultaneous {
    pub fn new(pan: PanRecognizer, pinch: PinchRecognizer, rotation: RotationRecognizer) -> Self {
        Self {
            pan,
            pinch,
            rotation,
            state: RecognizerState::Possible,
            translation: Vector::zero(),
            folded_scale: 1.0,
            segment_scale: 1.0,
            folded_rotation: 0.0,
            segment_rotation: 0.0,
        }
    }

    pub fn value(&self) -> Manipulation {
        Manipulation {
            translation: self.translation,
            scale_factor: self.folded_scale * self.segment_scale,
            rotation: self.folded_rotation + self.segment_rotation,
        }
    }

    fn clear_values(&mut self) {
        self.translation = Vector::zero();
        self.folded_scale = 1.0;
        self.segment_scale = 1.0;
        self.folded_rotation = 0.0;
        self.segment_rotation = 0.0;
    }
}

impl Recognizer for Simultaneous {
    type Value = Manipulation;

    fn handle(
        &mut self,
        event: &TouchEvent,
        touches: &TouchSet,
    ) -> Option<GestureUpdate<Manipulation>> {
        if self.state.is_finished() {
            return None;
        }

        let pan = self.pan.handle(event, touches);
        let pinch = self.pinch.handle(event, touches);
        let rotation = self.rotation.handle(event, touches);

        if let TouchEvent::Cancel { .. } = event {
            return self.fail();
        }

        let mut began = false;
        let mut changed = false;

        match pan {
            Some(GestureUpdate::Began(v)) => {
                self.translation = v;
                began = true;
            }
            Some(GestureUpdate::Changed(v)) | Some(GestureUpdate::Ended(v)) => {
                self.translation = v;
                changed = true;
            }
            _ => {}
        }

        match pinch {
            Some(GestureUpdate::Began(v)) => {
                self.segment_scale = v.scale_factor;
                began = true;
            }
            Some(GestureUpdate::Changed(v)) => {
                self.segment_scale = v.scale_factor;
                changed = true;
            }
            Some(GestureUpdate::Ended(v)) => {
                self.folded_scale *= v.scale_factor;
                self.segment_scale = 1.0;
                changed = true;
            }
            _ => {}
        }

        match rotation {
            Some(GestureUpdate::Began(v)) => {
                self.segment_rotation = v;
                began = true;
            }
            Some(GestureUpdate::Changed(v)) => {
                self.segment_rotation = v;
                changed = true;
            }
            Some(GestureUpdate::Ended(v)) => {
                self.folded_rotation += v;
                self.segment_rotation = 0.0;
                changed = true;
            }
            _ => {}
        }

        if self.state == RecognizerState::Possible {
            if began {
                self.state = RecognizerState::Began;
                return Some(GestureUpdate::Began(self.value()));
            }
            if touches.is_empty() {
                if changed {
                    // Activated and finished on the same lift.
                    self.state = RecognizerState::Ended;
                    return Some(GestureUpdate::Ended(self.value()));
                }
                self.state = RecognizerState::Failed;
            }
            return None;
        }

        if touches.is_empty() {
            self.state = RecognizerState::Ended;
            return Some(GestureUpdate::Ended(self.value()));
        }

        if began || changed {
            self.state = RecognizerState::Changed;
            return Some(GestureUpdate::Changed(self.value()));
        }
        None
    }

    fn state(&self) -> RecognizerState {
        self.state
    }

    fn fail(&mut self) -> Option<GestureUpdate<Manipulation>> {
        self.pan.fail();
        self.pinch.fail();
        self.rotation.fail();
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
        self.pan.reset();
        self.pinch.reset();
        self.rotation.reset();
        self.state = RecognizerState::Possible;
        self.clear_values();
    }
}

/// Output of an [`Exclusive`] pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Prioritized<A, B> {
    Primary(GestureUpdate<A>),
    Secondary(GestureUpdate<B>),
}

/// Two recognizers where the first has priority.
///
/// The secondary only ever reports if the primary did not activate during
/// the current interaction.
#[derive(Debug, Clone)]
pub struct Exclusive<A, B> {
    primary: A,
    secondary: B,
    primary_claimed: bool,
}

impl<A: Recognizer, B: Recognizer> Exclusive<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self {
            primary,
            secondary,
            primary_claimed: false,
        }
    }

    pub fn handle(
        &mut self,
        event: &TouchEvent,
        touches: &TouchSet,
    ) -> Option<Prioritized<A::Value, B::Value>> {
        let primary = self.primary.handle(event, touches);

        if self.primary.state() != RecognizerState::Possible
            && self.primary.state() != RecognizerState::Failed
        {
            if !self.primary_claimed {
                self.primary_claimed = true;
                self.secondary.fail();
            }
        }

        if self.primary_claimed {
            return primary.map(Prioritized::Primary);
        }

        let secondary = self.secondary.handle(event, touches);
        primary
            .map(Prioritized::Primary)
            .or(secondary.map(Prioritized::Secondary))
    }

    pub fn primary(&self) -> &A {
        &self.primary
    }

    pub fn secondary(&self) -> &B {
        &self.secondary
    }

    /// Whether the primary took over the current interaction.
    pub fn primary_claimed(&self) -> bool {
        self.primary_claimed
    }

    pub fn reset(&mut self) {
        self.primary.reset();
        self.secondary.reset();
        self.primary_claimed = false;
    }
}

/// High-level event emitted by [`GestureComposer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Manipulation(GestureUpdate<Manipulation>),
    Tap(TapValue),
}

/// The complete recognizer graph for one manipulable element.
///
/// Built once per element and kept for its whole lifetime.
#[derive(Debug, Clone)]
pub struct GestureComposer {
    touches: TouchSet,
    graph: Exclusive<Simultaneous, TapRecognizer>,
}

impl GestureComposer {
    pub fn new(thresholds: GestureThresholds) -> Self {
        let manipulation = Simultaneous::new(
            PanRecognizer::new(thresholds.pan_min_distance),
            PinchRecognizer::new(thresholds.pinch_min_span_delta),
            RotationRecognizer::new(thresholds.rotation_min_radians),
        );
        let tap = TapRecognizer::new(thresholds.tap_max_duration(), thresholds.tap_max_distance);
        Self {
            touches: TouchSet::new(),
            graph: Exclusive::new(manipulation, tap),
        }
    }

    /// Feed one raw touch event through the graph.
    pub fn handle(&mut self, event: TouchEvent) -> Option<GestureEvent> {
        if !self.touches.apply(&event) {
            log::trace!("ignoring touch event outside the contact set: {:?}", event);
            return None;
        }

        let output = self.graph.handle(&event, &self.touches);

        if self.touches.is_empty() {
            // Interaction over; arm everything for the next one.
            self.graph.reset();
        }

        match output {
            Some(Prioritized::Primary(update)) => Some(GestureEvent::Manipulation(update)),
            Some(Prioritized::Secondary(GestureUpdate::Ended(tap))) => Some(GestureEvent::Tap(tap)),
            _ => None,
        }
    }

    /// Whether a manipulation is currently active.
    pub fn is_manipulating(&self) -> bool {
        self.graph.primary().is_active()
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }
}

impl Default for GestureComposer {
    fn default() -> Self {
        Self::new(GestureThresholds::default())
    }
}
