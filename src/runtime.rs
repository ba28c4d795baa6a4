//! The real-time gesture thread.
//!
//! All manipulators live on one named background thread that consumes
//! [`GestureInput`] messages. It never waits on the application thread:
//! commits leave through the bridge, and applied values come back as
//! [`ModelSync`] echoes on a separate unbounded queue, so the application's
//! `pump` can always hand them off. Pending echoes are drained before every
//! input message. Live values for drawing are published into a shared
//! [`LiveView`] a renderer can read at any time.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use slotframe_gesture::{Point, Size, TouchEvent};
use web_time::Instant;

use crate::bridge::{self, AppBridge, BridgeHandle, ModelSync};
use crate::config::EngineConfig;
use crate::constants::GESTURE_QUEUE_CAPACITY;
use crate::element::{ElementId, ElementKind};
use crate::overlay::OverlayManipulator;
use crate::slot_crop::{SlotCropAdjustment, SlotCropManipulator};
use crate::transform::Transform;

/// Message sent to the gesture thread.
#[derive(Debug)]
pub enum GestureInput {
    /// Start manipulating a freely placed element
    RegisterOverlay {
        id: ElementId,
        kind: ElementKind,
        base_size: Size,
        initial: Transform,
    },
    /// Start manipulating an image slot
    RegisterSlot {
        id: ElementId,
        slot: Size,
        image: Size,
        initial: SlotCropAdjustment,
    },
    Unregister(ElementId),
    /// Raw touch on the view of `target`
    Touch { target: ElementId, event: TouchEvent },
    CanvasResized(Size),
    /// A slot was laid out again or its image replaced
    SlotGeometryChanged { id: ElementId, slot: Size, image: Size },
    /// An overlay's unscaled content size changed
    BaseSizeChanged { id: ElementId, base_size: Size },
    /// Reply once every earlier message has been handled
    Flush(Sender<()>),
    Shutdown,
}

/// Errors from the gesture runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The OS refused to start the thread
    #[error("Failed to spawn gesture thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The gesture thread has exited
    #[error("Gesture thread is not running")]
    Disconnected,

    /// The input queue is full; the message was dropped
    #[error("Gesture queue is full")]
    QueueFull,
}

/// Value currently drawn for an element, including uncommitted deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiveValue {
    Transform(Transform),
    Adjustment(SlotCropAdjustment),
}

/// Live values shared between the gesture thread and a renderer.
#[derive(Debug, Clone, Default)]
pub struct LiveView {
    values: Arc<RwLock<BTreeMap<ElementId, LiveValue>>>,
}

impl LiveView {
    pub fn get(&self, id: ElementId) -> Option<LiveValue> {
        self.values.read().get(&id).copied()
    }

    pub fn transform(&self, id: ElementId) -> Option<Transform> {
        match self.get(id)? {
            LiveValue::Transform(transform) => Some(transform),
            LiveValue::Adjustment(_) => None,
        }
    }

    pub fn adjustment(&self, id: ElementId) -> Option<SlotCropAdjustment> {
        match self.get(id)? {
            LiveValue::Adjustment(adjustment) => Some(adjustment),
            LiveValue::Transform(_) => None,
        }
    }

    fn publish(&self, id: ElementId, value: LiveValue) {
        self.values.write().insert(id, value);
    }

    fn remove(&self, id: ElementId) {
        self.values.write().remove(&id);
    }
}

/// Handle to the running gesture thread. Dropping it shuts the thread down.
pub struct GestureRuntime {
    input_tx: Sender<GestureInput>,
    sync_tx: Sender<ModelSync>,
    bridge: BridgeHandle,
    thread_handle: Option<JoinHandle<()>>,
    live: LiveView,
    epoch: Instant,
}

impl GestureRuntime {
    /// Create the bridge pair, spawn the gesture thread and connect the sync
    /// path. Returns the runtime and the application end of the bridge.
    pub fn start(config: EngineConfig, canvas: Size) -> Result<(Self, AppBridge), RuntimeError> {
        let (handle, mut app) = bridge::bridge();
        let runtime = Self::spawn(config, canvas, handle)?;
        app.connect_sync(runtime.sync_sender());
        Ok((runtime, app))
    }

    /// Spawn the gesture thread reporting through `bridge`.
    pub fn spawn(
        config: EngineConfig,
        canvas: Size,
        bridge: BridgeHandle,
    ) -> Result<Self, RuntimeError> {
        let (input_tx, input_rx) = crossbeam_channel::bounded(GESTURE_QUEUE_CAPACITY);
        let (sync_tx, sync_rx) = crossbeam_channel::unbounded();
        let live = LiveView::default();

        let mut worker = GestureThread {
            config,
            canvas,
            bridge: bridge.clone(),
            overlays: BTreeMap::new(),
            slots: BTreeMap::new(),
            live: live.clone(),
        };
        let thread_handle = thread::Builder::new()
            .name("gesture".to_string())
            .spawn(move || {
                log::info!("Gesture thread started");
                worker.run(input_rx, sync_rx);
                log::info!("Gesture thread exiting");
            })?;

        Ok(Self {
            input_tx,
            sync_tx,
            bridge,
            thread_handle: Some(thread_handle),
            live,
            epoch: Instant::now(),
        })
    }

    /// A sender into the gesture thread's queue.
    pub fn input_sender(&self) -> Sender<GestureInput> {
        self.input_tx.clone()
    }

    /// A sender for model echoes, for an [`AppBridge`] created elsewhere.
    pub fn sync_sender(&self) -> Sender<ModelSync> {
        self.sync_tx.clone()
    }

    /// Handle for external setters (panels, sliders). Uses the same path as
    /// gesture commits.
    pub fn bridge(&self) -> BridgeHandle {
        self.bridge.clone()
    }

    pub fn live(&self) -> &LiveView {
        &self.live
    }

    /// Queue a message without waiting. A full queue drops the message.
    pub fn send(&self, input: GestureInput) -> Result<(), RuntimeError> {
        self.input_tx.try_send(input).map_err(|err| match err {
            TrySendError::Full(input) => {
                log::warn!("Gesture queue full, dropping {:?}", input);
                RuntimeError::QueueFull
            }
            TrySendError::Disconnected(_) => RuntimeError::Disconnected,
        })
    }

    pub fn register_overlay(
        &self,
        id: ElementId,
        kind: ElementKind,
        base_size: Size,
        initial: Transform,
    ) -> Result<(), RuntimeError> {
        self.send(GestureInput::RegisterOverlay {
            id,
            kind,
            base_size,
            initial,
        })
    }

    pub fn register_slot(
        &self,
        id: ElementId,
        slot: Size,
        image: Size,
        initial: SlotCropAdjustment,
    ) -> Result<(), RuntimeError> {
        self.send(GestureInput::RegisterSlot {
            id,
            slot,
            image,
            initial,
        })
    }

    pub fn unregister(&self, id: ElementId) -> Result<(), RuntimeError> {
        self.send(GestureInput::Unregister(id))
    }

    pub fn resize_canvas(&self, canvas: Size) -> Result<(), RuntimeError> {
        self.send(GestureInput::CanvasResized(canvas))
    }

    pub fn set_slot_geometry(
        &self,
        id: ElementId,
        slot: Size,
        image: Size,
    ) -> Result<(), RuntimeError> {
        self.send(GestureInput::SlotGeometryChanged { id, slot, image })
    }

    pub fn set_base_size(&self, id: ElementId, base_size: Size) -> Result<(), RuntimeError> {
        self.send(GestureInput::BaseSizeChanged { id, base_size })
    }

    /// Time since the runtime started, used to stamp touch events.
    pub fn timestamp(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Forward an already stamped touch event.
    pub fn touch(&self, target: ElementId, event: TouchEvent) -> Result<(), RuntimeError> {
        self.send(GestureInput::Touch { target, event })
    }

    pub fn touch_down(
        &self,
        target: ElementId,
        finger: u64,
        position: Point,
    ) -> Result<(), RuntimeError> {
        self.touch(target, TouchEvent::down(finger, position, self.timestamp()))
    }

    pub fn touch_move(
        &self,
        target: ElementId,
        finger: u64,
        position: Point,
    ) -> Result<(), RuntimeError> {
        self.touch(target, TouchEvent::moved(finger, position, self.timestamp()))
    }

    pub fn touch_up(
        &self,
        target: ElementId,
        finger: u64,
        position: Point,
    ) -> Result<(), RuntimeError> {
        self.touch(target, TouchEvent::up(finger, position, self.timestamp()))
    }

    /// The system interrupted the interaction on `target`.
    pub fn touch_cancel(&self, target: ElementId) -> Result<(), RuntimeError> {
        self.touch(
            target,
            TouchEvent::Cancel {
                time: self.timestamp(),
            },
        )
    }

    /// Block until the gesture thread has handled everything sent so far.
    pub fn flush(&self) -> Result<(), RuntimeError> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        self.input_tx
            .send(GestureInput::Flush(done_tx))
            .map_err(|_| RuntimeError::Disconnected)?;
        done_rx.recv().map_err(|_| RuntimeError::Disconnected)
    }

    /// Stop the thread and wait for it.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(handle) = self.thread_handle.take() else {
            return;
        };
        log::debug!("Shutting down gesture thread");
        let _ = self.input_tx.send(GestureInput::Shutdown);
        if let Err(e) = handle.join() {
            log::warn!("Gesture thread panicked: {:?}", e);
        }
    }
}

impl Drop for GestureRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for GestureRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRuntime")
            .field("queued", &self.input_tx.len())
            .field("running", &self.thread_handle.is_some())
            .finish()
    }
}

/// State owned by the gesture thread.
struct GestureThread {
    config: EngineConfig,
    canvas: Size,
    bridge: BridgeHandle,
    overlays: BTreeMap<ElementId, OverlayManipulator>,
    slots: BTreeMap<ElementId, SlotCropManipulator>,
    live: LiveView,
}

impl GestureThread {
    fn run(&mut self, input_rx: Receiver<GestureInput>, sync_rx: Receiver<ModelSync>) {
        loop {
            select! {
                recv(sync_rx) -> sync => match sync {
                    Ok(sync) => self.sync(sync),
                    Err(_) => {
                        // The runtime owns a sync sender, so it is gone too.
                        log::debug!("Sync channel closed, gesture thread exiting");
                        break;
                    }
                },
                recv(input_rx) -> input => {
                    // Echoes sent before this input must land first.
                    for sync in sync_rx.try_iter() {
                        self.sync(sync);
                    }
                    match input {
                        Ok(GestureInput::Shutdown) => {
                            log::debug!("Received shutdown signal");
                            break;
                        }
                        Ok(input) => self.handle(input),
                        Err(_) => {
                            log::debug!("Input channel closed, gesture thread exiting");
                            break;
                        }
                    }
                },
            }
        }
    }

    fn handle(&mut self, input: GestureInput) {
        match input {
            GestureInput::RegisterOverlay {
                id,
                kind,
                base_size,
                initial,
            } => {
                let manipulator = OverlayManipulator::new(
                    id,
                    kind,
                    base_size,
                    self.canvas,
                    initial,
                    self.config.overlay_policy(kind),
                    self.config.gestures,
                    self.bridge.clone(),
                );
                if self.overlays.insert(id, manipulator).is_some() {
                    log::debug!("Replaced manipulator for {}", id);
                }
                self.live.publish(id, LiveValue::Transform(initial));
            }
            GestureInput::RegisterSlot {
                id,
                slot,
                image,
                initial,
            } => {
                let manipulator = SlotCropManipulator::new(
                    id,
                    slot,
                    image,
                    initial,
                    self.config.scale_bounds.photo,
                    self.config.gestures,
                    self.bridge.clone(),
                );
                let live = manipulator.live_adjustment();
                if self.slots.insert(id, manipulator).is_some() {
                    log::debug!("Replaced slot manipulator for {}", id);
                }
                self.live.publish(id, LiveValue::Adjustment(live));
            }
            GestureInput::Unregister(id) => self.remove(id),
            GestureInput::Touch { target, event } => self.touch(target, event),
            GestureInput::CanvasResized(canvas) => {
                if canvas.is_degenerate() {
                    log::debug!("Ignoring degenerate canvas {:?}", canvas);
                    return;
                }
                self.canvas = canvas;
                for overlay in self.overlays.values_mut() {
                    overlay.set_canvas_size(canvas);
                }
            }
            GestureInput::SlotGeometryChanged { id, slot, image } => {
                match self.slots.get_mut(&id) {
                    Some(manipulator) => manipulator.set_geometry(slot, image),
                    None => log::debug!("Geometry change for unregistered slot {}", id),
                }
            }
            GestureInput::BaseSizeChanged { id, base_size } => {
                match self.overlays.get_mut(&id) {
                    Some(manipulator) => manipulator.set_base_size(base_size),
                    None => log::debug!("Base size change for unregistered element {}", id),
                }
            }
            GestureInput::Flush(done) => {
                let _ = done.send(());
            }
            GestureInput::Shutdown => {}
        }
    }

    fn touch(&mut self, target: ElementId, event: TouchEvent) {
        if let Some(overlay) = self.overlays.get_mut(&target) {
            if overlay.handle_touch(event).is_some() {
                self.live
                    .publish(target, LiveValue::Transform(overlay.live_transform()));
            }
        } else if let Some(slot) = self.slots.get_mut(&target) {
            if slot.handle_touch(event).is_some() {
                self.live
                    .publish(target, LiveValue::Adjustment(slot.live_adjustment()));
            }
        } else {
            log::debug!("Touch for unregistered element {}", target);
        }
    }

    fn sync(&mut self, sync: ModelSync) {
        match sync {
            ModelSync::Transform {
                id,
                transform,
                revision,
            } => {
                if let Some(overlay) = self.overlays.get_mut(&id) {
                    overlay.sync_from_model(transform, revision);
                    self.live
                        .publish(id, LiveValue::Transform(overlay.live_transform()));
                }
            }
            ModelSync::Adjustment {
                id,
                adjustment,
                revision,
            } => {
                if let Some(slot) = self.slots.get_mut(&id) {
                    slot.sync_from_model(adjustment, revision);
                    self.live
                        .publish(id, LiveValue::Adjustment(slot.live_adjustment()));
                }
            }
            ModelSync::Removed(id) => self.remove(id),
        }
    }

    fn remove(&mut self, id: ElementId) {
        let removed = self.overlays.remove(&id).is_some() | self.slots.remove(&id).is_some();
        if removed {
            log::debug!("Unregistered {}", id);
        }
        self.live.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn start(canvas: Size) -> (GestureRuntime, AppBridge) {
        GestureRuntime::start(EngineConfig::new(), canvas).unwrap()
    }

    #[test]
    fn test_register_publishes_live_value() {
        let (runtime, _app) = start(Size::new(800.0, 600.0));
        let initial = Transform::new(0.25, 0.75, 1.5, 0.0);
        runtime
            .register_overlay(ElementId(1), ElementKind::Logo, Size::new(50.0, 50.0), initial)
            .unwrap();
        runtime
            .register_slot(
                ElementId(2),
                Size::new(300.0, 300.0),
                Size::new(600.0, 300.0),
                SlotCropAdjustment::new(1.0, 0.5, 0.5),
            )
            .unwrap();
        runtime.flush().unwrap();

        assert_eq!(runtime.live().transform(ElementId(1)), Some(initial));
        assert_eq!(
            runtime.live().adjustment(ElementId(2)),
            Some(SlotCropAdjustment::identity())
        );
        assert_eq!(runtime.live().adjustment(ElementId(1)), None);

        runtime.unregister(ElementId(1)).unwrap();
        runtime.flush().unwrap();
        assert_eq!(runtime.live().get(ElementId(1)), None);
    }

    #[test]
    fn test_delete_echo_unregisters() {
        let (runtime, mut app) = start(Size::new(800.0, 600.0));
        let mut scene = Scene::new();
        let id = scene.add_overlay(ElementKind::Text, Transform::default());
        runtime
            .register_overlay(id, ElementKind::Text, Size::new(80.0, 20.0), Transform::default())
            .unwrap();
        runtime.flush().unwrap();

        runtime.bridge().request_delete(id);
        assert_eq!(app.pump(&mut scene), 1);
        assert!(!scene.contains(id));

        runtime.flush().unwrap();
        assert_eq!(runtime.live().get(id), None);
    }

    #[test]
    fn test_send_after_shutdown_is_disconnected() {
        let (runtime, _app) = start(Size::new(100.0, 100.0));
        let sender = runtime.input_sender();
        runtime.shutdown();
        // The thread has exited and dropped its receiver.
        assert!(sender.send(GestureInput::CanvasResized(Size::new(1.0, 1.0))).is_err());
    }

    #[test]
    fn test_full_queue_is_reported_not_waited_on() {
        let (runtime, _app) = start(Size::new(100.0, 100.0));
        // Nobody reads this reply yet, so the thread parks on it.
        let (done_tx, done_rx) = crossbeam_channel::bounded(0);
        runtime.send(GestureInput::Flush(done_tx)).unwrap();

        let mut sent = 0;
        let full = loop {
            match runtime.resize_canvas(Size::new(10.0, 10.0)) {
                Ok(()) => sent += 1,
                Err(err) => break err,
            }
            assert!(sent <= GESTURE_QUEUE_CAPACITY + 1);
        };
        assert!(matches!(full, RuntimeError::QueueFull));

        done_rx.recv().unwrap();
        runtime.flush().unwrap();
    }

    fn stamped(t: u64) -> Duration {
        Duration::from_millis(t)
    }

    #[test]
    fn test_slot_geometry_change_reaches_manipulator() {
        let (runtime, _app) = start(Size::new(800.0, 600.0));
        let id = ElementId(3);
        runtime
            .register_slot(
                id,
                Size::new(400.0, 400.0),
                Size::new(800.0, 400.0),
                SlotCropAdjustment::new(2.0, 0.0, 0.0),
            )
            .unwrap();
        runtime
            .set_slot_geometry(id, Size::new(800.0, 800.0), Size::new(800.0, 400.0))
            .unwrap();
        runtime.touch(id, TouchEvent::down(1, Point::new(200.0, 200.0), stamped(0))).unwrap();
        runtime.touch(id, TouchEvent::moved(1, Point::new(320.0, 200.0), stamped(30))).unwrap();
        runtime.touch(id, TouchEvent::up(1, Point::new(320.0, 200.0), stamped(60))).unwrap();
        runtime.flush().unwrap();

        // 120 px over the 1200 px half excess of the larger slot.
        let live = runtime.live().adjustment(id).unwrap();
        assert!((live.translate_x - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_base_size_change_reaches_manipulator() {
        let (runtime, _app) = start(Size::new(1000.0, 1000.0));
        let id = ElementId(4);
        runtime
            .register_overlay(id, ElementKind::Logo, Size::new(100.0, 100.0), Transform::default())
            .unwrap();
        runtime.set_base_size(id, Size::new(400.0, 400.0)).unwrap();
        runtime.touch(id, TouchEvent::down(1, Point::new(500.0, 500.0), stamped(0))).unwrap();
        runtime.touch(id, TouchEvent::moved(1, Point::new(1500.0, 500.0), stamped(30))).unwrap();
        runtime.touch(id, TouchEvent::up(1, Point::new(1500.0, 500.0), stamped(60))).unwrap();
        runtime.flush().unwrap();

        let live = runtime.live().transform(id).unwrap();
        assert!((live.x - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let (runtime, _app) = start(Size::new(100.0, 100.0));
        let a = runtime.timestamp();
        let b = runtime.timestamp();
        assert!(b >= a);
    }
}
