//! Cross-thread update bridge.
//!
//! The gesture thread holds a [`BridgeHandle`] for its whole lifetime and
//! reports commits and requests through it. The application thread owns the
//! matching [`AppBridge`], drains it with [`AppBridge::pump`], applies each
//! message to the [`Scene`] and hands the result to whatever handler is
//! currently installed in the corresponding [`LatestCallback`] cell.
//!
//! Handlers can be swapped at any time (every render, typically) without the
//! gesture thread ever seeing a new handle.
//!
//! Gesture commits carry a per-element revision. The scene remembers the
//! latest one it applied and every echo reports it, so the gesture thread can
//! tell an echo of an older commit from a newer external change.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use slotframe_gesture::{LatestCallback, LatestCallback0};

use crate::element::ElementId;
use crate::scene::Scene;
use crate::slot_crop::SlotCropAdjustment;
use crate::transform::{Transform, TransformPatch};

/// Message travelling from the gesture thread to the application thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BridgeMessage {
    /// A gesture on a free element ended
    TransformCommitted {
        id: ElementId,
        transform: Transform,
        revision: u64,
    },
    /// A crop gesture on a slot ended
    AdjustmentCommitted {
        id: ElementId,
        adjustment: SlotCropAdjustment,
        revision: u64,
    },
    /// External setter, funnelled through the commit path
    TransformSet {
        id: ElementId,
        patch: TransformPatch,
    },
    Selected(ElementId),
    Deselected,
    DeleteRequested(ElementId),
    DuplicateRequested(ElementId),
}

/// Authoritative value echoed back to the gesture thread after `pump`
/// applied it, so the next gesture starts from a fresh baseline.
///
/// `revision` is the latest gesture commit the model had applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelSync {
    Transform {
        id: ElementId,
        transform: Transform,
        revision: u64,
    },
    Adjustment {
        id: ElementId,
        adjustment: SlotCropAdjustment,
        revision: u64,
    },
    Removed(ElementId),
}

/// Create a connected handle / application bridge pair.
pub fn bridge() -> (BridgeHandle, AppBridge) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (BridgeHandle { sender }, AppBridge::new(receiver))
}

/// Gesture-thread end of the bridge. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    sender: Sender<BridgeMessage>,
}

impl BridgeHandle {
    /// Send a message; a closed application side is logged, never fatal.
    fn send(&self, message: BridgeMessage) -> bool {
        match self.sender.send(message) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("application bridge closed, dropping {:?}", err.into_inner());
                false
            }
        }
    }

    pub fn commit_transform(&self, id: ElementId, transform: Transform, revision: u64) -> bool {
        self.send(BridgeMessage::TransformCommitted {
            id,
            transform,
            revision,
        })
    }

    pub fn commit_adjustment(
        &self,
        id: ElementId,
        adjustment: SlotCropAdjustment,
        revision: u64,
    ) -> bool {
        self.send(BridgeMessage::AdjustmentCommitted {
            id,
            adjustment,
            revision,
        })
    }

    /// Set part of a transform from outside any gesture (a panel slider, say).
    pub fn set_transform(&self, id: ElementId, patch: TransformPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        self.send(BridgeMessage::TransformSet { id, patch })
    }

    pub fn select(&self, id: ElementId) -> bool {
        self.send(BridgeMessage::Selected(id))
    }

    pub fn deselect(&self) -> bool {
        self.send(BridgeMessage::Deselected)
    }

    pub fn request_delete(&self, id: ElementId) -> bool {
        self.send(BridgeMessage::DeleteRequested(id))
    }

    pub fn request_duplicate(&self, id: ElementId) -> bool {
        self.send(BridgeMessage::DuplicateRequested(id))
    }

    /// Whether two handles feed the same application bridge.
    pub fn same_channel(&self, other: &BridgeHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }
}

/// Application-thread end of the bridge.
pub struct AppBridge {
    receiver: Receiver<BridgeMessage>,
    sync: Option<Sender<ModelSync>>,

    /// `(id, clamped transform)` after a commit or external set
    pub on_transform_change: LatestCallback<(ElementId, Transform)>,
    /// `(id, clamped adjustment)` after a crop commit
    pub on_adjustment_change: LatestCallback<(ElementId, SlotCropAdjustment)>,
    pub on_select: LatestCallback<ElementId>,
    pub on_deselect: LatestCallback0,
    /// Id of the element that was removed
    pub on_delete: LatestCallback<ElementId>,
    /// `(source, copy)`
    pub on_duplicate: LatestCallback<(ElementId, ElementId)>,
}

impl AppBridge {
    fn new(receiver: Receiver<BridgeMessage>) -> Self {
        Self {
            receiver,
            sync: None,
            on_transform_change: LatestCallback::new(),
            on_adjustment_change: LatestCallback::new(),
            on_select: LatestCallback::new(),
            on_deselect: LatestCallback0::new(),
            on_delete: LatestCallback::new(),
            on_duplicate: LatestCallback::new(),
        }
    }

    /// Echo applied values into the gesture thread's sync queue.
    pub fn connect_sync(&mut self, sender: Sender<ModelSync>) {
        self.sync = Some(sender);
    }

    fn echo(&self, sync: ModelSync) {
        let Some(sender) = &self.sync else {
            return;
        };
        match sender.try_send(sync) {
            Ok(()) => {}
            Err(TrySendError::Full(sync)) => {
                log::warn!("gesture sync queue full, dropping {:?}", sync);
            }
            Err(TrySendError::Disconnected(sync)) => {
                log::debug!("gesture thread gone, sync {:?} dropped", sync);
            }
        }
    }

    /// Drain every pending message into `scene`. Returns how many were
    /// processed. Never blocks.
    pub fn pump(&mut self, scene: &mut Scene) -> usize {
        let mut processed = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.apply(scene, message);
                    processed += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::debug!("all bridge handles dropped");
                    break;
                }
            }
        }
        processed
    }

    fn apply(&self, scene: &mut Scene, message: BridgeMessage) {
        match message {
            BridgeMessage::TransformCommitted {
                id,
                transform,
                revision,
            } => {
                if let Some(applied) = scene.apply_transform(id, transform) {
                    log::info!("transform committed for {}: {:?}", id, applied);
                    scene.acknowledge(id, revision);
                    self.echo(ModelSync::Transform {
                        id,
                        transform: applied,
                        revision,
                    });
                    self.on_transform_change.call((id, applied));
                }
            }
            BridgeMessage::TransformSet { id, patch } => {
                if let Some(applied) = scene.apply_patch(id, &patch) {
                    log::info!("transform set for {}: {:?}", id, applied);
                    self.echo(ModelSync::Transform {
                        id,
                        transform: applied,
                        revision: scene.revision(id).unwrap_or(0),
                    });
                    self.on_transform_change.call((id, applied));
                }
            }
            BridgeMessage::AdjustmentCommitted {
                id,
                adjustment,
                revision,
            } => {
                if let Some(applied) = scene.apply_adjustment(id, adjustment) {
                    log::info!("crop committed for {}: {:?}", id, applied);
                    scene.acknowledge(id, revision);
                    self.echo(ModelSync::Adjustment {
                        id,
                        adjustment: applied,
                        revision,
                    });
                    self.on_adjustment_change.call((id, applied));
                }
            }
            BridgeMessage::Selected(id) => {
                if scene.select(id) {
                    self.on_select.call(id);
                }
            }
            BridgeMessage::Deselected => {
                if scene.deselect() {
                    self.on_deselect.emit();
                }
            }
            BridgeMessage::DeleteRequested(id) => {
                if scene.remove(id) {
                    self.echo(ModelSync::Removed(id));
                    self.on_delete.call(id);
                }
            }
            BridgeMessage::DuplicateRequested(id) => {
                if let Some(copy) = scene.duplicate(id) {
                    self.on_duplicate.call((id, copy));
                }
            }
        }
    }
}

impl std::fmt::Debug for AppBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBridge")
            .field("pending", &self.receiver.len())
            .field("sync_connected", &self.sync.is_some())
            .finish()
    }
}
