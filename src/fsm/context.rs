//! Blackboard shared by every state handler.

use heapless::Vec;

use crate::control_block::Status;
use crate::device_id::DeviceId;
use crate::ota::{OtaSession, Sha2HashPort};
use crate::wire::NotificationFrame;

/// A side effect a state handler wants performed outside the FSM itself.
/// The caller (the network-service loop) drains and executes these after
/// each command, in order.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    RaiseStartExperiment,
    RaiseStop,
    EraseNonSecureFlash,
    WriteChunk { offset: u32, index: u32 },
    RequestReset,
}

/// Mutable state threaded through one command dispatch.
pub struct SupervisorContext {
    pub device_id: DeviceId,
    pub status: Status,
    pub ota: Option<OtaSession<Sha2HashPort>>,
    pub pending_notification: Option<NotificationFrame>,
    pub pending_effects: Vec<Effect, 4>,
    /// The most recently applied chunk's raw bytes, held just long enough
    /// for the caller to perform the flash write the state handler asked
    /// for via [`Effect::WriteChunk`].
    pub pending_chunk: Option<[u8; crate::wire::CHUNK_SIZE]>,
}

impl SupervisorContext {
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            status: Status::Ready,
            ota: None,
            pending_notification: None,
            pending_effects: Vec::new(),
            pending_chunk: None,
        }
    }

    pub fn notify(&mut self, frame: NotificationFrame) {
        self.pending_notification = Some(frame);
    }

    /// Push an effect. Silently drops it if the (small, fixed) effect
    /// queue is full, which should never happen given one command
    /// produces at most two effects.
    pub fn push_effect(&mut self, effect: Effect) {
        let _ = self.pending_effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<Effect, 4> {
        core::mem::take(&mut self.pending_effects)
    }
}
