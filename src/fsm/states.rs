//! Concrete state handlers and table builder.
//!
//! ```text
//!  READY ──[Start]──▶ RUNNING ──[Stop]──▶ STOPPING ──[StopAcked]──▶ READY
//!    │                                                                ▲
//!    └──[OtaStart]──▶ PROGRAMMING ──[final OtaChunk]─────────────────┘
//! ```
//!
//! `Status` is accepted in every state without a transition. Commands
//! that don't apply to the current state (`Start` while already
//! `Running`, an `OtaChunk` with no session open, and so on) are dropped
//! silently; no notification is raised for them.

use log::{info, warn};

use super::context::{Effect, SupervisorContext};
use super::{Command, StateDescriptor, StateId};
use crate::control_block::Status;
use crate::ota::{ChunkOutcome, OtaSession, Sha2HashPort};
use crate::wire::NotificationFrame;

pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Ready,
            name: "Ready",
            on_enter: Some(ready_enter),
            on_exit: None,
            on_command: ready_command,
        },
        StateDescriptor {
            id: StateId::Running,
            name: "Running",
            on_enter: Some(running_enter),
            on_exit: None,
            on_command: running_command,
        },
        StateDescriptor {
            id: StateId::Stopping,
            name: "Stopping",
            on_enter: None,
            on_exit: None,
            on_command: stopping_command,
        },
        StateDescriptor {
            id: StateId::Programming,
            name: "Programming",
            on_enter: None,
            on_exit: Some(programming_exit),
            on_command: programming_command,
        },
    ]
}

fn status_notification(ctx: &SupervisorContext) -> NotificationFrame {
    NotificationFrame::Status {
        device_id: ctx.device_id,
        status: ctx.status as u8,
    }
}

// ── Ready ────────────────────────────────────────────────────────────

fn ready_enter(ctx: &mut SupervisorContext) {
    ctx.status = Status::Ready;
    info!("READY");
}

fn ready_command(ctx: &mut SupervisorContext, command: Command) -> StateId {
    match command {
        Command::Status | Command::Stop => {
            ctx.notify(status_notification(ctx));
            StateId::Ready
        }
        Command::Start => {
            ctx.push_effect(Effect::RaiseStartExperiment);
            StateId::Running
        }
        Command::OtaStart {
            image_size,
            chunk_count,
            hash,
        } => match OtaSession::begin(image_size, chunk_count, &hash, Sha2HashPort::default()) {
            Ok(session) => {
                ctx.ota = Some(session);
                ctx.push_effect(Effect::EraseNonSecureFlash);
                ctx.notify(NotificationFrame::OtaStartAck {
                    device_id: ctx.device_id,
                });
                StateId::Programming
            }
            Err(err) => {
                warn!("rejected OtaStart: {err}");
                StateId::Ready
            }
        },
        Command::OtaChunk { .. } | Command::StopAcked => StateId::Ready,
    }
}

// ── Running ──────────────────────────────────────────────────────────

fn running_enter(ctx: &mut SupervisorContext) {
    ctx.status = Status::Running;
    ctx.notify(status_notification(ctx));
    info!("RUNNING");
}

fn running_command(ctx: &mut SupervisorContext, command: Command) -> StateId {
    match command {
        Command::Status | Command::Start => {
            ctx.notify(status_notification(ctx));
            StateId::Running
        }
        Command::Stop => {
            ctx.push_effect(Effect::RaiseStop);
            StateId::Stopping
        }
        Command::OtaStart { .. } | Command::OtaChunk { .. } | Command::StopAcked => {
            StateId::Running
        }
    }
}

// ── Stopping ─────────────────────────────────────────────────────────

fn stopping_command(ctx: &mut SupervisorContext, command: Command) -> StateId {
    match command {
        Command::Status => {
            ctx.notify(status_notification(ctx));
            StateId::Stopping
        }
        Command::StopAcked => StateId::Ready,
        Command::Start | Command::Stop | Command::OtaStart { .. } | Command::OtaChunk { .. } => {
            StateId::Stopping
        }
    }
}

// ── Programming ──────────────────────────────────────────────────────

fn programming_command(ctx: &mut SupervisorContext, command: Command) -> StateId {
    match command {
        Command::Status => {
            ctx.notify(status_notification(ctx));
            StateId::Programming
        }
        Command::OtaChunk {
            index,
            chunk_size: _,
            chunk,
        } => {
            let Some(mut session) = ctx.ota.take() else {
                return StateId::Programming;
            };
            let result = session.apply_chunk(index, &chunk, |offset, data| {
                ctx.pending_chunk = Some(*data);
                ctx.push_effect(Effect::WriteChunk { offset, index });
            });

            match result {
                Ok(outcome) => {
                    ctx.notify(NotificationFrame::OtaChunkAck {
                        device_id: ctx.device_id,
                        index,
                    });
                    match outcome {
                        ChunkOutcome::Applied | ChunkOutcome::AlreadyApplied => {
                            ctx.ota = Some(session);
                            StateId::Programming
                        }
                        ChunkOutcome::Final { .. } => {
                            ctx.push_effect(Effect::RequestReset);
                            StateId::Ready
                        }
                    }
                }
                Err(err) => {
                    warn!("rejected OtaChunk {index}: {err}");
                    ctx.ota = Some(session);
                    StateId::Programming
                }
            }
        }
        Command::Start | Command::Stop | Command::OtaStart { .. } | Command::StopAcked => {
            StateId::Programming
        }
    }
}

fn programming_exit(ctx: &mut SupervisorContext) {
    ctx.ota = None;
    ctx.pending_chunk = None;
    info!("PROGRAMMING: transfer finished");
}
