//! Function-pointer finite state machine engine, command-driven rather
//! than tick-driven: the engine advances only when a [`Command`] arrives,
//! never on a timer.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌─────────────┬───────────┬──────────┬────────────────┐ │
//! │  │ StateId      │ on_enter  │ on_exit  │ on_command     │ │
//! │  ├─────────────┼───────────┼──────────┼────────────────┤ │
//! │  │ Ready        │ fn(ctx)   │ fn(ctx)  │ fn(ctx,cmd)->Id│ │
//! │  │ Running      │ fn(ctx)   │ fn(ctx)  │ fn(ctx,cmd)->Id│ │
//! │  │ Stopping     │ fn(ctx)   │ fn(ctx)  │ fn(ctx,cmd)->Id│ │
//! │  │ Programming  │ fn(ctx)   │ fn(ctx)  │ fn(ctx,cmd)->Id│ │
//! │  └─────────────┴───────────┴──────────┴────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each `on_command` call runs against the **current** state. If it
//! returns a different `StateId`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the current
//! pointer. Every handler receives `&mut SupervisorContext`, which
//! accumulates the notification and effects the caller should act on.

pub mod context;
pub mod states;

use context::SupervisorContext;
use log::info;

use crate::wire::{CHUNK_SIZE, HASH_LEN};

/// One request the supervisor can act on, already stripped of its outer
/// wire framing and routing target.
#[derive(Debug, Clone, Copy)]
pub enum Command {
    Status,
    Start,
    Stop,
    OtaStart {
        image_size: u32,
        chunk_count: u32,
        hash: [u8; HASH_LEN],
    },
    OtaChunk {
        index: u32,
        chunk_size: u8,
        chunk: [u8; CHUNK_SIZE],
    },
    /// Internal: the application core has finished stopping its
    /// experiment. Not produced from a wire frame.
    StopAcked,
}

/// Identity of a supervisor state. Must stay in sync with the state
/// table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Ready = 0,
    Running = 1,
    Stopping = 2,
    Programming = 3,
}

impl StateId {
    pub const COUNT: usize = 4;

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Ready,
            1 => Self::Running,
            2 => Self::Stopping,
            3 => Self::Programming,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Ready
            }
        }
    }
}

/// Signature for `on_enter` / `on_exit` actions; run exactly once per
/// transition.
pub type StateActionFn = fn(&mut SupervisorContext);

/// Signature for the per-command handler. Returns the state to move to,
/// which may be the same state the handler was called in.
pub type StateCommandFn = fn(&mut SupervisorContext, Command) -> StateId;

/// Static descriptor for a single state, stored in a fixed-size array.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_command: StateCommandFn,
}

/// The finite state machine engine.
pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state. Call once after
    /// construction, before the first `handle`.
    pub fn start(&mut self, ctx: &mut SupervisorContext) {
        info!("supervisor starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Dispatch one command against the current state.
    pub fn handle(&mut self, ctx: &mut SupervisorContext, command: Command) {
        let next = (self.table[self.current].on_command)(ctx, command);
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut SupervisorContext) {
        let next_idx = next_id as usize;
        info!(
            "supervisor transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
