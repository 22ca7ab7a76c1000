//! The shared-memory control block: the only data visible to both cores.
//!
//! Scalar signaling fields (`net_ready`, `net_ack`, `command_ready`,
//! `stop_acked`, `status`) are bare atomics so either core can poll them
//! without taking a lock. Everything with real structure sits behind its
//! own `critical_section::Mutex`, so a read of the radio subrecord doesn't
//! block a write to the log buffer.
//!
//! Three independent handshakes share this block, and keeping them on
//! separate fields matters: conflating any two of them means a stop
//! acknowledgement could be mistaken for a radio request ack, or a
//! boot-time request could race a user command.
//!
//! - `net_ready`/`net_ack` + [`NetworkRequest`]: the supervisor-to-network
//!   RPC discipline (§4.3) used for every radio/RNG operation.
//! - `command_ready` + [`crate::wire::CommandFrame`]: the network-to-
//!   supervisor handoff of a decoded command frame.
//! - `stop_acked`: the application core's own "I have stopped" signal,
//!   unrelated to either of the above.
//!
//! # Safety
//! `ControlBlock` is placed in a statically allocated, non-cacheable
//! region shared by both cores at link time; nothing here enforces that
//! placement; it is the boot dispatcher's responsibility.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use critical_section::Mutex;
use heapless::Vec;

use crate::wire::{CommandFrame, MAX_LOG_LEN};

/// Device status byte reported in `Status` notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ready = 0,
    Running = 1,
    Stopping = 2,
    Programming = 3,
}

impl Status {
    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Running,
            2 => Self::Stopping,
            3 => Self::Programming,
            _ => Self::Ready,
        }
    }
}

/// Maximum payload either direction of a radio subrecord carries in one
/// request. Sized to the protocol's largest frame, an `OtaChunk`.
pub const MAX_PDU_LEN: usize = 256;

/// One request the supervisor (or the boot dispatcher) can ask the
/// network core to perform on its behalf. The network core is the only
/// code that ever touches the radio or RNG hardware directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkRequest {
    RadioInit,
    RadioSetFrequency,
    RadioSetChannel,
    RadioSetAddress,
    RadioRx,
    RadioDisable,
    RadioTx,
    RadioRssi,
    RngInit,
    RngRead,
    TdmaClientInit,
    TdmaClientSetTable,
    TdmaClientGetTable,
    TdmaClientTx,
    TdmaClientFlush,
    TdmaClientEmpty,
    TdmaClientStatus,
}

/// The radio-facing half of a network request/response: populated by the
/// requester before the request is raised, and by the network core before
/// the acknowledgement is raised.
#[derive(Debug, Clone, Default)]
pub struct RadioSubrecord {
    pub channel: u8,
    pub frequency_mhz: u16,
    pub address: u64,
    pub tx_pdu: Vec<u8, MAX_PDU_LEN>,
    pub rx_pdu: Vec<u8, MAX_PDU_LEN>,
    pub rssi: i8,
    /// Also doubles as the TDMA client's registration/empty-queue flag,
    /// depending on which request last populated it.
    pub registration_state: bool,
    pub tdma_table: Vec<u8, MAX_PDU_LEN>,
    pub tdma_status: u8,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RngSubrecord {
    pub value: u32,
}

/// Control block shared between the supervisor core and the network core.
/// One instance lives in shared RAM for the life of the device.
pub struct ControlBlock {
    /// Set once by the network core after its own init sequence
    /// completes. The boot dispatcher spins on this before issuing the
    /// first radio request.
    net_ready: AtomicBool,
    /// Supervisor→network request pending.
    network_request_pending: AtomicBool,
    /// Network core has finished servicing the pending request.
    net_ack: AtomicBool,
    /// Network→supervisor: a decoded command frame is waiting.
    command_ready: AtomicBool,
    /// Application core has acknowledged a stop request.
    stop_acked: AtomicBool,
    status: AtomicU8,
    request: Mutex<RefCell<Option<NetworkRequest>>>,
    radio: Mutex<RefCell<RadioSubrecord>>,
    rng: Mutex<RefCell<RngSubrecord>>,
    command: Mutex<RefCell<Option<CommandFrame>>>,
    log_buf: Mutex<RefCell<Vec<u8, MAX_LOG_LEN>>>,
}

impl ControlBlock {
    pub const fn new() -> Self {
        Self {
            net_ready: AtomicBool::new(false),
            network_request_pending: AtomicBool::new(false),
            net_ack: AtomicBool::new(false),
            command_ready: AtomicBool::new(false),
            stop_acked: AtomicBool::new(false),
            status: AtomicU8::new(Status::Ready as u8),
            request: Mutex::new(RefCell::new(None)),
            radio: Mutex::new(RefCell::new(RadioSubrecord::new())),
            rng: Mutex::new(RefCell::new(RngSubrecord { value: 0 })),
            command: Mutex::new(RefCell::new(None)),
            log_buf: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    pub fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn set_status(&self, status: Status) {
        self.status.store(status as u8, Ordering::Release);
    }

    // ── network readiness ───────────────────────────────────────────

    pub fn set_network_ready(&self) {
        self.net_ready.store(true, Ordering::Release);
    }

    pub fn is_network_ready(&self) -> bool {
        self.net_ready.load(Ordering::Acquire)
    }

    // ── supervisor → network radio/RNG RPC ──────────────────────────

    /// Latch a new network request and signal the network core. Called by
    /// the requesting side (boot dispatcher, gateway, or supervisor) after
    /// it has populated the radio/RNG subrecord.
    pub fn submit_network_request(
        &self,
        cs: critical_section::CriticalSection<'_>,
        request: NetworkRequest,
    ) {
        self.request.borrow(cs).replace(Some(request));
        self.net_ack.store(false, Ordering::Release);
        self.network_request_pending.store(true, Ordering::Release);
    }

    /// Take the pending request if one is latched, clearing the pending
    /// flag. Called by the network core.
    pub fn take_network_request(
        &self,
        cs: critical_section::CriticalSection<'_>,
    ) -> Option<NetworkRequest> {
        if !self.network_request_pending.swap(false, Ordering::AcqRel) {
            return None;
        }
        self.request.borrow(cs).take()
    }

    /// Mark the latched request serviced. The requesting side spins on this.
    pub fn acknowledge_network_request(&self) {
        self.net_ack.store(true, Ordering::Release);
    }

    /// Block until the network core acknowledges the pending request,
    /// then clear the acknowledgement so it is never observed twice.
    pub fn wait_for_network_ack(&self) {
        while !self.net_ack.swap(false, Ordering::AcqRel) {
            core::hint::spin_loop();
        }
    }

    pub fn with_radio<T>(
        &self,
        cs: critical_section::CriticalSection<'_>,
        f: impl FnOnce(&mut RadioSubrecord) -> T,
    ) -> T {
        f(&mut self.radio.borrow(cs).borrow_mut())
    }

    pub fn with_rng<T>(
        &self,
        cs: critical_section::CriticalSection<'_>,
        f: impl FnOnce(&mut RngSubrecord) -> T,
    ) -> T {
        f(&mut self.rng.borrow(cs).borrow_mut())
    }

    // ── network → supervisor command handoff ────────────────────────

    /// Latch a decoded command frame for the supervisor. Called by the
    /// network core once it has classified an inbound frame as a command.
    pub fn submit_command(&self, cs: critical_section::CriticalSection<'_>, frame: CommandFrame) {
        self.command.borrow(cs).replace(Some(frame));
        self.command_ready.store(true, Ordering::Release);
    }

    /// Take the pending command if one is latched, clearing the flag.
    /// Called by the supervisor.
    pub fn take_command(&self, cs: critical_section::CriticalSection<'_>) -> Option<CommandFrame> {
        if !self.command_ready.swap(false, Ordering::AcqRel) {
            return None;
        }
        self.command.borrow(cs).take()
    }

    // ── application-core stop handshake ──────────────────────────────

    /// Mark the requested stop handled. Called by the application core.
    pub fn acknowledge_stop(&self) {
        self.stop_acked.store(true, Ordering::Release);
    }

    /// Consume the stop acknowledgement flag. Called by the supervisor
    /// once it has acted on it, so a single acknowledgement is never
    /// observed twice.
    pub fn take_stop_acknowledgement(&self) -> bool {
        self.stop_acked.swap(false, Ordering::AcqRel)
    }

    pub fn append_log(&self, cs: critical_section::CriticalSection<'_>, bytes: &[u8]) {
        let mut buf = self.log_buf.borrow(cs).borrow_mut();
        let room = buf.capacity() - buf.len();
        let take = bytes.len().min(room);
        let _ = buf.extend_from_slice(&bytes[..take]);
    }

    pub fn drain_log(&self, cs: critical_section::CriticalSection<'_>) -> Vec<u8, MAX_LOG_LEN> {
        self.log_buf.borrow(cs).replace(Vec::new())
    }
}

impl RadioSubrecord {
    const fn new() -> Self {
        Self {
            channel: 0,
            frequency_mhz: 0,
            address: 0,
            tx_pdu: Vec::new(),
            rx_pdu: Vec::new(),
            rssi: 0,
            registration_state: false,
            tdma_table: Vec::new(),
            tdma_status: 0,
        }
    }
}

impl Default for ControlBlock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: every field is either a bare atomic or guarded by a
// `critical_section::Mutex`, both of which are already `Sync`.
unsafe impl Sync for ControlBlock {}
