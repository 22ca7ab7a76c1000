//! Inter-core mailbox: one coalescing, edge-triggered signal per event
//! kind, not a queue. Raising the same channel twice before it is taken
//! is indistinguishable from raising it once — callers that need counts
//! must track them in the control block's own data, not here.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// One named wake-up line between the two cores.
pub struct Channel {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Channel {
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Raise the edge. Idempotent: raising an already-raised channel is a
    /// no-op from the reader's point of view.
    pub fn raise(&self) {
        self.signal.signal(());
    }

    /// Poll for the edge, clearing it if present. Never blocks.
    pub fn take(&self) -> bool {
        if self.signal.signaled() {
            self.signal.reset();
            true
        } else {
            false
        }
    }

    /// Peek at the edge without clearing it. Used by tests that need to
    /// wait for a background thread to raise a channel before driving the
    /// side that would otherwise consume it.
    pub fn signaled(&self) -> bool {
        self.signal.signaled()
    }
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

/// All mailbox lines shared between the two cores.
pub struct Mailbox {
    /// The network core has classified an inbound frame as a command and
    /// latched it into the control block for the supervisor to take.
    pub command: Channel,
    /// A supervisor→network request has been latched; the network core
    /// should service it.
    pub network_request: Channel,
    /// `OtaStart` accepted; the application core should prepare flash.
    pub ota_start: Channel,
    /// Hardware-wired stop line; arms the secondary watchdog.
    pub stop: Channel,
    /// `Start` accepted; the application core should begin its experiment.
    pub start_experiment: Channel,
    /// New bytes are waiting in the shared log buffer, raised by
    /// `gateway::log_data` and consumed by the supervisor's log-forwarding
    /// step.
    pub log_event: Channel,
    /// The network core has copied a received user-data frame into the
    /// radio subrecord's rx buffer; the user image observes this edge
    /// directly, the supervisor never sees it.
    pub radio_rx: Channel,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            command: Channel::new(),
            network_request: Channel::new(),
            ota_start: Channel::new(),
            stop: Channel::new(),
            start_experiment: Channel::new(),
            log_event: Channel::new(),
            radio_rx: Channel::new(),
        }
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
