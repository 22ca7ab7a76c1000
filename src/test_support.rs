//! Host-test-only stand-in for the network core.
//!
//! Several code paths (`boot::dispatch`, `ipc::call_network`) block until
//! the network core answers through the control block. On real hardware
//! that answer comes from the second core running concurrently; in a
//! single-threaded host test it has to come from somewhere else, or the
//! test hangs forever. `simulate_network_core` runs that responder loop on
//! a spawned OS thread via `std::thread::scope`, so tests exercise the
//! real blocking discipline instead of a shortcut around it.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::control_block::{ControlBlock, NetworkRequest};
use crate::mailbox::Mailbox;

/// Service network requests until `stop` is set. Sets the rng subrecord's
/// `value` to 42 on `RngRead` so tests have something observable to
/// assert on without a real RNG peripheral.
pub(crate) fn simulate_network_core(block: &ControlBlock, mailbox: &Mailbox, stop: &AtomicBool) {
    block.set_network_ready();
    while !stop.load(Ordering::Relaxed) {
        if mailbox.network_request.take() {
            if let Some(request) = critical_section::with(|cs| block.take_network_request(cs)) {
                if request == NetworkRequest::RngRead {
                    critical_section::with(|cs| block.with_rng(cs, |r| r.value = 42));
                }
            }
            block.acknowledge_network_request();
        }
        std::thread::yield_now();
    }
}
