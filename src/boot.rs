//! Boot dispatcher: decides, on every reset, whether to jump straight to
//! the non-secure application image or stay in the OTA-capable
//! supervisor loop.
//!
//! Runs before the memory protection unit is configured, so everything
//! here goes through [`BootPort`] rather than touching hardware directly.
//! Bringing the radio up far enough to receive commands happens here too,
//! via the same [`crate::ipc::call_network`] path the running supervisor
//! uses later, because the network core is released and spun up before
//! this function ever decides where to jump.

use core::hint::spin_loop;

use crate::config::DeviceConfig;
use crate::control_block::{ControlBlock, NetworkRequest};
use crate::ipc;
use crate::mailbox::Mailbox;
use crate::ports::BootPort;

/// Bits describing why the last reset happened, as read from the
/// hardware's reset-cause register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetCause {
    pub primary_watchdog: bool,
    pub secondary_watchdog: bool,
    pub power_on: bool,
}

impl ResetCause {
    pub const fn power_on() -> Self {
        Self {
            primary_watchdog: false,
            secondary_watchdog: false,
            power_on: true,
        }
    }
}

/// Where control goes after [`dispatch`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpTarget {
    /// Stay in the supervisor: the radio is already up and waiting for
    /// commands by the time this is returned.
    SupervisorLoop,
    /// Release the application core and jump non-secure.
    NonSecureApplication { entry_point: u32 },
}

/// Run the full reset-time bring-up sequence:
///
/// 1. Configure the secondary watchdog's hardware timeout (it is armed
///    later, only by the hardware-wired Stop line).
/// 2. Configure the MPU's secure/non-secure partition.
/// 3. Route non-secure interrupts unconditionally: needed whichever way
///    this function ultimately decides to go, since the network core's
///    interrupts live on the non-secure side regardless.
/// 4. Release the network core and wait for it to reach its own
///    ready signal.
/// 5. Bring the radio up to the configured channel and into receive mode
///    through the same request/ack discipline the supervisor loop uses,
///    so a command sent immediately after boot is never missed.
/// 6. Read and clear the reset-cause register. A watchdog reset of
///    either kind means the application image hung; stay in the
///    supervisor loop so the host can intervene. Any other cause
///    (power-on, or a supervisor-requested reset after a successful OTA
///    transfer) releases the application core and jumps non-secure.
pub fn dispatch(
    port: &mut impl BootPort,
    config: &DeviceConfig,
    block: &ControlBlock,
    mailbox: &Mailbox,
    entry_point: u32,
) -> JumpTarget {
    port.configure_secondary_watchdog(config.secondary_watchdog_timeout_ms);
    port.configure_mpu(
        config.secure_flash_region_bytes,
        config.secure_ram_region_bytes,
        config.nonsecure_callable_bytes,
    );
    port.route_nonsecure_interrupts();
    port.release_network_core();

    while !block.is_network_ready() {
        spin_loop();
    }

    ipc::call_network(block, mailbox, NetworkRequest::RadioInit, |_| {});
    ipc::call_network(block, mailbox, NetworkRequest::RadioSetChannel, |r| {
        r.channel = config.radio_channel;
    });
    ipc::call_network(block, mailbox, NetworkRequest::RadioRx, |_| {});

    let cause = port.read_and_clear_reset_cause();
    if cause.primary_watchdog || cause.secondary_watchdog {
        return JumpTarget::SupervisorLoop;
    }

    port.release_application_core(entry_point);
    JumpTarget::NonSecureApplication { entry_point }
}
