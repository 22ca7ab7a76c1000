//! Supervisor core entry point.
//!
//! Wires the boot dispatcher to the network service loop. The concrete
//! radio, flash, and MPU/core-release implementations belong to the
//! board support package for the target chip; this file only shows the
//! shape real firmware wires them into, not a working driver stack.

#![no_std]
#![no_main]

use panic_halt as _;

use swarmit_supervisor::boot::{self, JumpTarget, ResetCause};
use swarmit_supervisor::config::DeviceConfig;
use swarmit_supervisor::control_block::ControlBlock;
use swarmit_supervisor::device_id::DeviceId;
use swarmit_supervisor::mailbox::Mailbox;
use swarmit_supervisor::ports::BootPort;
use swarmit_supervisor::watchdog::PrimaryWatchdog;

/// Entry point for the application image the boot dispatcher jumps to.
/// Supplied by the board support package at link time.
const APPLICATION_ENTRY_POINT: u32 = 0x0800_0000;

static CONTROL_BLOCK: ControlBlock = ControlBlock::new();
static MAILBOX: Mailbox = Mailbox::new();

/// Board-specific MPU configuration, interrupt routing, and core release.
/// A real board support package replaces this with register-level code;
/// kept here only to show where it plugs in.
struct Board;

impl BootPort for Board {
    fn configure_secondary_watchdog(&mut self, _timeout_ms: u32) {}

    fn configure_mpu(&mut self, _secure_flash_bytes: u32, _secure_ram_bytes: u32, _nsc_bytes: u32) {}

    fn route_nonsecure_interrupts(&mut self) {}

    fn release_network_core(&mut self) {}

    fn read_and_clear_reset_cause(&mut self) -> ResetCause {
        ResetCause::power_on()
    }

    fn release_application_core(&mut self, _entry_point: u32) {}

    fn jump_nonsecure(&mut self, entry_point: u32) -> ! {
        // SAFETY: the caller guarantees `entry_point` is a validated
        // non-secure vector table after `configure_mpu` has run.
        unsafe {
            let reset_handler = *((entry_point + 4) as *const u32) as *const ();
            let reset_fn: extern "C" fn() -> ! = core::mem::transmute(reset_handler);
            reset_fn()
        }
    }

    fn read_device_id(&self) -> DeviceId {
        swarmit_supervisor::device_id::read_factory_id()
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    let config = DeviceConfig::default();
    if let Err(err) = config.validate() {
        log::error!("rejected device config: {err}");
    }

    let mut board = Board;
    let _watchdog = PrimaryWatchdog::new(config.primary_watchdog_timeout_ms);

    match boot::dispatch(&mut board, &config, &CONTROL_BLOCK, &MAILBOX, APPLICATION_ENTRY_POINT) {
        JumpTarget::NonSecureApplication { entry_point } => board.jump_nonsecure(entry_point),
        JumpTarget::SupervisorLoop => {
            // The radio and flash adapters the supervisor needs are
            // board-specific and constructed by the board support
            // package; this loop is where it would call
            // `Supervisor::poll` in a cycle alongside watchdog pets.
            loop {
                cortex_m::asm::wfi();
            }
        }
    }
}
