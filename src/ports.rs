//! External collaborator boundaries.
//!
//! Everything that touches real silicon (the radio, a TDMA MAC sitting on
//! top of it, flash, a hardware hash peripheral, a hardware RNG, the MPU
//! and core-release sequence) is reached through one of these traits. The
//! real implementations live with the board support package outside this
//! crate; host tests supply mocks.

use crate::boot::ResetCause;
use crate::device_id::DeviceId;

/// Send and receive whole radio frames. A frame includes the outer wire
/// header; this trait does no parsing of its own.
///
/// The `tdma_*` methods stand in for the external TDMA MAC library some
/// boards layer on top of the raw radio; a plain-radio board simply keeps
/// the default implementations, which fall back to the non-TDMA path.
pub trait RadioPort {
    type Error;

    /// One-time radio bring-up. Called once during boot, before any other
    /// method.
    fn init(&mut self) -> Result<(), Self::Error>;

    fn set_frequency(&mut self, frequency_mhz: u16) -> Result<(), Self::Error>;

    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Program the radio's own hardware address filter.
    fn set_address(&mut self, address: u64) -> Result<(), Self::Error>;

    /// Transmit one frame. Returns once the frame has been handed to the
    /// radio hardware, not once it has been acknowledged over the air.
    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Non-blocking receive. Returns `Ok(None)` if no frame is pending.
    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Power the radio down between transfers.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Received signal strength of the last received frame, in dBm.
    fn rssi(&mut self) -> Result<i8, Self::Error>;

    /// Bring up the TDMA client role. Out of scope for this crate: the
    /// default implementation is a no-op, appropriate for a board that
    /// doesn't run the TDMA MAC at all.
    fn tdma_init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Install a new slot table pushed down by the coordinator.
    fn tdma_set_table(&mut self, _table: &[u8]) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Read back the currently installed slot table.
    fn tdma_get_table(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }

    /// Queue a frame for transmission in the client's next assigned slot.
    /// Defaults to an immediate [`RadioPort::send`] for boards with no
    /// TDMA scheduling of their own.
    fn tdma_tx(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.send(frame)
    }

    /// Block until every queued TDMA frame has gone out.
    fn tdma_flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn tdma_is_empty(&mut self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    /// Opaque client status byte, board-defined.
    fn tdma_status(&mut self) -> Result<u8, Self::Error> {
        Ok(0)
    }
}

/// Security note: flash writes below the non-secure boundary must never
/// be reachable through this trait from non-secure calling code; the
/// gateway enforces that before a `FlashPort` method is ever invoked.
pub trait FlashPort {
    type Error;

    fn erase_nonsecure_region(&mut self) -> Result<(), Self::Error>;

    /// Write `data` at the non-secure-relative `offset`. The offset is
    /// relative to the start of the non-secure flash region, not the
    /// chip's absolute flash base.
    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error>;
}

/// Streaming hash accumulator, used for OTA image verification. Hardware
/// implementations back this with a SHA-256 peripheral; host tests and
/// boards without one use a software accumulator.
pub trait HashPort {
    fn init(&mut self);

    fn update(&mut self, data: &[u8]);

    /// Consume the accumulator and return the digest. The port is left
    /// freshly initialised, ready for the next transfer.
    fn finalize(&mut self) -> [u8; 32];
}

/// True hardware random numbers, used to seed anything that must not be
/// predictable from outside the device (not otherwise specified by this
/// crate's own logic, which has no such need today).
pub trait RngPort {
    fn init(&mut self);

    fn read(&mut self) -> u32;
}

/// The handful of steps the boot dispatcher performs that this crate has
/// no portable way to express: watchdog/MPU register programming,
/// interrupt target assignment, and releasing the other core at a given
/// entry point.
///
/// Security note: a `BootPort` implementation is the only code allowed to
/// run before the MPU is configured; everything downstream of `dispatch`
/// assumes the secure/non-secure boundary is already enforced.
pub trait BootPort {
    /// Arm the secondary watchdog at `timeout_ms`. Armed once, at boot;
    /// never reloaded from non-secure code.
    fn configure_secondary_watchdog(&mut self, timeout_ms: u32);

    /// Program the MPU so that only `[0, secure_flash_bytes)` and
    /// `[0, secure_ram_bytes)` are secure-accessible, with a
    /// non-secure-callable window of `nsc_bytes` at the top of the secure
    /// flash region.
    fn configure_mpu(&mut self, secure_flash_bytes: u32, secure_ram_bytes: u32, nsc_bytes: u32);

    /// Route interrupts needed by the non-secure image to non-secure state.
    fn route_nonsecure_interrupts(&mut self);

    /// Release the network core from its boot-time force-off so it can
    /// start running its own init sequence.
    fn release_network_core(&mut self);

    /// Read the hardware reset-cause register and clear it, so the next
    /// reset is unambiguous.
    fn read_and_clear_reset_cause(&mut self) -> ResetCause;

    /// Release the application core to begin executing at `entry_point`.
    fn release_application_core(&mut self, entry_point: u32);

    /// Jump non-secure to the image at `entry_point`. Does not return.
    fn jump_nonsecure(&mut self, entry_point: u32) -> !;

    fn read_device_id(&self) -> DeviceId;
}
