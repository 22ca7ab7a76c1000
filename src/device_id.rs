//! Device identity, read once from the chip's factory information block.
//!
//! Mirrors the factory-burned-identifier pattern used for network
//! addressing: a stable 64-bit value that never changes across reboots,
//! read by the boot dispatcher and handed to every notification frame.

/// A device's 64-bit factory identity.
pub type DeviceId = u64;

/// Matches every device regardless of its own id.
pub const BROADCAST_ID: DeviceId = 0xFFFF_FFFF_FFFF_FFFF;

/// Read the factory-burned id from the chip's information block.
#[cfg(target_os = "none")]
pub fn read_factory_id() -> DeviceId {
    // SAFETY: FICR (factory information configuration registers) are
    // read-only and mapped at a fixed address for the life of the chip;
    // the two-word device-id pair is defined by the vendor datasheet.
    unsafe {
        let lo = core::ptr::read_volatile(0x1000_0000 as *const u32);
        let hi = core::ptr::read_volatile(0x1000_0004 as *const u32);
        ((hi as u64) << 32) | lo as u64
    }
}

/// Host-simulation: deterministic id so test expectations are stable.
#[cfg(not(target_os = "none"))]
pub fn read_factory_id() -> DeviceId {
    0x0123_4567_89AB_CDEF
}

/// Returns `true` when `target` addresses `own` — either by exact match or
/// the all-ones broadcast sentinel.
pub fn matches(target: DeviceId, own: DeviceId) -> bool {
    target == BROADCAST_ID || target == own
}
