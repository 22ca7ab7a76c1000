//! Device configuration.
//!
//! Tunables the wire protocol and boot dispatcher leave implicit: region
//! sizes for the memory protection unit, watchdog timeouts, and the
//! radio's default operating parameters. Values can be overridden from a
//! provisioning step outside this crate's scope; `Default` gives the
//! values the boot dispatcher uses on a factory-fresh device.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Size of the secure flash region reserved for the supervisor, starting
    /// at the device's flash base. Everything above this is non-secure.
    pub secure_flash_region_bytes: u32,
    /// Size of the secure RAM region reserved for the supervisor.
    pub secure_ram_region_bytes: u32,
    /// Size of the non-secure-callable sub-region at the top of the secure
    /// flash region, where the secure-gateway stubs live.
    pub nonsecure_callable_bytes: u32,

    /// Primary watchdog timeout, in milliseconds. Pettable only through
    /// the non-secure-callable gateway; expiry resets into the OTA loop.
    pub primary_watchdog_timeout_ms: u32,
    /// Secondary watchdog timeout, in milliseconds. Not pettable from
    /// non-secure code at all; started only by the hardware-wired Stop
    /// event.
    pub secondary_watchdog_timeout_ms: u32,

    /// Default radio channel entered during boot's radio bring-up.
    pub radio_channel: u8,
    /// Default radio operating frequency, in MHz.
    pub radio_frequency_mhz: u16,
    /// Whether the companion core should run the TDMA client variant of
    /// the radio request set instead of the plain one.
    pub tdma_enabled: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            secure_flash_region_bytes: 16 * 1024,
            secure_ram_region_bytes: 32 * 1024,
            nonsecure_callable_bytes: 8 * 1024,
            primary_watchdog_timeout_ms: 10_000,
            secondary_watchdog_timeout_ms: 1_000,
            radio_channel: 26,
            radio_frequency_mhz: 2_480,
            tdma_enabled: false,
        }
    }
}

impl DeviceConfig {
    /// Flash offset where the non-secure (user image) region begins.
    pub const fn nonsecure_flash_base(&self) -> u32 {
        self.secure_flash_region_bytes
    }

    /// Flash offset where the non-secure-callable gateway stubs begin.
    pub const fn nonsecure_callable_base(&self) -> u32 {
        self.secure_flash_region_bytes - self.nonsecure_callable_bytes
    }

    /// Reject a configuration the boot dispatcher could not act on safely:
    /// an oversized non-secure-callable window, a secondary watchdog no
    /// shorter than the primary one (it would never fire first during a
    /// stop sequence), or a radio channel outside the hardware's range.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.nonsecure_callable_bytes > self.secure_flash_region_bytes {
            return Err(crate::error::Error::Config(
                "nonsecure_callable_bytes exceeds secure_flash_region_bytes",
            ));
        }
        if self.secondary_watchdog_timeout_ms >= self.primary_watchdog_timeout_ms {
            return Err(crate::error::Error::Config(
                "secondary_watchdog_timeout_ms must be shorter than primary_watchdog_timeout_ms",
            ));
        }
        if self.radio_channel > 125 {
            return Err(crate::error::Error::Config("radio_channel out of range"));
        }
        Ok(())
    }
}
