//! Dual watchdog model.
//!
//! The primary watchdog is pettable only through the non-secure-callable
//! gateway; its expiry resets the device back into the boot dispatcher's
//! OTA loop. The secondary watchdog is armed exclusively by the
//! hardware-wired Stop mailbox line and cannot be petted at all once
//! started — it exists purely to guarantee a stuck `Stopping` state can't
//! hang the device forever.

#[cfg(target_os = "none")]
use log::info;

pub struct PrimaryWatchdog {
    timeout_ms: u32,
    #[cfg(target_os = "none")]
    armed: bool,
}

impl PrimaryWatchdog {
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "none")]
        {
            info!("primary watchdog armed at {timeout_ms}ms");
            Self {
                timeout_ms,
                armed: true,
            }
        }

        #[cfg(not(target_os = "none"))]
        {
            log::info!("primary watchdog(sim): armed at {timeout_ms}ms, no-op");
            Self { timeout_ms }
        }
    }

    pub const fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Reload the countdown. Called only from the gateway's reload stub.
    pub fn pet(&self) {
        #[cfg(target_os = "none")]
        {
            if self.armed {
                // Platform-specific countdown register reload happens in the
                // board support package behind the gateway call.
            }
        }
    }
}

pub struct SecondaryWatchdog {
    timeout_ms: u32,
    started: bool,
}

impl SecondaryWatchdog {
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            started: false,
        }
    }

    pub const fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Arm the secondary watchdog. Idempotent: arming an already-running
    /// secondary watchdog does nothing, since it cannot be reloaded or
    /// rearmed once started.
    pub fn arm(&mut self) {
        if !self.started {
            self.started = true;
            #[cfg(target_os = "none")]
            info!("secondary watchdog armed at {}ms", self.timeout_ms);
        }
    }

    pub const fn is_armed(&self) -> bool {
        self.started
    }
}
