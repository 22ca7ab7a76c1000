//! Unified error types for the supervisor firmware.
//!
//! Most fault conditions in this system are handled by silent drop or
//! no-op (see the command-rejection and malformed-frame policy), so these
//! types are mainly used where a caller genuinely needs to distinguish
//! outcomes — OTA session bookkeeping and the non-secure gateway bounds
//! checks. All variants are `Copy` so they move through the supervisor
//! state machine without allocation.

use core::fmt;

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Ota(OtaError),
    Gateway(GatewayError),
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ota(e) => write!(f, "ota: {e}"),
            Self::Gateway(e) => write!(f, "gateway: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// OTA errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaError {
    /// `chunk_count` did not equal `ceil(image_size / CHUNK_SIZE)`.
    SizeMismatch,
    /// `expected_hash` was not exactly `HASH_LEN` bytes.
    InvalidHashLength,
    /// A chunk index beyond `chunk_count` was offered.
    IndexOutOfRange,
}

impl fmt::Display for OtaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch => write!(f, "chunk_count does not match image_size"),
            Self::InvalidHashLength => write!(f, "expected_hash must be HASH_LEN bytes"),
            Self::IndexOutOfRange => write!(f, "chunk index exceeds chunk_count"),
        }
    }
}

impl From<OtaError> for Error {
    fn from(e: OtaError) -> Self {
        Self::Ota(e)
    }
}

// ---------------------------------------------------------------------------
// Non-secure gateway errors
// ---------------------------------------------------------------------------

/// Rejections from a secure-gateway stub. Per the gateway's safety
/// contract these never propagate to the non-secure caller as an error —
/// the stub call is simply a no-op — but the typed variant lets the
/// secure side log and test the rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// Requested length exceeds the destination shared buffer.
    LengthExceeded,
    /// Source address falls within secure RAM or secure flash.
    AddressInSecureRegion,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthExceeded => write!(f, "length exceeds shared buffer"),
            Self::AddressInSecureRegion => write!(f, "source address in secure region"),
        }
    }
}

impl From<GatewayError> for Error {
    fn from(e: GatewayError) -> Self {
        Self::Gateway(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
