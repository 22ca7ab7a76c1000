//! Wire packet types: the outer radio header and the tagged command /
//! notification bodies it carries.

use crate::device_id::DeviceId;

/// Fixed-size chunk transferred in one `OtaChunk` command frame.
pub const CHUNK_SIZE: usize = 128;

/// SHA-256 digest length.
pub const HASH_LEN: usize = 32;

/// Maximum length of a forwarded log payload (one-octet length prefix).
pub const MAX_LOG_LEN: usize = 255;

// ── Command tags (host → device) ────────────────────────────────

pub const TAG_STATUS: u8 = 0x80;
pub const TAG_START: u8 = 0x81;
pub const TAG_STOP: u8 = 0x82;
pub const TAG_OTA_START: u8 = 0x83;
pub const TAG_OTA_CHUNK: u8 = 0x84;

// ── Notification tags (device → host) ───────────────────────────

pub const TAG_STATUS_REPLY: u8 = 0x85;
pub const TAG_OTA_START_ACK: u8 = 0x86;
pub const TAG_OTA_CHUNK_ACK: u8 = 0x87;
pub const TAG_GPIO_EVENT: u8 = 0x88;
pub const TAG_LOG_EVENT: u8 = 0x89;

/// Outer radio-frame header, preceding the tagged body on every frame.
///
/// `destination` is matched against [`BROADCAST_ID`](crate::device_id::BROADCAST_ID)
/// or the device's own id; any other value causes the frame to be
/// dropped before the body is even inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub version: u8,
    pub packet_type: u8,
    pub destination: DeviceId,
    pub source: DeviceId,
}

/// Byte size of [`WireHeader`] on the wire: version(1) + type(1) + dest(8) + src(8).
pub const WIRE_HEADER_LEN: usize = 1 + 1 + 8 + 8;

/// A decoded command frame body (tag byte already consumed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFrame {
    Status {
        target: DeviceId,
    },
    Start {
        target: DeviceId,
    },
    Stop {
        target: DeviceId,
    },
    OtaStart {
        target: DeviceId,
        image_size: u32,
        chunk_count: u32,
        hash: [u8; HASH_LEN],
    },
    OtaChunk {
        target: DeviceId,
        index: u32,
        chunk_size: u8,
        chunk: [u8; CHUNK_SIZE],
    },
}

impl CommandFrame {
    pub const fn target(&self) -> DeviceId {
        match self {
            Self::Status { target }
            | Self::Start { target }
            | Self::Stop { target }
            | Self::OtaStart { target, .. }
            | Self::OtaChunk { target, .. } => *target,
        }
    }
}

/// A notification frame body to be sent device → host.
#[derive(Debug, Clone)]
pub enum NotificationFrame {
    Status {
        device_id: DeviceId,
        status: u8,
    },
    OtaStartAck {
        device_id: DeviceId,
    },
    OtaChunkAck {
        device_id: DeviceId,
        index: u32,
    },
    GpioEvent {
        device_id: DeviceId,
        timestamp: u32,
        port: u8,
        pin: u8,
        value: u8,
    },
    LogEvent {
        device_id: DeviceId,
        timestamp: u32,
        log: heapless::Vec<u8, MAX_LOG_LEN>,
    },
}
