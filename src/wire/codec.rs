//! Encoder / decoder for the wire header and the command/notification
//! tag frames it carries.
//!
//! Every function here validates length and tag before exposing a typed
//! value, and returns `None`/drops silently on malformed input rather
//! than panicking — malformed or misaddressed frames are a no-op per the
//! error-handling policy, not a crash.

use super::packet::*;

/// Parse the outer radio-frame header and return the remaining body.
pub fn decode_header(buf: &[u8]) -> Option<(WireHeader, &[u8])> {
    if buf.len() < WIRE_HEADER_LEN {
        return None;
    }
    let version = buf[0];
    let packet_type = buf[1];
    let destination = u64::from_le_bytes(buf[2..10].try_into().ok()?);
    let source = u64::from_le_bytes(buf[10..18].try_into().ok()?);
    Some((
        WireHeader {
            version,
            packet_type,
            destination,
            source,
        },
        &buf[WIRE_HEADER_LEN..],
    ))
}

/// Write the outer radio-frame header into `out`. Returns the number of
/// bytes written, or `None` if `out` is too small.
pub fn encode_header(header: &WireHeader, out: &mut [u8]) -> Option<usize> {
    if out.len() < WIRE_HEADER_LEN {
        return None;
    }
    out[0] = header.version;
    out[1] = header.packet_type;
    out[2..10].copy_from_slice(&header.destination.to_le_bytes());
    out[10..18].copy_from_slice(&header.source.to_le_bytes());
    Some(WIRE_HEADER_LEN)
}

/// Decode a command frame body. `body` starts at the one-byte tag, as
/// handed over once the caller has sliced the outer header off.
///
/// Returns `None` for an unrecognised tag or a body too short for its
/// tag — callers drop the frame silently in that case.
pub fn decode_command(body: &[u8]) -> Option<CommandFrame> {
    if body.is_empty() {
        return None;
    }
    let tag = body[0];
    let rest = &body[1..];
    if rest.len() < 8 {
        return None;
    }
    let target = u64::from_le_bytes(rest[0..8].try_into().ok()?);
    let payload = &rest[8..];

    match tag {
        TAG_STATUS => Some(CommandFrame::Status { target }),
        TAG_START => Some(CommandFrame::Start { target }),
        TAG_STOP => Some(CommandFrame::Stop { target }),
        TAG_OTA_START => {
            if payload.len() < 4 + 4 + HASH_LEN {
                return None;
            }
            let image_size = u32::from_le_bytes(payload[0..4].try_into().ok()?);
            let chunk_count = u32::from_le_bytes(payload[4..8].try_into().ok()?);
            let mut hash = [0u8; HASH_LEN];
            hash.copy_from_slice(&payload[8..8 + HASH_LEN]);
            Some(CommandFrame::OtaStart {
                target,
                image_size,
                chunk_count,
                hash,
            })
        }
        TAG_OTA_CHUNK => {
            if payload.len() < 4 + 1 + CHUNK_SIZE {
                return None;
            }
            let index = u32::from_le_bytes(payload[0..4].try_into().ok()?);
            let chunk_size = payload[4];
            let mut chunk = [0u8; CHUNK_SIZE];
            chunk.copy_from_slice(&payload[5..5 + CHUNK_SIZE]);
            Some(CommandFrame::OtaChunk {
                target,
                index,
                chunk_size,
                chunk,
            })
        }
        _ => None,
    }
}

/// Encode a notification frame body into `out`. Returns the number of
/// bytes written, or `None` if `out` is too small for this frame.
pub fn encode_notification(frame: &NotificationFrame, out: &mut [u8]) -> Option<usize> {
    match frame {
        NotificationFrame::Status { device_id, status } => {
            if out.len() < 1 + 8 + 1 {
                return None;
            }
            out[0] = TAG_STATUS_REPLY;
            out[1..9].copy_from_slice(&device_id.to_le_bytes());
            out[9] = *status;
            Some(10)
        }
        NotificationFrame::OtaStartAck { device_id } => {
            if out.len() < 1 + 8 {
                return None;
            }
            out[0] = TAG_OTA_START_ACK;
            out[1..9].copy_from_slice(&device_id.to_le_bytes());
            Some(9)
        }
        NotificationFrame::OtaChunkAck { device_id, index } => {
            if out.len() < 1 + 8 + 4 {
                return None;
            }
            out[0] = TAG_OTA_CHUNK_ACK;
            out[1..9].copy_from_slice(&device_id.to_le_bytes());
            out[9..13].copy_from_slice(&index.to_le_bytes());
            Some(13)
        }
        NotificationFrame::GpioEvent {
            device_id,
            timestamp,
            port,
            pin,
            value,
        } => {
            if out.len() < 1 + 8 + 4 + 1 + 1 + 1 {
                return None;
            }
            out[0] = TAG_GPIO_EVENT;
            out[1..9].copy_from_slice(&device_id.to_le_bytes());
            out[9..13].copy_from_slice(&timestamp.to_le_bytes());
            out[13] = *port;
            out[14] = *pin;
            out[15] = *value;
            Some(16)
        }
        NotificationFrame::LogEvent {
            device_id,
            timestamp,
            log,
        } => {
            let total = 1 + 8 + 4 + 1 + log.len();
            if out.len() < total {
                return None;
            }
            out[0] = TAG_LOG_EVENT;
            out[1..9].copy_from_slice(&device_id.to_le_bytes());
            out[9..13].copy_from_slice(&timestamp.to_le_bytes());
            out[13] = log.len() as u8;
            out[14..14 + log.len()].copy_from_slice(log);
            Some(total)
        }
    }
}
