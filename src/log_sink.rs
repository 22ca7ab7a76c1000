//! Forwards bytes accumulated in the shared log buffer to the host as a
//! `LogEvent` notification, on the log-event mailbox edge.
//!
//! Internal tracing still goes through the `log` crate everywhere else in
//! this codebase; this module only concerns itself with the subset of log
//! output the device forwards to the host over the radio link.

use crate::control_block::ControlBlock;
use crate::wire::{MAX_LOG_LEN, NotificationFrame};

/// Drain the shared log buffer and build a notification frame from it, if
/// there is anything to send. `timestamp` is the caller's current tick
/// count; this module has no clock of its own.
pub fn drain_to_notification(
    block: &ControlBlock,
    device_id: u64,
    timestamp: u32,
) -> Option<NotificationFrame> {
    let bytes = critical_section::with(|cs| block.drain_log(cs));
    if bytes.is_empty() {
        return None;
    }

    let mut log = heapless::Vec::<u8, MAX_LOG_LEN>::new();
    let _ = log.extend_from_slice(&bytes);
    Some(NotificationFrame::LogEvent {
        device_id,
        timestamp,
        log,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_yields_no_notification() {
        let block = ControlBlock::new();
        assert!(drain_to_notification(&block, 1, 0).is_none());
    }

    #[test]
    fn drains_accumulated_bytes_once() {
        let block = ControlBlock::new();
        critical_section::with(|cs| block.append_log(cs, b"boot ok"));

        let frame = drain_to_notification(&block, 1, 100).unwrap();
        match frame {
            NotificationFrame::LogEvent {
                device_id,
                timestamp,
                log,
            } => {
                assert_eq!(device_id, 1);
                assert_eq!(timestamp, 100);
                assert_eq!(log.as_slice(), b"boot ok");
            }
            other => panic!("unexpected frame: {other:?}"),
        }

        assert!(drain_to_notification(&block, 1, 200).is_none());
    }
}
