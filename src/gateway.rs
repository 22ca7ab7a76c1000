//! Non-secure-callable gateway.
//!
//! Every function here is the only way non-secure code reaches a secure
//! resource: the watchdog, the radio, flash, the RNG, or the device id.
//! Per the boundary's own rules, a rejected call never propagates an
//! error back to the non-secure caller — it is logged and dropped. A
//! caller that needs to know whether a write landed should watch for the
//! corresponding notification instead.

use log::warn;

use crate::config::DeviceConfig;
use crate::control_block::{ControlBlock, MAX_PDU_LEN, NetworkRequest};
use crate::device_id::DeviceId;
use crate::error::GatewayError;
use crate::ipc;
use crate::mailbox::Mailbox;
use crate::ports::{BootPort, FlashPort};
use crate::watchdog::PrimaryWatchdog;

/// Reload the primary watchdog's countdown. The only way to pet it.
pub fn reload_primary_watchdog(wd: &PrimaryWatchdog) {
    wd.pet();
}

/// Checks that `[addr, addr + len)` falls entirely within the non-secure
/// flash region, i.e. does not touch the supervisor's own secure flash or
/// the non-secure-callable stub window.
fn check_nonsecure_flash_range(config: &DeviceConfig, addr: u32, len: u32) -> crate::error::Result<()> {
    let Some(end) = addr.checked_add(len) else {
        return Err(GatewayError::LengthExceeded.into());
    };
    if addr < config.nonsecure_flash_base() {
        return Err(GatewayError::AddressInSecureRegion.into());
    }
    if end == 0 && len != 0 {
        return Err(GatewayError::LengthExceeded.into());
    }
    Ok(())
}

/// Write a chunk of a non-secure image. Silently drops (and logs) a
/// write whose target range overlaps the secure region instead of
/// returning an error to the caller.
pub fn write_nonsecure_chunk(
    flash: &mut impl FlashPort,
    config: &DeviceConfig,
    offset: u32,
    data: &[u8],
) {
    if let Err(err) = check_nonsecure_flash_range(config, offset, data.len() as u32) {
        warn!("gateway: rejected flash write at offset {offset} (len {}): {err}", data.len());
        return;
    }
    if flash.write(offset, data).is_err() {
        warn!("gateway: flash write at offset {offset} failed");
    }
}

/// Erase the entire non-secure flash region ahead of an image transfer.
pub fn erase_nonsecure_region(flash: &mut impl FlashPort) {
    if flash.erase_nonsecure_region().is_err() {
        warn!("gateway: erase of non-secure flash region failed");
    }
}

/// Maximum size of one outbound radio frame. Frames above this size
/// never reach the radio; the protocol's own largest frame (an
/// `OtaChunk`) fits comfortably under it.
const MAX_FRAME_LEN: usize = MAX_PDU_LEN;

/// Send an already-framed radio packet, rejecting (and logging) anything
/// larger than the link can carry rather than truncating it. Goes
/// through [`ipc::call_network`] since only the network core is allowed
/// to touch the radio.
pub fn send_raw(block: &ControlBlock, mailbox: &Mailbox, frame: &[u8]) {
    if frame.len() > MAX_FRAME_LEN {
        warn!("gateway: rejected outbound frame of {} bytes", frame.len());
        return;
    }
    ipc::call_network(block, mailbox, NetworkRequest::RadioTx, |r| {
        r.tx_pdu.clear();
        let _ = r.tx_pdu.extend_from_slice(frame);
    });
}

/// Build and send one user-data packet on behalf of the application
/// image: an application image never gets direct radio access, only this
/// framed send.
pub fn send_data_packet(
    block: &ControlBlock,
    mailbox: &Mailbox,
    destination: DeviceId,
    source: DeviceId,
    payload: &[u8],
) {
    use crate::wire::{WIRE_HEADER_LEN, WireHeader, codec};

    let mut buf = [0u8; MAX_PDU_LEN];
    let header = WireHeader {
        version: 1,
        packet_type: 2,
        destination,
        source,
    };
    let Some(header_len) = codec::encode_header(&header, &mut buf) else {
        warn!("gateway: failed to encode data-packet header");
        return;
    };
    if header_len + payload.len() > buf.len() {
        warn!("gateway: rejected data packet of {} bytes: too large", payload.len());
        return;
    }
    debug_assert_eq!(header_len, WIRE_HEADER_LEN);
    buf[header_len..header_len + payload.len()].copy_from_slice(payload);
    send_raw(block, mailbox, &buf[..header_len + payload.len()]);
}

/// Take whatever the network core has most recently copied into the
/// radio's receive subrecord, clearing it so the same bytes are never
/// handed to the application image twice.
pub fn rx_isr(block: &ControlBlock) -> Option<heapless::Vec<u8, MAX_PDU_LEN>> {
    critical_section::with(|cs| {
        block.with_radio(cs, |r| {
            if r.rx_pdu.is_empty() {
                None
            } else {
                let bytes = r.rx_pdu.clone();
                r.rx_pdu.clear();
                Some(bytes)
            }
        })
    })
}

/// Bring up the hardware RNG. Goes through the network core, since it
/// owns the RNG peripheral alongside the radio.
pub fn rng_init(block: &ControlBlock, mailbox: &Mailbox) {
    ipc::call_network(block, mailbox, NetworkRequest::RngInit, |_| {});
}

/// Draw one random word from the hardware RNG.
pub fn rng_read(block: &ControlBlock, mailbox: &Mailbox) -> u32 {
    ipc::call_network(block, mailbox, NetworkRequest::RngRead, |_| {});
    critical_section::with(|cs| block.with_rng(cs, |r| r.value))
}

/// Read the device's factory-burned id. Exposed through the gateway so
/// non-secure code never holds a `BootPort` of its own.
pub fn read_device_id(port: &impl BootPort) -> DeviceId {
    port.read_device_id()
}

/// Append bytes to the shared log buffer for later forwarding. Bytes
/// beyond the buffer's remaining capacity are dropped, not buffered
/// elsewhere.
pub fn log_data(block: &ControlBlock, mailbox: &Mailbox, bytes: &[u8]) {
    critical_section::with(|cs| block.append_log(cs, bytes));
    mailbox.log_event.raise();
}
