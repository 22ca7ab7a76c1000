//! End-to-end scenarios exercising the `NetworkService`/`Supervisor` split
//! against mock radio, flash, and RNG adapters: start/stop handshakes, a
//! full OTA transfer (including an out-of-order delivery), and the
//! silent-drop behaviours malformed or misaddressed traffic relies on.
//!
//! Each test spawns `NetworkService` on its own OS thread to stand in for
//! the second core, the way the crate's own unit tests do internally, and
//! drives `Supervisor` on the main thread.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use swarmit_supervisor::config::DeviceConfig;
use swarmit_supervisor::control_block::ControlBlock;
use swarmit_supervisor::device_id;
use swarmit_supervisor::fsm::StateId;
use swarmit_supervisor::ipc::{NetworkService, Supervisor};
use swarmit_supervisor::mailbox::Mailbox;
use swarmit_supervisor::wire::{
    CHUNK_SIZE, HASH_LEN, TAG_OTA_CHUNK, TAG_OTA_START, TAG_START, TAG_STATUS, TAG_STOP,
    WIRE_HEADER_LEN, WireHeader, codec,
};

use crate::mock_hw::{MockFlash, MockRadio, MockRng};

fn build_frame(tag: u8, target: u64, payload: &[u8]) -> Vec<u8> {
    let mut v = vec![0u8; WIRE_HEADER_LEN];
    let header = WireHeader {
        version: 1,
        packet_type: 0,
        destination: target,
        source: 0,
    };
    codec::encode_header(&header, &mut v).unwrap();
    v.push(tag);
    v.extend_from_slice(&target.to_le_bytes());
    v.extend_from_slice(payload);
    v
}

fn ota_start_payload(image_size: u32, chunk_count: u32, hash: [u8; HASH_LEN]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&image_size.to_le_bytes());
    v.extend_from_slice(&chunk_count.to_le_bytes());
    v.extend_from_slice(&hash);
    v
}

fn ota_chunk_payload(index: u32, chunk: &[u8; CHUNK_SIZE]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&index.to_le_bytes());
    v.push(CHUNK_SIZE as u8);
    v.extend_from_slice(chunk);
    v
}

/// Spawn a `NetworkService` driving `radio` on a background thread, run
/// `body` with the `Supervisor` it feeds on the current thread, then tear
/// the background thread down.
fn with_scenario(
    radio: MockRadio,
    body: impl FnOnce(&ControlBlock, &Mailbox, &mut Supervisor<'_, MockFlash>),
) {
    let device_id = device_id::read_factory_id();
    let block = ControlBlock::new();
    let mailbox = Mailbox::new();
    let stop = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let net = NetworkService::new(radio, MockRng::default(), &block, &mailbox, device_id);
        scope.spawn(|| {
            let mut net = net;
            block.set_network_ready();
            while !stop.load(Ordering::Relaxed) {
                net.poll();
                std::thread::yield_now();
            }
        });

        let mut supervisor =
            Supervisor::new(MockFlash::new(), DeviceConfig::default(), &block, &mailbox, device_id);
        body(&block, &mailbox, &mut supervisor);

        stop.store(true, Ordering::Relaxed);
    });
}

/// Wait for the network service to classify and latch one command, then
/// let the supervisor act on it.
fn wait_and_poll(mailbox: &Mailbox, supervisor: &mut Supervisor<'_, MockFlash>, now: u32) {
    while !mailbox.command.signaled() {
        std::thread::yield_now();
    }
    supervisor.poll(now);
}

#[test]
fn start_stop_round_trip_through_acknowledgement() {
    let mut radio = MockRadio::new();
    let device_id = device_id::read_factory_id();
    radio.push_inbound(&build_frame(TAG_START, device_id, &[]));
    radio.push_inbound(&build_frame(TAG_STOP, device_id, &[]));

    with_scenario(radio, |block, mailbox, supervisor| {
        wait_and_poll(mailbox, supervisor, 0);
        assert_eq!(supervisor.current_state(), StateId::Running);
        assert!(mailbox.start_experiment.take());

        wait_and_poll(mailbox, supervisor, 1);
        assert_eq!(supervisor.current_state(), StateId::Stopping);
        assert!(mailbox.stop.take());

        // The application core acknowledges through the control block,
        // not through a second radio frame.
        block.acknowledge_stop();
        supervisor.poll(2);
        assert_eq!(supervisor.current_state(), StateId::Ready);
    });
}

#[test]
fn full_ota_transfer_applies_every_chunk_and_resets() {
    let device_id = device_id::read_factory_id();
    let mut radio = MockRadio::new();

    let chunks: [[u8; CHUNK_SIZE]; 3] = std::array::from_fn(|i| [i as u8; CHUNK_SIZE]);
    let mut hasher = Sha256::new();
    for chunk in &chunks {
        hasher.update(chunk);
    }
    let hash: [u8; HASH_LEN] = hasher.finalize().into();
    let image_size = (CHUNK_SIZE * chunks.len()) as u32;

    radio.push_inbound(&build_frame(
        TAG_OTA_START,
        device_id,
        &ota_start_payload(image_size, chunks.len() as u32, hash),
    ));
    for (i, chunk) in chunks.iter().enumerate() {
        radio.push_inbound(&build_frame(
            TAG_OTA_CHUNK,
            device_id,
            &ota_chunk_payload(i as u32, chunk),
        ));
    }

    with_scenario(radio, |_block, mailbox, supervisor| {
        wait_and_poll(mailbox, supervisor, 0);
        assert_eq!(supervisor.current_state(), StateId::Programming);
        assert!(mailbox.ota_start.take());

        wait_and_poll(mailbox, supervisor, 1);
        assert_eq!(supervisor.current_state(), StateId::Programming);

        wait_and_poll(mailbox, supervisor, 2);
        assert_eq!(supervisor.current_state(), StateId::Programming);

        wait_and_poll(mailbox, supervisor, 3);
        assert_eq!(supervisor.current_state(), StateId::Ready);
    });
}

#[test]
fn out_of_order_chunk_delivery_still_completes_the_transfer() {
    let device_id = device_id::read_factory_id();
    let mut radio = MockRadio::new();

    let chunks: [[u8; CHUNK_SIZE]; 3] = std::array::from_fn(|i| [i as u8; CHUNK_SIZE]);
    let mut hasher = Sha256::new();
    for chunk in &chunks {
        hasher.update(chunk);
    }
    let hash: [u8; HASH_LEN] = hasher.finalize().into();
    let image_size = (CHUNK_SIZE * chunks.len()) as u32;

    radio.push_inbound(&build_frame(
        TAG_OTA_START,
        device_id,
        &ota_start_payload(image_size, chunks.len() as u32, hash),
    ));
    // Chunk 0, then 2, then 1: the link reordered the middle chunk.
    for &i in &[0usize, 2, 1] {
        radio.push_inbound(&build_frame(
            TAG_OTA_CHUNK,
            device_id,
            &ota_chunk_payload(i as u32, &chunks[i]),
        ));
    }

    with_scenario(radio, |_block, mailbox, supervisor| {
        wait_and_poll(mailbox, supervisor, 0);
        assert_eq!(supervisor.current_state(), StateId::Programming);

        // Every chunk must still reach flash even though it arrived out
        // of order; the old implementation deadlocked here because a
        // non-successor index looked like an already-applied duplicate
        // and never reached the flash write at all.
        wait_and_poll(mailbox, supervisor, 1);
        wait_and_poll(mailbox, supervisor, 2);
        wait_and_poll(mailbox, supervisor, 3);
        assert_eq!(supervisor.current_state(), StateId::Ready);
    });
}

#[test]
fn retransmitted_chunk_during_transfer_does_not_duplicate_flash_write() {
    let device_id = device_id::read_factory_id();
    let mut radio = MockRadio::new();

    let chunks: [[u8; CHUNK_SIZE]; 2] = std::array::from_fn(|i| [i as u8; CHUNK_SIZE]);
    let mut hasher = Sha256::new();
    for chunk in &chunks {
        hasher.update(chunk);
    }
    let hash: [u8; HASH_LEN] = hasher.finalize().into();
    let image_size = (CHUNK_SIZE * chunks.len()) as u32;

    radio.push_inbound(&build_frame(
        TAG_OTA_START,
        device_id,
        &ota_start_payload(image_size, chunks.len() as u32, hash),
    ));
    radio.push_inbound(&build_frame(
        TAG_OTA_CHUNK,
        device_id,
        &ota_chunk_payload(0, &chunks[0]),
    ));
    // Duplicate retransmission of chunk 0 before chunk 1 arrives.
    radio.push_inbound(&build_frame(
        TAG_OTA_CHUNK,
        device_id,
        &ota_chunk_payload(0, &chunks[0]),
    ));
    radio.push_inbound(&build_frame(
        TAG_OTA_CHUNK,
        device_id,
        &ota_chunk_payload(1, &chunks[1]),
    ));

    with_scenario(radio, |_block, mailbox, supervisor| {
        for tick in 0..4u32 {
            wait_and_poll(mailbox, supervisor, tick);
        }
        assert_eq!(supervisor.current_state(), StateId::Ready);
    });
}

#[test]
fn misaddressed_start_command_leaves_device_ready() {
    let device_id = device_id::read_factory_id();
    let other = device_id.wrapping_add(1);
    let mut radio = MockRadio::new();
    radio.push_inbound(&build_frame(TAG_START, other, &[]));

    let block = ControlBlock::new();
    let mailbox = Mailbox::new();
    let mut net = NetworkService::new(radio, MockRng::default(), &block, &mailbox, device_id);
    net.poll();

    let supervisor =
        Supervisor::new(MockFlash::new(), DeviceConfig::default(), &block, &mailbox, device_id);
    assert_eq!(supervisor.current_state(), StateId::Ready);
    assert!(!mailbox.command.take());
    assert!(!mailbox.start_experiment.take());
}

#[test]
fn status_query_works_in_every_state() {
    let device_id = device_id::read_factory_id();
    let mut radio = MockRadio::new();
    radio.push_inbound(&build_frame(TAG_START, device_id, &[]));
    radio.push_inbound(&build_frame(TAG_STATUS, device_id, &[]));

    with_scenario(radio, |_block, mailbox, supervisor| {
        wait_and_poll(mailbox, supervisor, 0);
        wait_and_poll(mailbox, supervisor, 1);
        assert_eq!(supervisor.current_state(), StateId::Running);
    });
}
