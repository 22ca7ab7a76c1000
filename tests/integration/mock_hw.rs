//! Mock hardware adapters for integration tests.
//!
//! Records every call so tests can assert on the full history without
//! touching real radio/flash/RNG peripherals.

use std::collections::VecDeque;
use swarmit_supervisor::ports::{FlashPort, RadioPort, RngPort};

// ── MockRadio ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRadio {
    pub inbound: VecDeque<Vec<u8>>,
    pub outbound: Vec<Vec<u8>>,
    pub channel: Option<u8>,
    pub frequency_mhz: Option<u16>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_inbound(&mut self, frame: &[u8]) {
        self.inbound.push_back(frame.to_vec());
    }
}

impl RadioPort for MockRadio {
    type Error = ();

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_frequency(&mut self, frequency_mhz: u16) -> Result<(), Self::Error> {
        self.frequency_mhz = Some(frequency_mhz);
        Ok(())
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
        self.channel = Some(channel);
        Ok(())
    }

    fn set_address(&mut self, _address: u64) -> Result<(), Self::Error> {
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.outbound.push(frame.to_vec());
        Ok(())
    }

    fn try_recv(&mut self, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        match self.inbound.pop_front() {
            Some(frame) => {
                buf[..frame.len()].copy_from_slice(&frame);
                Ok(Some(frame.len()))
            }
            None => Ok(None),
        }
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn rssi(&mut self) -> Result<i8, Self::Error> {
        Ok(0)
    }
}

// ── MockFlash ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockFlash {
    pub erased: bool,
    pub writes: Vec<(u32, Vec<u8>)>,
}

impl MockFlash {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlashPort for MockFlash {
    type Error = ();

    fn erase_nonsecure_region(&mut self) -> Result<(), Self::Error> {
        self.erased = true;
        Ok(())
    }

    fn write(&mut self, offset: u32, data: &[u8]) -> Result<(), Self::Error> {
        self.writes.push((offset, data.to_vec()));
        Ok(())
    }
}

// ── MockRng ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRng {
    pub next_value: u32,
}

impl RngPort for MockRng {
    fn init(&mut self) {}

    fn read(&mut self) -> u32 {
        self.next_value
    }
}
