//! SwarmIT supervisor firmware library.
//!
//! Exposes every pure-logic module for host-side integration testing.
//! Code that touches real peripherals is guarded by `#[cfg(target_os = "none")]`
//! within each module and backed by a host-simulation path otherwise.

#![no_std]
#![deny(unused_must_use)]

#[cfg(test)]
extern crate std;

pub mod boot;
pub mod config;
pub mod control_block;
pub mod device_id;
pub mod error;
pub mod fsm;
pub mod gateway;
pub mod ipc;
pub mod log_sink;
pub mod mailbox;
pub mod ota;
pub mod ports;
#[cfg(test)]
mod test_support;
pub mod watchdog;
pub mod wire;
