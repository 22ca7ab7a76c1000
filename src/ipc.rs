//! Inter-core orchestration.
//!
//! Two independent loops run this protocol, one per core:
//!
//! - [`NetworkService`] runs on the core that owns the radio and RNG. It
//!   services one pending [`NetworkRequest`] per [`NetworkService::poll`]
//!   call, then tries to receive one inbound frame and classifies it as
//!   either a command (handed to the supervisor) or a user-data frame
//!   (left in the radio subrecord for the application core to pick up).
//! - [`Supervisor`] runs on the core that drives the experiment state
//!   machine and owns flash. It never touches the radio directly; every
//!   outbound frame and every radio/RNG operation goes through
//!   [`call_network`], the blocking request/populate/wait discipline
//!   shared by the supervisor, the gateway, and the boot dispatcher.
//!
//! [`NetworkClient`] is the third party to this protocol: the application
//! core, which only waits on the mailbox edges the supervisor raises and
//! reports completion back through the control block.

use core::hint::spin_loop;

use crate::config::DeviceConfig;
use crate::control_block::{ControlBlock, NetworkRequest, RadioSubrecord};
use crate::device_id::{self, DeviceId};
use crate::fsm::context::{Effect, SupervisorContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Command, Fsm, StateId};
use crate::gateway;
use crate::mailbox::Mailbox;
use crate::ports::{FlashPort, RadioPort, RngPort};
use crate::wire::{CommandFrame, WireHeader, codec};

/// The shared supervisor→network request discipline: lock the radio
/// subrecord, let `populate` fill in whatever fields the request needs,
/// unlock, raise the request, then block until the network core
/// acknowledges it. Used by [`Supervisor`], by [`crate::gateway`], and by
/// [`crate::boot::dispatch`], so all three go through the same blocking
/// path a real second core actually executes.
pub fn call_network(
    block: &ControlBlock,
    mailbox: &Mailbox,
    request: NetworkRequest,
    populate: impl FnOnce(&mut RadioSubrecord),
) {
    critical_section::with(|cs| {
        block.with_radio(cs, populate);
        block.submit_network_request(cs, request);
    });
    mailbox.network_request.raise();
    block.wait_for_network_ack();
}

/// Runs on the application core. Waits on the mailbox edges the
/// supervisor raises and reports completion back through the control
/// block's stop-acknowledgement flag.
///
/// Real experiment logic is out of scope here; `NetworkClient` only
/// carries the handshake, not the work itself.
pub struct NetworkClient<'a> {
    block: &'a ControlBlock,
    mailbox: &'a Mailbox,
}

impl<'a> NetworkClient<'a> {
    pub const fn new(block: &'a ControlBlock, mailbox: &'a Mailbox) -> Self {
        Self { block, mailbox }
    }

    /// Block until the supervisor signals that an experiment should
    /// start. Spins identically on host and device so both share one
    /// code path; host integration tests run this on a real OS thread.
    pub fn block_until_start(&self) {
        while !self.mailbox.start_experiment.take() {
            spin_loop();
        }
    }

    /// Block until the supervisor signals a stop request.
    pub fn block_until_stop(&self) {
        while !self.mailbox.stop.take() {
            spin_loop();
        }
    }

    /// Block until the supervisor has erased the non-secure flash region
    /// and is ready to receive image chunks. The application core should
    /// stop touching flash as soon as this returns.
    pub fn block_until_ota_start(&self) {
        while !self.mailbox.ota_start.take() {
            spin_loop();
        }
    }

    /// Report that the experiment has been stopped, unblocking the
    /// supervisor's `StopAcked` transition.
    pub fn acknowledge_stop(&self) {
        self.block.acknowledge_stop();
    }
}

/// Runs on the core attached to the radio and RNG. Never touches flash or
/// the supervisor FSM: its only job is servicing requests latched by the
/// other core and classifying inbound traffic.
pub struct NetworkService<'a, R, G> {
    radio: R,
    rng: G,
    block: &'a ControlBlock,
    mailbox: &'a Mailbox,
    device_id: DeviceId,
}

impl<'a, R, G> NetworkService<'a, R, G>
where
    R: RadioPort,
    G: RngPort,
{
    pub fn new(radio: R, rng: G, block: &'a ControlBlock, mailbox: &'a Mailbox, device_id: DeviceId) -> Self {
        Self {
            radio,
            rng,
            block,
            mailbox,
            device_id,
        }
    }

    /// Run one iteration: service at most one pending request, then try
    /// to receive and classify at most one inbound frame.
    pub fn poll(&mut self) {
        if self.mailbox.network_request.take() {
            self.service_request();
        }

        let mut buf = [0u8; crate::control_block::MAX_PDU_LEN];
        match self.radio.try_recv(&mut buf) {
            Ok(Some(n)) => self.classify_frame(&buf[..n]),
            Ok(None) => {}
            Err(_) => {}
        }
    }

    fn service_request(&mut self) {
        let Some(request) = critical_section::with(|cs| self.block.take_network_request(cs)) else {
            return;
        };

        match request {
            NetworkRequest::RadioInit => {
                let _ = self.radio.init();
            }
            NetworkRequest::RadioSetFrequency => {
                let frequency = critical_section::with(|cs| self.block.with_radio(cs, |r| r.frequency_mhz));
                let _ = self.radio.set_frequency(frequency);
            }
            NetworkRequest::RadioSetChannel => {
                let channel = critical_section::with(|cs| self.block.with_radio(cs, |r| r.channel));
                let _ = self.radio.set_channel(channel);
            }
            NetworkRequest::RadioSetAddress => {
                let address = critical_section::with(|cs| self.block.with_radio(cs, |r| r.address));
                let _ = self.radio.set_address(address);
            }
            NetworkRequest::RadioRx => {
                // Reception itself is driven from `poll`'s own `try_recv`
                // loop; this request only exists so boot can ask for rx
                // mode to be entered once up front.
            }
            NetworkRequest::RadioDisable => {
                let _ = self.radio.disable();
            }
            NetworkRequest::RadioTx => {
                let frame = critical_section::with(|cs| self.block.with_radio(cs, |r| r.tx_pdu.clone()));
                let _ = self.radio.send(&frame);
            }
            NetworkRequest::RadioRssi => {
                if let Ok(rssi) = self.radio.rssi() {
                    critical_section::with(|cs| self.block.with_radio(cs, |r| r.rssi = rssi));
                }
            }
            NetworkRequest::RngInit => self.rng.init(),
            NetworkRequest::RngRead => {
                let value = self.rng.read();
                critical_section::with(|cs| self.block.with_rng(cs, |r| r.value = value));
            }
            NetworkRequest::TdmaClientInit => {
                let _ = self.radio.tdma_init();
            }
            NetworkRequest::TdmaClientSetTable => {
                let table = critical_section::with(|cs| self.block.with_radio(cs, |r| r.tdma_table.clone()));
                let _ = self.radio.tdma_set_table(&table);
            }
            NetworkRequest::TdmaClientGetTable => {
                let mut buf = [0u8; crate::control_block::MAX_PDU_LEN];
                if let Ok(n) = self.radio.tdma_get_table(&mut buf) {
                    critical_section::with(|cs| {
                        self.block.with_radio(cs, |r| {
                            r.tdma_table.clear();
                            let _ = r.tdma_table.extend_from_slice(&buf[..n]);
                        });
                    });
                }
            }
            NetworkRequest::TdmaClientTx => {
                let frame = critical_section::with(|cs| self.block.with_radio(cs, |r| r.tx_pdu.clone()));
                let _ = self.radio.tdma_tx(&frame);
            }
            NetworkRequest::TdmaClientFlush => {
                let _ = self.radio.tdma_flush();
            }
            NetworkRequest::TdmaClientEmpty => {
                if let Ok(empty) = self.radio.tdma_is_empty() {
                    critical_section::with(|cs| self.block.with_radio(cs, |r| r.registration_state = empty));
                }
            }
            NetworkRequest::TdmaClientStatus => {
                if let Ok(status) = self.radio.tdma_status() {
                    critical_section::with(|cs| self.block.with_radio(cs, |r| r.tdma_status = status));
                }
            }
        }

        self.block.acknowledge_network_request();
    }

    fn classify_frame(&mut self, raw: &[u8]) {
        let Some((header, body)) = codec::decode_header(raw) else {
            return;
        };
        if !device_id::matches(header.destination, self.device_id) {
            return;
        }
        if let Some(command_frame) = codec::decode_command(body) {
            if !device_id::matches(command_frame.target(), self.device_id) {
                return;
            }
            critical_section::with(|cs| self.block.submit_command(cs, command_frame));
            self.mailbox.command.raise();
            return;
        }

        // Not a recognised command: treat it as a user-data frame for the
        // application image, but only while an experiment is actually
        // running.
        if self.block.status() == crate::control_block::Status::Running {
            critical_section::with(|cs| {
                self.block.with_radio(cs, |r| {
                    r.rx_pdu.clear();
                    let _ = r.rx_pdu.extend_from_slice(body);
                });
            });
            self.mailbox.radio_rx.raise();
        }
    }
}

/// Runs on the core that drives the experiment state machine and owns
/// flash. Reacts to commands handed over by [`NetworkService`] and to the
/// application core's stop acknowledgement; every outbound effect that
/// needs the radio goes through [`call_network`].
pub struct Supervisor<'a, F> {
    flash: F,
    config: DeviceConfig,
    block: &'a ControlBlock,
    mailbox: &'a Mailbox,
    fsm: Fsm,
    ctx: SupervisorContext,
}

impl<'a, F> Supervisor<'a, F>
where
    F: FlashPort,
{
    pub fn new(
        flash: F,
        config: DeviceConfig,
        block: &'a ControlBlock,
        mailbox: &'a Mailbox,
        device_id: DeviceId,
    ) -> Self {
        let mut fsm = Fsm::new(build_state_table(), StateId::Ready);
        let mut ctx = SupervisorContext::new(device_id);
        fsm.start(&mut ctx);
        Self {
            flash,
            config,
            block,
            mailbox,
            fsm,
            ctx,
        }
    }

    pub fn current_state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Run one iteration: drain the stop acknowledgement if pending, then
    /// take one pending command if the network core has latched one.
    /// `now` is a monotonic tick count used to timestamp forwarded log
    /// events.
    pub fn poll(&mut self, now: u32) {
        if self.block.take_stop_acknowledgement() {
            self.dispatch(Command::StopAcked, now);
        }

        if self.mailbox.command.take() {
            if let Some(frame) = critical_section::with(|cs| self.block.take_command(cs)) {
                self.handle_command_frame(frame, now);
            }
        }
    }

    fn handle_command_frame(&mut self, command_frame: CommandFrame, now: u32) {
        let command = match command_frame {
            CommandFrame::Status { .. } => Command::Status,
            CommandFrame::Start { .. } => Command::Start,
            CommandFrame::Stop { .. } => Command::Stop,
            CommandFrame::OtaStart {
                image_size,
                chunk_count,
                hash,
                ..
            } => Command::OtaStart {
                image_size,
                chunk_count,
                hash,
            },
            CommandFrame::OtaChunk {
                index,
                chunk_size,
                chunk,
                ..
            } => Command::OtaChunk {
                index,
                chunk_size,
                chunk,
            },
        };

        self.dispatch(command, now);
    }

    fn dispatch(&mut self, command: Command, now: u32) {
        self.fsm.handle(&mut self.ctx, command);
        self.block.set_status(self.ctx.status);
        self.apply_effects();
        self.send_pending_notification();
        self.forward_pending_log(now);
    }

    fn apply_effects(&mut self) {
        for effect in self.ctx.take_effects() {
            match effect {
                Effect::RaiseStartExperiment => self.mailbox.start_experiment.raise(),
                Effect::RaiseStop => self.mailbox.stop.raise(),
                Effect::EraseNonSecureFlash => {
                    gateway::erase_nonsecure_region(&mut self.flash);
                    self.mailbox.ota_start.raise();
                }
                Effect::WriteChunk { offset, .. } => {
                    if let Some(chunk) = self.ctx.pending_chunk.take() {
                        gateway::write_nonsecure_chunk(
                            &mut self.flash,
                            &self.config,
                            offset,
                            &chunk,
                        );
                    }
                }
                Effect::RequestReset => {
                    // Out of scope here: the boot dispatcher performs the
                    // actual reset once control returns to it.
                }
            }
        }
    }

    fn send_pending_notification(&mut self) {
        let Some(notification) = self.ctx.pending_notification.take() else {
            return;
        };
        let mut buf = [0u8; crate::control_block::MAX_PDU_LEN];
        let header = WireHeader {
            version: 1,
            packet_type: 1,
            destination: device_id::BROADCAST_ID,
            source: self.ctx.device_id,
        };
        let Some(header_len) = codec::encode_header(&header, &mut buf) else {
            return;
        };
        let Some(body_len) = codec::encode_notification(&notification, &mut buf[header_len..])
        else {
            return;
        };
        gateway::send_raw(self.block, self.mailbox, &buf[..header_len + body_len]);
    }

    fn forward_pending_log(&mut self, now: u32) {
        if !self.mailbox.log_event.take() {
            return;
        }
        if let Some(notification) =
            crate::log_sink::drain_to_notification(self.block, self.ctx.device_id, now)
        {
            self.ctx.notify(notification);
            self.send_pending_notification();
        }
    }
}
