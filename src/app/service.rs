//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the violation latch and the link tracker. It is the
//! only place either is mutated: radio callbacks reach it exclusively
//! through the [`EventQueue`], which the main cycle drains at the top of
//! every iteration.
//!
//! ```text
//!  EventQueue ──▶ ┌──────────────────────────┐ ──▶ RadioPort
//!  SensorPort ──▶ │        AppService        │ ──▶ EventSink
//!   ClockPort ──▶ │ latch · link · reporter  │
//!                 └──────────────────────────┘
//! ```
//!
//! One cycle: drain events → sample → detect/latch → notify (connected
//! only) → sleep for the cadence → handle a disconnect edge.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::events::{EventQueue, LinkEvent, command_payload};
use crate::link::{LinkEdge, LinkState, LinkTracker};
use crate::status::StatusMessage;
use crate::violation::{Millis, RawSample, ViolationLatch, ViolationState, detect};

use super::commands::{AppCommand, Inbound, display_text};
use super::events::AppEvent;
use super::ports::{ClockPort, EventSink, RadioPort, SensorPort};

/// What one call to [`AppService::run_cycle`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub sample: Result<RawSample, SensorError>,
    pub light_present: bool,
    /// The status actually delivered, if any.
    pub sent: Option<StatusMessage>,
    pub edge: Option<LinkEdge>,
    /// Advertising was (re)started successfully this cycle.
    pub readvertised: bool,
    /// Total time spent blocked in this cycle.
    pub slept_ms: u32,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    latch: ViolationLatch,
    link: LinkTracker,
    /// Set on a disconnect edge, cleared once advertising is back up.
    advertising_pending: bool,
    sensor_faulted: bool,
    cycle_count: u64,
    readvertise_count: u32,
}

impl AppService {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            config,
            latch: ViolationLatch::new(),
            link: LinkTracker::new(),
            advertising_pending: false,
            sensor_faulted: false,
            cycle_count: 0,
            readvertise_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Kick off the first advertising round.
    pub fn start(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        if let Err(e) = radio.start_advertising() {
            warn!("Initial advertising failed: {}", e);
            sink.emit(&AppEvent::AdvertisingFailed(e));
            self.advertising_pending = true;
        }
        sink.emit(&AppEvent::Started);
        info!("AppService started, waiting for a peer");
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one main cycle.
    ///
    /// The `clock` parameter satisfies **both** [`ClockPort`] and
    /// [`DelayNs`], so a virtual clock in tests advances exactly by the
    /// delays the cycle asks for.
    pub fn run_cycle<H, R, C, S>(
        &mut self,
        events: &EventQueue,
        hw: &mut H,
        radio: &mut R,
        clock: &mut C,
        sink: &mut S,
    ) -> CycleReport
    where
        H: SensorPort,
        R: RadioPort,
        C: ClockPort + DelayNs,
        S: EventSink,
    {
        self.cycle_count += 1;

        // 1. Apply whatever the radio stack queued since the last cycle.
        events.drain(|event| self.handle_event(event, &mut *sink));

        // 2. Sample → detect → latch
        let sample = hw.read_light();
        let light_present = self.process_sample(sample, clock.now_ms(), sink);

        // 3. Report (connected only), then hold the cadence
        let mut sent = None;
        let mut slept_ms = if self.link.is_connected() {
            sent = self.report(radio, clock.now_ms(), sink);
            self.config.report_interval_ms
        } else {
            self.config.idle_interval_ms
        };
        clock.delay_ms(slept_ms);

        // 4. Re-advertise once per disconnect edge (and retry until it works)
        let edge = self.link.poll_edge();
        match edge {
            Some(LinkEdge::Disconnected) => {
                info!("Peer gone, re-advertising in {} ms", self.config.readvertise_settle_ms);
                self.advertising_pending = true;
                clock.delay_ms(self.config.readvertise_settle_ms);
                slept_ms += self.config.readvertise_settle_ms;
            }
            Some(LinkEdge::Connected) => self.advertising_pending = false,
            None => {}
        }
        let readvertised = self.advertising_pending
            && !self.link.is_connected()
            && self.restart_advertising(radio, sink);

        CycleReport {
            sample,
            light_present,
            sent,
            edge,
            readvertised,
            slept_ms,
        }
    }

    // ── Event / command handling ──────────────────────────────

    /// Apply one queued radio event.
    pub fn handle_event(&mut self, event: LinkEvent, sink: &mut impl EventSink) {
        match event {
            LinkEvent::PeerConnected => {
                self.link.on_connect();
                sink.emit(&AppEvent::PeerConnected);
            }
            LinkEvent::PeerDisconnected => {
                self.link.on_disconnect();
                sink.emit(&AppEvent::PeerDisconnected);
            }
            LinkEvent::CommandReceived(payload) => self.on_command(&payload, sink),
        }
    }

    /// Interpret one characteristic write. Unknown and empty writes are
    /// no-ops; nothing is ever sent back to the peer.
    pub fn on_command(&mut self, bytes: &[u8], sink: &mut impl EventSink) {
        match AppCommand::decode(bytes) {
            Inbound::Empty => debug!("Empty write ignored"),
            Inbound::Command(AppCommand::Reset) => {
                info!("Command from peer: {}", display_text(bytes));
                if self.latch.clear() {
                    sink.emit(&AppEvent::ViolationCleared);
                } else {
                    sink.emit(&AppEvent::ResetWhileSafe);
                }
            }
            Inbound::Unrecognised(raw) => {
                info!("Unknown command from peer: {:?}", display_text(raw));
                sink.emit(&AppEvent::CommandIgnored(command_payload(raw)));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Status the peer would receive at `now`.
    pub fn status_at(&self, now: Millis) -> StatusMessage {
        if self.sensor_faulted && self.config.sensor_fault_token {
            StatusMessage::SensorFault
        } else {
            StatusMessage::from_state(&self.latch.state(), now)
        }
    }

    pub fn violation_state(&self) -> ViolationState {
        self.latch.state()
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Successful advertising restarts after a disconnect.
    pub fn readvertise_count(&self) -> u32 {
        self.readvertise_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn process_sample(
        &mut self,
        sample: Result<RawSample, SensorError>,
        now: Millis,
        sink: &mut impl EventSink,
    ) -> bool {
        let raw = match sample {
            Ok(raw) => raw,
            Err(e) => {
                if !self.sensor_faulted {
                    self.sensor_faulted = true;
                    warn!("Light sensor read failed: {}", e);
                    sink.emit(&AppEvent::SensorFault(e));
                }
                return false;
            }
        };

        if self.sensor_faulted {
            self.sensor_faulted = false;
            sink.emit(&AppEvent::SensorRecovered);
        }

        let light = detect(raw, self.config.light_threshold, self.config.polarity);
        if self.latch.observe(light, now) {
            warn!("!!! Violation detected (raw={}, t={} ms) !!!", raw, now);
            sink.emit(&AppEvent::ViolationLatched { at_ms: now, raw });
        }
        light
    }

    fn report(
        &mut self,
        radio: &mut impl RadioPort,
        now: Millis,
        sink: &mut impl EventSink,
    ) -> Option<StatusMessage> {
        let msg = self.status_at(now);
        let payload = msg.encode();
        debug!("Notify {}", payload);
        match radio.notify(&payload) {
            Ok(()) => Some(msg),
            Err(e) => {
                warn!("Status notify failed: {}", e);
                sink.emit(&AppEvent::NotifyFailed(e));
                None
            }
        }
    }

    fn restart_advertising(
        &mut self,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) -> bool {
        match radio.start_advertising() {
            Ok(()) => {
                self.advertising_pending = false;
                self.readvertise_count += 1;
                sink.emit(&AppEvent::AdvertisingRestarted);
                true
            }
            Err(e) => {
                warn!("Advertising restart failed ({}), retrying next cycle", e);
                sink.emit(&AppEvent::AdvertisingFailed(e));
                false
            }
        }
    }
}
