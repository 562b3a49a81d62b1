//! AppService cycle tests against mock adapters and a virtual clock.

use suitcase::app::events::AppEvent;
use suitcase::app::service::{AppService, CycleReport};
use suitcase::config::SystemConfig;
use suitcase::error::{CommsError, SensorError};
use suitcase::events::{EventQueue, LinkEvent};
use suitcase::link::LinkEdge;
use suitcase::status::StatusMessage;
use suitcase::violation::ViolationState;

use super::mock_hw::{MockRadio, MockSensor, RadioCall, RecordingSink, VirtualClock, test_config};

const DARK: u16 = 3000;
const LIGHT: u16 = 1500;

struct Rig {
    app: AppService,
    events: EventQueue,
    sensor: MockSensor,
    radio: MockRadio,
    clock: VirtualClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(sensor: MockSensor) -> Self {
        Self::with_config(test_config(), sensor)
    }

    fn with_config(config: SystemConfig, sensor: MockSensor) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            events: EventQueue::new(),
            sensor,
            radio: MockRadio::new(),
            clock: VirtualClock::new(),
            sink: RecordingSink::new(),
        };
        rig.app.start(&mut rig.radio, &mut rig.sink);
        rig
    }

    fn cycle(&mut self) -> CycleReport {
        self.app.run_cycle(
            &self.events,
            &mut self.sensor,
            &mut self.radio,
            &mut self.clock,
            &mut self.sink,
        )
    }

    fn cycles(&mut self, n: usize) -> Vec<CycleReport> {
        (0..n).map(|_| self.cycle()).collect()
    }

    fn connect(&self) {
        self.events.push(LinkEvent::PeerConnected);
    }

    fn disconnect(&self) {
        self.events.push(LinkEvent::PeerDisconnected);
    }

    fn write(&self, bytes: &[u8]) {
        self.events.push(LinkEvent::command(bytes));
    }
}

// ── Violation reporting ───────────────────────────────────────

#[test]
fn light_after_dark_reports_elapsed_since_latch() {
    let mut rig = Rig::new(MockSensor::script(&[DARK, DARK, LIGHT, LIGHT, LIGHT]));
    rig.connect();
    rig.cycles(5);

    assert_eq!(rig.radio.notifications(), ["S", "S", "V:0", "V:500", "V:1000"]);
    assert_eq!(
        rig.app.violation_state(),
        ViolationState {
            violated: true,
            violated_at: 1000
        }
    );
}

#[test]
fn violation_outlives_the_light() {
    let mut rig = Rig::new(MockSensor::script(&[LIGHT, DARK, DARK]));
    rig.connect();
    rig.cycles(3);
    assert_eq!(rig.radio.notifications(), ["V:0", "V:500", "V:1000"]);
}

#[test]
fn latch_keeps_first_timestamp() {
    let mut rig = Rig::new(MockSensor::script(&[LIGHT, DARK, LIGHT, LIGHT]));
    rig.connect();
    let reports = rig.cycles(4);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ViolationLatched { .. })),
        1
    );
    assert_eq!(
        reports[3].sent,
        Some(StatusMessage::Violated { elapsed_ms: 1500 })
    );
}

#[test]
fn every_notification_parses_back() {
    let mut rig = Rig::new(MockSensor::script(&[DARK, LIGHT, DARK]));
    rig.connect();
    let reports = rig.cycles(3);
    for (payload, report) in rig.radio.notifications().iter().zip(&reports) {
        assert_eq!(StatusMessage::parse(payload).ok(), report.sent);
    }
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn reset_returns_status_to_safe() {
    let mut rig = Rig::new(MockSensor::script(&[LIGHT, DARK]));
    rig.connect();
    rig.cycles(2);
    rig.write(b"RESET");
    rig.cycle();

    assert_eq!(rig.radio.notifications(), ["V:0", "V:500", "S"]);
    assert_eq!(rig.app.violation_state(), ViolationState::SAFE);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::ViolationCleared), 1);
}

#[test]
fn reset_under_light_relatches_with_new_timestamp() {
    let mut rig = Rig::new(MockSensor::steady(LIGHT));
    rig.connect();
    rig.cycles(3);
    rig.write(b"RESET");
    let report = rig.cycle();

    assert_eq!(report.sent, Some(StatusMessage::Violated { elapsed_ms: 0 }));
    assert_eq!(rig.app.violation_state().violated_at, 1500);
}

#[test]
fn reset_while_safe_is_a_no_op() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    rig.connect();
    rig.write(b"RESET");
    rig.write(b"RESET");
    rig.cycle();
    assert_eq!(rig.app.violation_state(), ViolationState::SAFE);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::ResetWhileSafe), 2);
    assert_eq!(rig.radio.notifications(), ["S"]);
}

#[test]
fn unknown_commands_are_ignored_silently() {
    let mut rig = Rig::new(MockSensor::script(&[LIGHT, DARK]));
    rig.connect();
    rig.cycle();
    rig.write(b"reset");
    rig.write(b"RESET ");
    rig.write(b"OPEN");
    rig.write(b"");
    rig.cycle();

    assert_eq!(rig.radio.notifications(), ["V:0", "V:500"]);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::CommandIgnored(_))),
        3
    );
}

// ── Cadence and link handling ─────────────────────────────────

#[test]
fn idle_cycles_poll_fast_and_stay_silent() {
    let mut rig = Rig::new(MockSensor::steady(LIGHT));
    let reports = rig.cycles(3);

    assert!(rig.radio.notifications().is_empty());
    assert!(reports.iter().all(|r| r.sent.is_none() && r.slept_ms == 100));
    assert_eq!(rig.clock.sleeps_ms, [100, 100, 100]);
    // Light was still latched while nobody listened.
    assert!(rig.app.violation_state().violated);
}

#[test]
fn violation_latched_offline_is_reported_on_connect() {
    let mut rig = Rig::new(MockSensor::script(&[LIGHT, DARK, DARK, DARK]));
    rig.cycles(3);
    rig.connect();
    let report = rig.cycle();
    assert_eq!(report.sent, Some(StatusMessage::Violated { elapsed_ms: 300 }));
}

#[test]
fn disconnect_readvertises_exactly_once() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    assert_eq!(rig.radio.advertising_starts(), 1);

    rig.connect();
    let first = rig.cycle();
    assert_eq!(first.edge, Some(LinkEdge::Connected));
    assert!(!first.readvertised);
    rig.cycle();

    rig.disconnect();
    let dropped = rig.cycle();
    assert_eq!(dropped.edge, Some(LinkEdge::Disconnected));
    assert!(dropped.readvertised);
    assert_eq!(dropped.slept_ms, 100 + 500);
    assert_eq!(dropped.sent, None);

    for report in rig.cycles(10) {
        assert_eq!(report.edge, None);
        assert!(!report.readvertised);
    }
    assert_eq!(rig.radio.advertising_starts(), 2);
    assert_eq!(rig.app.readvertise_count(), 1);
}

#[test]
fn duplicate_disconnects_still_readvertise_once() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    rig.connect();
    rig.cycle();
    rig.disconnect();
    rig.disconnect();
    rig.cycle();
    rig.disconnect();
    rig.cycles(3);
    assert_eq!(rig.radio.advertising_starts(), 2);
}

#[test]
fn reconnect_restores_report_cadence() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    rig.connect();
    rig.cycle();
    rig.disconnect();
    rig.cycles(2);
    rig.radio.clear();
    rig.clock.sleeps_ms.clear();

    rig.connect();
    let reports = rig.cycles(3);
    assert_eq!(reports[0].edge, Some(LinkEdge::Connected));
    assert_eq!(rig.clock.sleeps_ms, [500, 500, 500]);
    assert_eq!(rig.radio.notifications(), ["S", "S", "S"]);
    assert_eq!(rig.radio.advertising_starts(), 0);
}

#[test]
fn flap_within_one_cycle_does_not_readvertise() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    rig.connect();
    rig.cycle();
    rig.disconnect();
    rig.connect();
    let report = rig.cycle();
    assert_eq!(report.edge, None);
    assert!(!report.readvertised);
    assert_eq!(report.sent, Some(StatusMessage::Safe));
    assert_eq!(rig.radio.advertising_starts(), 1);
}

#[test]
fn failed_readvertise_is_retried_each_cycle() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    rig.connect();
    rig.cycle();
    rig.radio.fail_advertising = 2;
    rig.disconnect();

    let reports = rig.cycles(4);
    let readvertised: Vec<bool> = reports.iter().map(|r| r.readvertised).collect();
    assert_eq!(readvertised, [false, false, true, false]);
    assert_eq!(rig.radio.advertising_starts(), 1 + 3);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::AdvertisingFailed(CommsError::AdvertisingFailed)),
        2
    );
    assert_eq!(rig.sink.count(|e| *e == AppEvent::AdvertisingRestarted), 1);
}

#[test]
fn startup_advertises_before_first_cycle() {
    let rig = Rig::new(MockSensor::steady(DARK));
    assert_eq!(rig.radio.calls, [RadioCall::StartAdvertising]);
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Started));
    assert_eq!(rig.app.cycle_count(), 0);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn sensor_fault_skips_latch_and_reports_state() {
    let mut rig = Rig::new(MockSensor::steady(DARK));
    rig.connect();
    rig.sensor.fail_with(SensorError::AdcReadFailed);
    let report = rig.cycle();

    assert_eq!(report.sample, Err(SensorError::AdcReadFailed));
    assert!(!report.light_present);
    assert_eq!(report.sent, Some(StatusMessage::Safe));
    assert!(!rig.app.violation_state().violated);
}

#[test]
fn sensor_fault_token_when_enabled() {
    let mut config = test_config();
    config.sensor_fault_token = true;
    let mut rig = Rig::with_config(config, MockSensor::steady(LIGHT));
    rig.connect();
    rig.cycle();
    rig.sensor.fail_with(SensorError::OutOfRange);
    rig.cycle();
    rig.cycle();
    rig.sensor.set(DARK);
    rig.cycle();

    assert_eq!(rig.radio.notifications(), ["V:0", "E", "E", "V:1500"]);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::SensorFault(_))),
        1
    );
    assert_eq!(rig.sink.count(|e| *e == AppEvent::SensorRecovered), 1);
}
