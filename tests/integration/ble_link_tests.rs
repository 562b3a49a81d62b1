//! End-to-end link flow: simulated BLE peer ↔ BleAdapter ↔ AppService.

use suitcase::adapters::ble::{BleAdapter, BleState};
use suitcase::app::service::AppService;
use suitcase::config::SystemConfig;
use suitcase::events::EventQueue;

use super::mock_hw::{MockSensor, RecordingSink, VirtualClock};

struct Device {
    app: AppService,
    ble: BleAdapter,
    events: EventQueue,
    sensor: MockSensor,
    clock: VirtualClock,
    sink: RecordingSink,
}

impl Device {
    fn boot(sensor: MockSensor) -> Self {
        let config = SystemConfig::default();
        let mut ble = BleAdapter::new(config.device_name.clone());
        ble.start().unwrap();
        let mut sink = RecordingSink::new();
        let mut app = AppService::new(config);
        app.start(&mut ble, &mut sink);
        Self {
            app,
            ble,
            events: EventQueue::new(),
            sensor,
            clock: VirtualClock::new(),
            sink,
        }
    }

    fn cycle(&mut self) {
        self.app.run_cycle(
            &self.events,
            &mut self.sensor,
            &mut self.ble,
            &mut self.clock,
            &mut self.sink,
        );
    }
}

#[test]
fn boot_leaves_device_discoverable() {
    let dev = Device::boot(MockSensor::steady(3000));
    assert_eq!(dev.ble.state(), BleState::Advertising);
    assert_eq!(dev.ble.adv_starts(), 1);
    assert_eq!(dev.ble.value(), "S");
}

#[test]
fn peer_sees_violation_then_clears_it() {
    let mut dev = Device::boot(MockSensor::script(&[3000, 1500, 3000]));
    dev.ble.sim_peer_connect(&dev.events);
    dev.cycle();
    assert_eq!(dev.ble.value(), "S");

    dev.cycle();
    assert_eq!(dev.ble.value(), "V:0");
    dev.cycle();
    assert_eq!(dev.ble.value(), "V:500");

    dev.ble.sim_peer_write(&dev.events, b"RESET");
    dev.cycle();
    assert_eq!(dev.ble.value(), "S");
    assert_eq!(dev.ble.notifications(), 4);
}

#[test]
fn dropped_peer_gets_advertising_back_once() {
    let mut dev = Device::boot(MockSensor::steady(3000));
    dev.ble.sim_peer_connect(&dev.events);
    dev.cycle();
    assert_eq!(dev.ble.state(), BleState::Connected);

    dev.ble.sim_peer_disconnect(&dev.events);
    assert_eq!(dev.ble.state(), BleState::Idle);
    dev.cycle();
    assert_eq!(dev.ble.state(), BleState::Advertising);

    for _ in 0..20 {
        dev.cycle();
    }
    assert_eq!(dev.ble.adv_starts(), 2);
    assert_eq!(dev.app.readvertise_count(), 1);

    // A second session works the same way.
    dev.ble.sim_peer_connect(&dev.events);
    dev.cycle();
    dev.ble.sim_peer_disconnect(&dev.events);
    dev.cycle();
    assert_eq!(dev.ble.adv_starts(), 3);
}

#[test]
fn write_flood_does_not_hide_a_disconnect() {
    let mut dev = Device::boot(MockSensor::steady(3000));
    dev.ble.sim_peer_connect(&dev.events);
    dev.cycle();

    for _ in 0..20 {
        dev.ble.sim_peer_write(&dev.events, b"PING");
    }
    dev.ble.sim_peer_disconnect(&dev.events);
    for _ in 0..50 {
        dev.cycle();
    }

    assert!(!dev.app.is_connected());
    assert_eq!(dev.ble.state(), BleState::Advertising);
    assert_eq!(dev.ble.adv_starts(), 2);
    assert_eq!(dev.app.readvertise_count(), 1);
}

#[test]
fn write_flood_does_not_hide_a_connect() {
    let mut dev = Device::boot(MockSensor::steady(3000));
    for _ in 0..20 {
        dev.ble.sim_peer_write(&dev.events, b"PING");
    }
    dev.ble.sim_peer_connect(&dev.events);
    dev.cycle();

    assert!(dev.app.is_connected());
    assert_eq!(dev.ble.notifications(), 1);
    assert_eq!(dev.ble.value(), "S");
}

#[test]
fn nothing_is_notified_without_a_peer() {
    let mut dev = Device::boot(MockSensor::steady(1500));
    for _ in 0..5 {
        dev.cycle();
    }
    assert_eq!(dev.ble.notifications(), 0);
    assert!(dev.app.violation_state().violated);
}
