//! Smart Suitcase Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   BleAdapter     LogEventSink   Esp32Time     │
//! │  (SensorPort)      (RadioPort)    (EventSink)    (Clock+Delay) │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  ViolationLatch · LinkTracker · status reporter        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Bluedroid callbacks ──▶ LINK_EVENTS ──▶ main cycle            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use suitcase::adapters::ble::BleAdapter;
use suitcase::adapters::hardware::HardwareAdapter;
use suitcase::adapters::log_sink::LogEventSink;
use suitcase::adapters::time::Esp32TimeAdapter;
use suitcase::app::service::AppService;
use suitcase::config::SystemConfig;
use suitcase::drivers::{hw_init, watchdog::Watchdog};
use suitcase::events::LINK_EVENTS;
use suitcase::pins;
use suitcase::sensors::light::LightSensor;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Smart Suitcase v{}                  ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (build-time constants) ───────────────
    let config = SystemConfig::default();
    config.validate()?;
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config could not be serialised for logging: {}", e),
    }

    // ── 3. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without the LDR there is nothing to guard; the task watchdog
        // is not armed yet, so halt here and let a power cycle recover.
        error!("HAL init failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }
    let mut watchdog = Watchdog::new(config.watchdog_timeout_ms);

    let mut hw = HardwareAdapter::new(LightSensor::new(
        pins::LDR_ADC_GPIO,
        pins::LDR_ADC_CHANNEL,
    ));
    let mut clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 4. BLE stack + GATT service ───────────────────────────
    let mut ble = BleAdapter::new(config.device_name.clone());
    ble.start()?;

    // ── 5. App service + first advertising round ──────────────
    let mut app = AppService::new(config);
    app.start(&mut ble, &mut log_sink);
    info!("Waiting for a client connection...");

    // ── 6. Main cycle ─────────────────────────────────────────
    loop {
        let report = app.run_cycle(&LINK_EVENTS, &mut hw, &mut ble, &mut clock, &mut log_sink);
        log::trace!("cycle {}: {:?}", app.cycle_count(), report);
        watchdog.feed();
    }
}
