//! Mock adapters for integration tests.
//!
//! The radio records every advertising start and notification, the sensor
//! replays a script, and the clock only moves when the cycle sleeps, so
//! elapsed times in status messages are exact.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use suitcase::app::events::AppEvent;
use suitcase::app::ports::{ClockPort, EventSink, RadioPort, SensorPort};
use suitcase::config::SystemConfig;
use suitcase::error::{CommsError, SensorError};
use suitcase::violation::{Millis, RawSample};

// ── MockSensor ────────────────────────────────────────────────

/// Replays scripted samples; repeats the last one once the script runs out.
pub struct MockSensor {
    script: VecDeque<Result<RawSample, SensorError>>,
    last: Result<RawSample, SensorError>,
    pub reads: u32,
}

#[allow(dead_code)]
impl MockSensor {
    /// Constant reading.
    pub fn steady(raw: RawSample) -> Self {
        Self::script(&[raw])
    }

    pub fn script(samples: &[RawSample]) -> Self {
        Self {
            script: samples.iter().copied().map(Ok).collect(),
            last: Ok(4095),
            reads: 0,
        }
    }

    pub fn set(&mut self, raw: RawSample) {
        self.script.clear();
        self.last = Ok(raw);
    }

    pub fn fail_with(&mut self, e: SensorError) {
        self.script.clear();
        self.last = Err(e);
    }
}

impl SensorPort for MockSensor {
    fn read_light(&mut self) -> Result<RawSample, SensorError> {
        self.reads += 1;
        if let Some(next) = self.script.pop_front() {
            self.last = next;
        }
        self.last
    }
}

// ── MockRadio ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum RadioCall {
    StartAdvertising,
    Notify(String),
}

#[derive(Default)]
pub struct MockRadio {
    pub calls: Vec<RadioCall>,
    /// Fail this many upcoming advertising requests.
    pub fail_advertising: u32,
}

#[allow(dead_code)]
impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RadioCall::Notify(p) => Some(p.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn advertising_starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == RadioCall::StartAdvertising)
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RadioPort for MockRadio {
    fn start_advertising(&mut self) -> Result<(), CommsError> {
        self.calls.push(RadioCall::StartAdvertising);
        if self.fail_advertising > 0 {
            self.fail_advertising -= 1;
            return Err(CommsError::AdvertisingFailed);
        }
        Ok(())
    }

    fn notify(&mut self, payload: &str) -> Result<(), CommsError> {
        self.calls.push(RadioCall::Notify(payload.to_string()));
        Ok(())
    }
}

// ── VirtualClock ──────────────────────────────────────────────

/// Monotonic clock advanced only by the delays it is asked for.
#[derive(Default)]
pub struct VirtualClock {
    now_ns: u64,
    pub sleeps_ms: Vec<u32>,
}

#[allow(dead_code)]
impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.now_ns += ms * 1_000_000;
    }
}

impl ClockPort for VirtualClock {
    fn now_ms(&self) -> Millis {
        self.now_ns / 1_000_000
    }
}

impl DelayNs for VirtualClock {
    fn delay_ns(&mut self, ns: u32) {
        self.now_ns += u64::from(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleeps_ms.push(ms);
        self.now_ns += u64::from(ms) * 1_000_000;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Config ────────────────────────────────────────────────────

/// Default configuration with the reference timing.
#[allow(dead_code)]
pub fn test_config() -> SystemConfig {
    SystemConfig::default()
}
