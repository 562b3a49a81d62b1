//! Fuzz target: characteristic writes through `AppService`
//!
//! Splits the input into writes. Before each one the service runs a cycle
//! under light, so a violation is latched; afterwards only an exact
//! `RESET` may have cleared it.
//!
//! cargo fuzz run fuzz_inbound_write

#![no_main]

use embedded_hal::delay::DelayNs;
use libfuzzer_sys::fuzz_target;
use suitcase::app::events::AppEvent;
use suitcase::app::ports::{ClockPort, EventSink, RadioPort, SensorPort};
use suitcase::app::service::AppService;
use suitcase::config::SystemConfig;
use suitcase::error::{CommsError, SensorError};
use suitcase::events::{EventQueue, LinkEvent};

struct Lit;
impl SensorPort for Lit {
    fn read_light(&mut self) -> Result<u16, SensorError> {
        Ok(0)
    }
}

struct Mute;
impl RadioPort for Mute {
    fn start_advertising(&mut self) -> Result<(), CommsError> {
        Ok(())
    }
    fn notify(&mut self, _payload: &str) -> Result<(), CommsError> {
        Ok(())
    }
}

struct Clock(u64);
impl ClockPort for Clock {
    fn now_ms(&self) -> u64 {
        self.0 / 1_000_000
    }
}
impl DelayNs for Clock {
    fn delay_ns(&mut self, ns: u32) {
        self.0 += u64::from(ns);
    }
}

struct Discard;
impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(SystemConfig::default());
    let events = EventQueue::new();
    let (mut hw, mut radio, mut clock, mut sink) = (Lit, Mute, Clock(0), Discard);

    for write in data.split(|b| *b == b'\n') {
        app.run_cycle(&events, &mut hw, &mut radio, &mut clock, &mut sink);
        assert!(app.violation_state().violated);

        app.handle_event(LinkEvent::command(write), &mut sink);
        assert_eq!(app.violation_state().violated, write != b"RESET");
    }
});
