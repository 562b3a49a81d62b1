//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (light sensor, BLE radio, clock, event sink) implement
//! these traits. The [`AppService`](super::service::AppService) consumes
//! them via generics, so the domain core never touches hardware directly.
//! Blocking delays go through [`embedded_hal::delay::DelayNs`], which the
//! clock adapter implements alongside [`ClockPort`] so tests can run the
//! cycle on a virtual clock.

use crate::error::{CommsError, SensorError};
use crate::violation::{Millis, RawSample};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one fresh light sample per cycle.
pub trait SensorPort {
    fn read_light(&mut self) -> Result<RawSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → BLE peripheral)
// ───────────────────────────────────────────────────────────────

/// The single-service, single-characteristic GATT peripheral.
pub trait RadioPort {
    /// (Re)start advertising so an unconnected peer can find us.
    fn start_advertising(&mut self) -> Result<(), CommsError>;

    /// Store `payload` as the characteristic value and push it to the
    /// connected peer as a notification.
    fn notify(&mut self, payload: &str) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: monotonic time)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> Millis;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
