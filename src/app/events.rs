//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them; the firmware logs them to the serial
//! console.

use crate::error::{CommsError, SensorError};
use crate::events::CommandPayload;
use crate::violation::{Millis, RawSample};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started and requested the first advertising round.
    Started,

    /// Light seen while safe; the latch is now set.
    ViolationLatched { at_ms: Millis, raw: RawSample },

    /// A `RESET` cleared a latched violation.
    ViolationCleared,

    /// A `RESET` arrived while already safe (no-op).
    ResetWhileSafe,

    /// A non-empty write that is not a known command.
    CommandIgnored(CommandPayload),

    PeerConnected,
    PeerDisconnected,

    /// Advertising restarted after a disconnect edge.
    AdvertisingRestarted,
    AdvertisingFailed(CommsError),

    /// A status notification could not be delivered.
    NotifyFailed(CommsError),

    /// The light sensor stopped returning usable samples.
    SensorFault(SensorError),
    /// The light sensor is back after a fault.
    SensorRecovered,
}
