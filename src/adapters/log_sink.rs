//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::commands::display_text;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | advertising, waiting for connection"),
            AppEvent::ViolationLatched { at_ms, raw } => {
                warn!("LATCH | violation at t={}ms (raw={})", at_ms, raw);
            }
            AppEvent::ViolationCleared => info!("CLEAR | alarm reset by peer"),
            AppEvent::ResetWhileSafe => info!("CLEAR | reset while already safe"),
            AppEvent::CommandIgnored(payload) => {
                info!("CMD   | ignored {:?}", display_text(payload));
            }
            AppEvent::PeerConnected => info!("LINK  | peer connected"),
            AppEvent::PeerDisconnected => info!("LINK  | peer disconnected"),
            AppEvent::AdvertisingRestarted => info!("ADV   | restarted"),
            AppEvent::AdvertisingFailed(e) => warn!("ADV   | failed: {}", e),
            AppEvent::NotifyFailed(e) => warn!("LINK  | notify failed: {}", e),
            AppEvent::SensorFault(e) => warn!("SENSOR| fault: {}", e),
            AppEvent::SensorRecovered => info!("SENSOR| recovered"),
        }
    }
}
