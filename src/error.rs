//! Unified error types for the suitcase firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level cycle's error handling uniform. All variants are `Copy` so they
//! can be carried inside [`AppEvent`](crate::app::events::AppEvent)s without
//! allocation.
//!
//! Nothing here is fatal at runtime: the main cycle logs every error and
//! carries on. A stalled cycle is recovered by the task watchdog.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The light sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// The BLE link failed (advertising, notification, stack bring-up).
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// Reading is outside the 12-bit ADC range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl core::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Controller / Bluedroid bring-up failed; the radio is unusable.
    BleInitFailed,
    /// The stack refused to (re)start advertising.
    AdvertisingFailed,
    /// No peer is connected, so there is nobody to notify.
    NotConnected,
    /// The stack rejected the notification.
    NotifyFailed,
    /// Payload does not fit the characteristic.
    PayloadTooLong,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BleInitFailed => write!(f, "BLE init failed"),
            Self::AdvertisingFailed => write!(f, "BLE advertising start failed"),
            Self::NotConnected => write!(f, "no peer connected"),
            Self::NotifyFailed => write!(f, "BLE notify failed"),
            Self::PayloadTooLong => write!(f, "payload exceeds characteristic length"),
        }
    }
}

impl core::error::Error for CommsError {}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
