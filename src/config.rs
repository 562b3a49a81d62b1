//! System configuration parameters
//!
//! All tunable parameters for the suitcase firmware. Values are fixed at
//! build time (there is no persistent store); tests construct their own
//! with accelerated cadences.

use serde::{Deserialize, Serialize};

use crate::adapters::utils::is_printable_ascii;
use crate::error::Error;
use crate::violation::{LightPolarity, RAW_SAMPLE_MAX};

/// Advertised BLE name the paired app searches for.
pub const DEFAULT_DEVICE_NAME: &str = "MALA_INTELIGENTE";

/// Upper bound on the advertised name. Bluedroid shortens it in the
/// advertising packet when it does not fit next to the service UUID.
pub const MAX_DEVICE_NAME_LEN: usize = 24;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity ---
    /// BLE advertised name.
    pub device_name: heapless::String<MAX_DEVICE_NAME_LEN>,

    // --- Light detection ---
    /// Raw ADC threshold separating dark from light.
    pub light_threshold: u16,
    /// Which side of the threshold counts as light.
    pub polarity: LightPolarity,

    // --- Timing ---
    /// Sleep after a report while a peer is connected (milliseconds).
    pub report_interval_ms: u32,
    /// Sleep per cycle while no peer is connected (milliseconds).
    pub idle_interval_ms: u32,
    /// Delay between a disconnect edge and re-advertising (milliseconds).
    pub readvertise_settle_ms: u32,

    // --- Faults ---
    /// Report `E` instead of the latch state when the sensor read fails.
    pub sensor_fault_token: bool,
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        device_name.push_str(DEFAULT_DEVICE_NAME).ok();
        Self {
            device_name,

            light_threshold: 2000,
            polarity: LightPolarity::LowMeansLight,

            report_interval_ms: 500,
            idle_interval_ms: 100,
            readvertise_settle_ms: 500,

            sensor_fault_token: false,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Longest single blocking stretch of one main cycle.
    pub fn worst_case_cycle_ms(&self) -> u32 {
        self.report_interval_ms
            .max(self.idle_interval_ms)
            .saturating_add(self.readvertise_settle_ms)
    }

    /// Reject values that would brick discovery or stall the cycle.
    pub fn validate(&self) -> Result<(), Error> {
        if self.device_name.is_empty() {
            return Err(Error::Config("device_name must not be empty"));
        }
        if !is_printable_ascii(&self.device_name) {
            return Err(Error::Config("device_name must be printable ASCII"));
        }
        if self.light_threshold == 0 || self.light_threshold > RAW_SAMPLE_MAX {
            return Err(Error::Config("light_threshold must be within 1..=4095"));
        }
        if self.report_interval_ms == 0 || self.idle_interval_ms == 0 {
            return Err(Error::Config("cycle intervals must be non-zero"));
        }
        if self.watchdog_timeout_ms <= self.worst_case_cycle_ms() {
            return Err(Error::Config(
                "watchdog_timeout_ms must exceed the longest cycle",
            ));
        }
        Ok(())
    }
}
