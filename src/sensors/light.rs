//! LDR (light-dependent resistor) driver.
//!
//! Reads the divider midpoint through an ESP32-C3 ADC1 channel and returns
//! the raw 12-bit value. No calibration or filtering: the threshold
//! comparison in [`crate::violation`] is the whole signal chain.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the LDR channel via the oneshot API (initialised by
//! `hw_init`). On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::SensorError;
use crate::violation::{RAW_SAMPLE_MAX, RawSample};

#[cfg(not(target_os = "espidf"))]
static SIM_LDR_ADC: AtomicU16 = AtomicU16::new(RAW_SAMPLE_MAX);

/// Set the value the next host-side read returns. Values above the ADC
/// range simulate a faulty channel.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ldr_adc(raw: u16) {
    SIM_LDR_ADC.store(raw, Ordering::Relaxed);
}

pub struct LightSensor {
    total_reads: u32,
    _adc_gpio: i32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    adc_channel: u32,
}

impl LightSensor {
    pub fn new(adc_gpio: i32, adc_channel: u32) -> Self {
        Self {
            total_reads: 0,
            _adc_gpio: adc_gpio,
            adc_channel,
        }
    }

    /// Samples taken since boot (including failed ones).
    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    pub fn read(&mut self) -> Result<RawSample, SensorError> {
        self.total_reads = self.total_reads.saturating_add(1);
        let raw = self.read_adc()?;
        if raw > RAW_SAMPLE_MAX {
            return Err(SensorError::OutOfRange);
        }
        Ok(raw)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        crate::drivers::hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(SIM_LDR_ADC.load(Ordering::Relaxed))
    }
}
