//! Sensor subsystem.
//!
//! The suitcase has exactly one sensor: a light-dependent resistor read
//! through ADC1 once per main cycle.

pub mod light;
