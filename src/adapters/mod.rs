//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                 |
//! |------------|---------------------|-----------------------------|
//! | `ble`      | RadioPort           | Bluedroid GATT server       |
//! | `hardware` | SensorPort          | ESP32-C3 ADC1 (LDR)         |
//! | `log_sink` | EventSink           | Serial log output           |
//! | `time`     | ClockPort, DelayNs  | ESP32 system timer, FreeRTOS|

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub(crate) mod utils;
