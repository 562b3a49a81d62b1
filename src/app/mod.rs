//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the suitcase: the
//! violation latch, command interpretation, link edge handling and the
//! status report cadence. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
