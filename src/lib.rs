//! Smart suitcase firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod link;
pub mod pins;
pub mod status;
pub mod violation;

// The ESP-IDF-only modules are compiled everywhere; the hardware paths
// are guarded by cfg attributes inside and fall back to simulation stubs.
pub mod adapters;
pub mod drivers;
pub mod sensors;
