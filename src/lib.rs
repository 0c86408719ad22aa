//! FloatLevel firmware library.
//!
//! Exposes the duty-cycle core, its port traits and the adapters for
//! integration testing and bench runs.  All ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod battery;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod events;
pub mod ota;
pub mod scheduler;
pub mod settings;
pub mod telemetry;

pub mod adapters;
