//! Application core — device context, ports and outbound events.
//!
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`].  Shared state that asynchronous callbacks
//! touch lives in one [`context::DeviceContext`], created once at start-up
//! and handed to the scheduler, the battery loop and the adapters.

pub mod context;
pub mod events;
pub mod ports;
