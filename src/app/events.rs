//! Outbound application events.
//!
//! The scheduler and battery loop emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — log to serial, count them in a
//! test, forward them somewhere else.

use crate::battery::BatteryStatus;
use crate::scheduler::CycleReport;
use crate::telemetry::TelemetryFrame;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// Network registered and settings synchronised; the duty cycle begins.
    Started { stream_delay_s: i32 },

    /// A telemetry frame was sampled (published or not).
    Telemetry(TelemetryFrame),

    /// Fuel-gauge sample.
    Battery(BatteryStatus),

    /// One duty cycle finished, just before sleeping.
    CycleCompleted(CycleReport),
}
