//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler / BatteryMonitor (domain)
//! ```
//!
//! Driven adapters (accelerometer, charger, fuel-gauge model, cloud client,
//! modem, flash power, timers, event sinks) implement these traits.  The
//! domain consumes them via generics, so it never touches hardware or the
//! network stack directly and every path is testable with mocks.

use core::future::Future;
use core::time::Duration;

use crate::battery::{ChargerReading, ExtStateUpdate, GaugeInit};
use crate::connectivity::NetworkEvent;
use crate::error::{CloudError, GaugeError, PowerError, SensorError, SettingsError};
use crate::settings::{Bounds, SettingKey};
use crate::telemetry::AccelSample;

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One-shot accelerometer read, in m/s² per axis.
pub trait AccelerometerPort {
    fn read(&mut self) -> Result<AccelSample, SensorError>;
}

/// Charger / PMIC channels consumed by the fuel-gauge monitor.
pub trait ChargerPort {
    /// Fetch voltage, average current, temperature and the raw
    /// charge-status bitmask in one transaction.
    fn read(&mut self) -> Result<ChargerReading, SensorError>;

    /// Maximum desired charging current (A).
    fn desired_charge_current(&mut self) -> Result<f32, SensorError>;

    /// Whether VBUS is present right now.  Read once at start-up; edges
    /// after that arrive through [`crate::events::DeviceEvent::Vbus`].
    fn vbus_present(&mut self) -> Result<bool, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Fuel-gauge model (external algorithm, call contract only)
// ───────────────────────────────────────────────────────────────

/// Call contract of the vendor battery model.
///
/// `process` may be handed any non-negative delta; the monitor never
/// passes a zero delta (see [`crate::battery::BatteryMonitor::sample`]).
pub trait FuelGaugeModel {
    fn init(&mut self, params: &GaugeInit) -> Result<(), GaugeError>;
    fn update(&mut self, update: ExtStateUpdate) -> Result<(), GaugeError>;
    /// Advance the model; returns state of charge in percent.
    fn process(&mut self, voltage_v: f32, current_a: f32, temp_c: f32, delta_s: f32) -> f32;
    /// Time to empty in seconds.  Non-finite when not applicable.
    fn tte(&self) -> f32;
    /// Time to full in seconds.  Non-finite when not applicable.
    fn ttf(&self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Cloud session (driven adapter: domain → cloud client)
// ───────────────────────────────────────────────────────────────

/// Payload content type for stream pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Cbor,
    Json,
}

/// The cloud client's session lifecycle plus stream publishing.
///
/// Connection completion is reported asynchronously through
/// [`crate::events::DeviceEvent::Session`]; `start` only kicks it off.
pub trait CloudSession {
    fn is_running(&self) -> bool;
    fn start(&mut self) -> Result<(), CloudError>;
    fn stop(&mut self);
    fn is_connected(&self) -> bool;
    fn stream_set(
        &mut self,
        path: &str,
        content_type: ContentType,
        payload: &[u8],
    ) -> Result<(), CloudError>;
}

/// Registration side of the cloud settings service.
pub trait SettingsTransport {
    /// Drop every previous registration (re-initialisation).
    fn reset(&mut self);

    /// Register one key.  `bounds` is `None` for unbounded float keys.
    fn register(&mut self, key: SettingKey, bounds: Option<Bounds>) -> Result<(), SettingsError>;
}

// ───────────────────────────────────────────────────────────────
// Network link (driven adapter: domain → modem)
// ───────────────────────────────────────────────────────────────

/// Handler that receives every link-layer status event.
pub type NetworkHandler = Box<dyn FnMut(NetworkEvent) + Send>;

pub trait LinkPort {
    /// Issue a non-blocking attach request.  Status arrives on `handler`.
    fn connect_async(&mut self, handler: NetworkHandler) -> crate::error::Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Peripheral power (driven adapter: domain → PM)
// ───────────────────────────────────────────────────────────────

/// Resume/suspend control for the auxiliary storage device.
pub trait PeripheralPower {
    fn resume(&mut self) -> Result<(), PowerError>;
    fn suspend(&mut self) -> Result<(), PowerError>;
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Monotonic uptime source.
pub trait ClockPort {
    fn uptime_ms(&self) -> u64;
}

/// Non-blocking sleep.  Other tasks on the executor keep running.
pub trait TimerPort {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
