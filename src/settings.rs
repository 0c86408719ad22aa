//! Remote settings synchroniser.
//!
//! Five tunables are registered with the cloud settings service at start-up.
//! Each delivery is validated (kind, bounds) and then applied to the local
//! registry.  The registry tracks which keys have been received at least
//! once; the scheduler waits on the all-received gate before the first
//! publish so it never reports with unknown calibration.
//!
//! ```text
//!   SettingsTransport ──register──▶ cloud
//!   cloud ──DeviceEvent::Setting──▶ SettingsRegistry::deliver
//!                                        │ changed STREAM_DELAY_S
//!                                        ▼
//!                                   scheduler wake
//! ```
//!
//! The gate fires once per arm cycle.  [`SettingsRegistry::reset`] (or a
//! full [`SettingsRegistry::init`]) clears every received flag and re-arms
//! it, e.g. after the session reconnects.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{error, info, trace, warn};

use crate::app::ports::SettingsTransport;
use crate::config::{
    ACCEL_NUM_SAMPLES_MAX, ACCEL_NUM_SAMPLES_MIN, ACCEL_SAMPLE_DELAY_MS_MAX,
    ACCEL_SAMPLE_DELAY_MS_MIN, DeviceConfig, STREAM_DELAY_S_MAX, STREAM_DELAY_S_MIN,
};

// ═══════════════════════════════════════════════════════════════
//  Keys and values
// ═══════════════════════════════════════════════════════════════

/// The fixed set of remotely configurable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    StreamDelayS,
    FloatLength,
    FloatOffset,
    AccelNumSamples,
    AccelSampleDelayMs,
}

pub const SETTING_COUNT: usize = 5;

impl SettingKey {
    /// Registration order.
    pub const ALL: [SettingKey; SETTING_COUNT] = [
        Self::StreamDelayS,
        Self::FloatLength,
        Self::FloatOffset,
        Self::AccelNumSamples,
        Self::AccelSampleDelayMs,
    ];

    /// Name used on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Self::StreamDelayS => "STREAM_DELAY_S",
            Self::FloatLength => "FLOAT_LENGTH",
            Self::FloatOffset => "FLOAT_OFFSET",
            Self::AccelNumSamples => "ACCEL_NUM_SAMPLES",
            Self::AccelSampleDelayMs => "ACCEL_SAMPLE_DELAY_MS",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// Integer keys carry a range; float calibration keys are unbounded.
    pub const fn bounds(self) -> Option<Bounds> {
        match self {
            Self::StreamDelayS => Some(Bounds::new(STREAM_DELAY_S_MIN, STREAM_DELAY_S_MAX)),
            Self::AccelNumSamples => {
                Some(Bounds::new(ACCEL_NUM_SAMPLES_MIN, ACCEL_NUM_SAMPLES_MAX))
            }
            Self::AccelSampleDelayMs => Some(Bounds::new(
                ACCEL_SAMPLE_DELAY_MS_MIN,
                ACCEL_SAMPLE_DELAY_MS_MAX,
            )),
            Self::FloatLength | Self::FloatOffset => None,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, Self::FloatLength | Self::FloatOffset)
    }
}

/// Inclusive integer range enforced before a value reaches the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i32,
    pub max: i32,
}

impl Bounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn contains(&self, v: i32) -> bool {
        v >= self.min && v <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Int(i32),
    Float(f32),
}

/// Outcome of one delivery, reported back to the settings service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Accepted,
    OutOfRange,
    WrongType,
    NotRegistered,
}

/// What [`SettingsRegistry::deliver`] did with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub status: DeliveryStatus,
    /// The stored value changed.
    pub changed: bool,
    /// The duty-cycle interval changed; the caller must wake the scheduler.
    pub wake: bool,
}

impl Delivery {
    const fn rejected(status: DeliveryStatus) -> Self {
        Self {
            status,
            changed: false,
            wake: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingEntry {
    pub value: SettingValue,
    pub received: bool,
    pub registered: bool,
    pub bounds: Option<Bounds>,
}

// ═══════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════

struct Inner {
    entries: [SettingEntry; SETTING_COUNT],
    fired: bool,
}

impl Inner {
    fn all_received(&self) -> bool {
        self.entries.iter().all(|e| e.received)
    }
}

/// Current values plus per-key received tracking and the readiness gate.
pub struct SettingsRegistry {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner>>,
    gate: Signal<CriticalSectionRawMutex, ()>,
}

impl SettingsRegistry {
    /// Seed every key from the compile-time defaults.  Nothing is
    /// registered or received yet.
    pub fn new(defaults: &DeviceConfig) -> Self {
        let entry = |key: SettingKey, value: SettingValue| SettingEntry {
            value,
            received: false,
            registered: false,
            bounds: key.bounds(),
        };
        let entries = [
            entry(
                SettingKey::StreamDelayS,
                SettingValue::Int(defaults.stream_delay_s),
            ),
            entry(
                SettingKey::FloatLength,
                SettingValue::Float(defaults.float_length_in),
            ),
            entry(
                SettingKey::FloatOffset,
                SettingValue::Float(defaults.float_offset_in),
            ),
            entry(
                SettingKey::AccelNumSamples,
                SettingValue::Int(defaults.accel_num_samples),
            ),
            entry(
                SettingKey::AccelSampleDelayMs,
                SettingValue::Int(defaults.accel_sample_delay_ms),
            ),
        ];

        Self {
            inner: Mutex::new(RefCell::new(Inner {
                entries,
                fired: false,
            })),
            gate: Signal::new(),
        }
    }

    /// (Re-)register every key with the settings service and re-arm the
    /// gate.  A key that fails to register is logged and stays
    /// unregistered, so the gate cannot fire until the next `init`.
    pub fn init<T: SettingsTransport>(&self, transport: &mut T) {
        transport.reset();
        self.reset();

        for key in SettingKey::ALL {
            let ok = match transport.register(key, key.bounds()) {
                Ok(()) => true,
                Err(e) => {
                    error!("Failed to register settings callback for {}: {}", key.name(), e);
                    false
                }
            };
            self.inner.lock(|c| {
                c.borrow_mut().entries[key.index()].registered = ok;
            });
        }
    }

    /// Apply one remote delivery.  Runs in callback context: no I/O and
    /// no blocking beyond the registry's critical section.
    #[allow(clippy::float_cmp)]
    pub fn deliver(&self, key: SettingKey, value: SettingValue) -> Delivery {
        let (delivery, fire) = self.inner.lock(|c| {
            let mut inner = c.borrow_mut();
            let entry = &mut inner.entries[key.index()];

            if !entry.registered {
                return (Delivery::rejected(DeliveryStatus::NotRegistered), false);
            }

            let changed = match (entry.value, value) {
                (SettingValue::Int(cur), SettingValue::Int(new)) => {
                    if let Some(b) = entry.bounds {
                        if !b.contains(new) {
                            return (Delivery::rejected(DeliveryStatus::OutOfRange), false);
                        }
                    }
                    cur != new
                }
                (SettingValue::Float(cur), SettingValue::Float(new)) => cur != new,
                _ => return (Delivery::rejected(DeliveryStatus::WrongType), false),
            };

            if changed {
                entry.value = value;
            }
            entry.received = true;

            let fire = !inner.fired && inner.all_received();
            if fire {
                inner.fired = true;
            }

            let delivery = Delivery {
                status: DeliveryStatus::Accepted,
                changed,
                wake: changed && key == SettingKey::StreamDelayS,
            };
            (delivery, fire)
        });

        match delivery.status {
            DeliveryStatus::Accepted if delivery.changed => match value {
                SettingValue::Int(v) => info!("Set {} setting to {}", key.name(), v),
                SettingValue::Float(v) => info!("Set {} setting to {:.6}", key.name(), v),
            },
            DeliveryStatus::Accepted => {
                trace!("Received {} setting already matches local value.", key.name());
            }
            rejected => warn!("{} delivery rejected: {:?}", key.name(), rejected),
        }

        if fire {
            info!("All settings registered successfully");
            self.gate.signal(());
        }

        delivery
    }

    /// Every key has been received at least once since the last reset.
    pub fn ready(&self) -> bool {
        self.inner.lock(|c| c.borrow().all_received())
    }

    /// Wait for the all-received gate.
    pub async fn wait_ready(&self) {
        info!("Waiting for settings to be registered...");
        while !self.ready() {
            self.gate.wait().await;
        }
    }

    /// Clear every received flag and re-arm the gate.  Values are kept.
    pub fn reset(&self) {
        self.inner.lock(|c| {
            let mut inner = c.borrow_mut();
            for e in inner.entries.iter_mut() {
                e.received = false;
            }
            inner.fired = false;
        });
        self.gate.reset();
    }

    pub fn entry(&self, key: SettingKey) -> SettingEntry {
        self.inner.lock(|c| c.borrow().entries[key.index()])
    }

    fn int(&self, key: SettingKey) -> i32 {
        match self.entry(key).value {
            SettingValue::Int(v) => v,
            SettingValue::Float(v) => v as i32,
        }
    }

    fn float(&self, key: SettingKey) -> f32 {
        match self.entry(key).value {
            SettingValue::Float(v) => v,
            SettingValue::Int(v) => v as f32,
        }
    }

    pub fn stream_delay_s(&self) -> i32 {
        self.int(SettingKey::StreamDelayS)
    }

    pub fn accel_num_samples(&self) -> i32 {
        self.int(SettingKey::AccelNumSamples)
    }

    pub fn accel_sample_delay_ms(&self) -> i32 {
        self.int(SettingKey::AccelSampleDelayMs)
    }

    pub fn float_length_in(&self) -> f32 {
        self.float(SettingKey::FloatLength)
    }

    pub fn float_offset_in(&self) -> f32 {
        self.float(SettingKey::FloatOffset)
    }
}
