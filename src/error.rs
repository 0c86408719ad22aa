//! Unified error types for the FloatLevel firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! duty-cycle loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through event sinks and cycle reports without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor or charger channel could not be read.
    Sensor(SensorError),
    /// The fuel-gauge model rejected an init or state update.
    Gauge(GaugeError),
    /// The telemetry payload could not be serialised.
    Encode(EncodeError),
    /// The cloud session failed to start or publish.
    Cloud(CloudError),
    /// A remote setting was rejected or could not be registered.
    Settings(SettingsError),
    /// Peripheral power gating failed.
    Power(PowerError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Gauge(e) => write!(f, "fuel gauge: {e}"),
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Cloud(e) => write!(f, "cloud: {e}"),
            Self::Settings(e) => write!(f, "settings: {e}"),
            Self::Power(e) => write!(f, "power: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The device did not answer or reported the wrong identity.
    NotReady,
    /// A bus transaction failed while fetching a sample.
    FetchFailed,
    /// A zero-length sampling run was requested.
    NoSamples,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "device not ready"),
            Self::FetchFailed => write!(f, "sample fetch failed"),
            Self::NoSamples => write!(f, "sample count must be at least 1"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Fuel-gauge errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeError {
    /// Model initialisation was rejected.
    InitFailed,
    /// An external-state update was rejected.
    UpdateFailed,
    /// `sample()` was called before `init()`.
    NotInitialised,
    /// The model produced a non-finite state of charge with no earlier
    /// value to fall back on.
    NonFiniteOutput,
}

impl fmt::Display for GaugeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => write!(f, "model init failed"),
            Self::UpdateFailed => write!(f, "external state update failed"),
            Self::NotInitialised => write!(f, "monitor not initialised"),
            Self::NonFiniteOutput => write!(f, "model output not finite"),
        }
    }
}

impl From<GaugeError> for Error {
    fn from(e: GaugeError) -> Self {
        Self::Gauge(e)
    }
}

// ---------------------------------------------------------------------------
// Encoding errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The output buffer is too small for the payload.
    BufferTooSmall,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "payload buffer too small"),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

// ---------------------------------------------------------------------------
// Cloud session errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudError {
    /// The session is not connected.
    NotConnected,
    /// The session could not be started.
    StartFailed,
    /// The stream endpoint rejected the payload.
    Rejected,
    /// Transport-level failure while sending.
    Transport,
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "session not connected"),
            Self::StartFailed => write!(f, "session start failed"),
            Self::Rejected => write!(f, "payload rejected"),
            Self::Transport => write!(f, "transport failure"),
        }
    }
}

impl From<CloudError> for Error {
    fn from(e: CloudError) -> Self {
        Self::Cloud(e)
    }
}

// ---------------------------------------------------------------------------
// Settings errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// The value lies outside the key's registered bounds.
    OutOfRange,
    /// The value kind (int/float) does not match the key.
    WrongType,
    /// The key was never registered with the settings service.
    NotRegistered,
    /// The settings service refused the registration.
    RegistrationFailed,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "value out of range"),
            Self::WrongType => write!(f, "value has the wrong type"),
            Self::NotRegistered => write!(f, "key not registered"),
            Self::RegistrationFailed => write!(f, "registration failed"),
        }
    }
}

impl From<SettingsError> for Error {
    fn from(e: SettingsError) -> Self {
        Self::Settings(e)
    }
}

// ---------------------------------------------------------------------------
// Peripheral power errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    ResumeFailed,
    SuspendFailed,
}

impl fmt::Display for PowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResumeFailed => write!(f, "peripheral resume failed"),
            Self::SuspendFailed => write!(f, "peripheral suspend failed"),
        }
    }
}

impl From<PowerError> for Error {
    fn from(e: PowerError) -> Self {
        Self::Power(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
