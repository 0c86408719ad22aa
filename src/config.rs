//! System configuration parameters
//!
//! Compile-time defaults for every tunable.  The remote-configurable subset
//! (stream delay, sample count, sample delay, float calibration) is later
//! overwritten by the settings service; the rest stays fixed for the life
//! of the firmware image.

use serde::{Deserialize, Serialize};

// --- Remote-setting bounds ---

/// Shortest duty-cycle interval accepted from the cloud (seconds).
pub const STREAM_DELAY_S_MIN: i32 = 1;
/// Longest duty-cycle interval accepted from the cloud (24 hours).
pub const STREAM_DELAY_S_MAX: i32 = 86_400;
pub const ACCEL_NUM_SAMPLES_MIN: i32 = 1;
pub const ACCEL_NUM_SAMPLES_MAX: i32 = i32::MAX;
pub const ACCEL_SAMPLE_DELAY_MS_MIN: i32 = 0;
pub const ACCEL_SAMPLE_DELAY_MS_MAX: i32 = i32::MAX;

/// Stream endpoint the telemetry payload is pushed to.
pub const TELEMETRY_PATH: &str = "sensor";

/// Why a [`DeviceConfig`] failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The named field is outside its accepted range.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(field) => write!(f, "validation failed: {}", field),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Core device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    // --- Remote settings (defaults until the first sync) ---
    /// Duty-cycle interval (seconds)
    pub stream_delay_s: i32,
    /// Accelerometer readings averaged per telemetry frame
    pub accel_num_samples: i32,
    /// Delay between accelerometer readings (milliseconds)
    pub accel_sample_delay_ms: i32,
    /// Pivot-to-float arm length (inches)
    pub float_length_in: f32,
    /// Hinge height offset added to the float height (inches)
    pub float_offset_in: f32,

    // --- Local timing ---
    /// Upper bound on the per-cycle wait for the cloud session (seconds)
    pub session_connect_timeout_s: u32,
    /// Fuel-gauge sampling interval (seconds)
    pub battery_sample_interval_s: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            stream_delay_s: 300,
            accel_num_samples: 10,
            accel_sample_delay_ms: 100,
            float_length_in: 0.0,
            float_offset_in: 0.0,

            session_connect_timeout_s: 30,
            battery_sample_interval_s: 60,
        }
    }
}

impl DeviceConfig {
    /// Reject out-of-range values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(STREAM_DELAY_S_MIN..=STREAM_DELAY_S_MAX).contains(&self.stream_delay_s) {
            return Err(ConfigError::ValidationFailed("stream_delay_s"));
        }
        if !(ACCEL_NUM_SAMPLES_MIN..=ACCEL_NUM_SAMPLES_MAX).contains(&self.accel_num_samples) {
            return Err(ConfigError::ValidationFailed("accel_num_samples"));
        }
        if !(ACCEL_SAMPLE_DELAY_MS_MIN..=ACCEL_SAMPLE_DELAY_MS_MAX)
            .contains(&self.accel_sample_delay_ms)
        {
            return Err(ConfigError::ValidationFailed("accel_sample_delay_ms"));
        }
        if !self.float_length_in.is_finite() {
            return Err(ConfigError::ValidationFailed("float_length_in"));
        }
        if !self.float_offset_in.is_finite() {
            return Err(ConfigError::ValidationFailed("float_offset_in"));
        }
        if self.session_connect_timeout_s == 0 {
            return Err(ConfigError::ValidationFailed("session_connect_timeout_s"));
        }
        if self.battery_sample_interval_s == 0 {
            return Err(ConfigError::ValidationFailed("battery_sample_interval_s"));
        }
        Ok(())
    }
}
