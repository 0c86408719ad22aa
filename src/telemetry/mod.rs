//! Telemetry subsystem — accelerometer averaging, tilt and water-level
//! derivation, and the CBOR payload encoder.
//!
//! ```text
//!  AccelerometerPort ──▶ sampler::sample ──▶ derive_tilt ──▶ derive_water_level
//!                                                 │
//!                                                 ▼
//!                                          TelemetryFrame ──▶ encoder::encode
//! ```

pub mod encoder;
pub mod sampler;

/// One accelerometer reading (or the average of several), m/s².
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Tilt of the float arm derived from the averaged gravity vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TiltEstimate {
    pub pitch_rad: f64,
    pub pitch_deg: f64,
    pub roll_rad: f64,
    pub roll_deg: f64,
}

/// Float height relative to the hinge, in the calibration's units (inches).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaterLevelEstimate {
    pub float_length: f64,
    pub float_offset: f64,
    pub float_height: f64,
}

/// Atomic snapshot published each cycle.  Never retained across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryFrame {
    pub accel: AccelSample,
    pub tilt: TiltEstimate,
    pub water_level: WaterLevelEstimate,
}

impl TelemetryFrame {
    /// Derive tilt and water level from an averaged sample and calibration.
    pub fn from_average(accel: AccelSample, float_length: f64, float_offset: f64) -> Self {
        let tilt = sampler::derive_tilt(accel);
        let water_level = sampler::derive_water_level(&tilt, float_length, float_offset);
        Self {
            accel,
            tilt,
            water_level,
        }
    }
}
