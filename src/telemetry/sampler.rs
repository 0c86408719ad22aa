//! Accelerometer averaging and float-arm geometry.
//!
//! The ADXL367 sits on the underside of the board, so its axes point
//! below the horizon when the arm is level and gravity reads negative.
//! Both tilt angles are therefore negated.  Installation assumptions:
//! enclosure right-side up, USB connector pointing down the pivot arm
//! towards the float.

use core::time::Duration;

use log::debug;

use super::{AccelSample, TiltEstimate, WaterLevelEstimate};
use crate::app::ports::{AccelerometerPort, TimerPort};
use crate::error::SensorError;

/// Take `n` readings spaced by `delay` and return their mean.
///
/// Any failed read aborts the run; no partial average is returned.  The
/// mean is maintained incrementally (seeded from the first reading) so a
/// run of identical readings averages back to exactly that reading.
pub async fn sample<A, T>(
    accel: &mut A,
    timer: &T,
    n: u32,
    delay: Duration,
) -> Result<AccelSample, SensorError>
where
    A: AccelerometerPort,
    T: TimerPort,
{
    if n == 0 {
        return Err(SensorError::NoSamples);
    }

    let mut mean = AccelSample::default();
    for i in 0..n {
        if i > 0 && !delay.is_zero() {
            timer.sleep(delay).await;
        }

        let s = accel.read()?;
        debug!("Sample {}: X: {:.6}, Y: {:.6}, Z: {:.6}", i, s.x, s.y, s.z);

        if i == 0 {
            mean = s;
        } else {
            let k = f64::from(i + 1);
            mean.x += (s.x - mean.x) / k;
            mean.y += (s.y - mean.y) / k;
            mean.z += (s.z - mean.z) / k;
        }
    }

    debug!("X: {:.6}; Y: {:.6}; Z: {:.6}", mean.x, mean.y, mean.z);
    Ok(mean)
}

/// Roll and pitch from a gravity vector, sign-inverted for the mounting.
pub fn derive_tilt(avg: AccelSample) -> TiltEstimate {
    let AccelSample { x, y, z } = avg;

    let roll_rad = -x.atan2((y * y + z * z).sqrt());
    let pitch_rad = -y.atan2((x * x + z * z).sqrt());

    TiltEstimate {
        pitch_rad,
        pitch_deg: pitch_rad.to_degrees(),
        roll_rad,
        roll_deg: roll_rad.to_degrees(),
    }
}

/// Height of the float relative to the hinge.
pub fn derive_water_level(tilt: &TiltEstimate, length: f64, offset: f64) -> WaterLevelEstimate {
    WaterLevelEstimate {
        float_length: length,
        float_offset: offset,
        float_height: length * tilt.pitch_rad.sin() + offset,
    }
}
