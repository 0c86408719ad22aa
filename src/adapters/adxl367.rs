//! ADXL367 low-power accelerometer over I²C.
//!
//! Implements [`AccelerometerPort`] for any `embedded-hal` 1.0 blocking
//! I²C bus.  Readings are converted to m/s².

use embedded_hal::i2c::I2c;
use log::{error, info};

use crate::app::ports::AccelerometerPort;
use crate::error::SensorError;
use crate::telemetry::AccelSample;

/// Standard gravity, m/s².
const G: f64 = 9.806_65;

/// Measurement range (FILTER_CTL bits 7:6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    G2,
    G4,
    G8,
}

impl Range {
    const fn bits(self) -> u8 {
        match self {
            Self::G2 => 0b00 << 6,
            Self::G4 => 0b01 << 6,
            Self::G8 => 0b10 << 6,
        }
    }

    const fn lsb_per_g(self) -> f64 {
        match self {
            Self::G2 => 4000.0,
            Self::G4 => 2000.0,
            Self::G8 => 1000.0,
        }
    }
}

pub struct Adxl367<I2C> {
    i2c: I2C,
    addr: u8,
    range: Range,
}

impl<I2C: I2c> Adxl367<I2C> {
    /// Address with ASEL tied low.
    pub const DEFAULT_ADDR: u8 = 0x1D;

    const DEVID_AD: u8 = 0x00;
    const XDATA_H: u8 = 0x0E;
    const SOFT_RESET: u8 = 0x1F;
    const FILTER_CTL: u8 = 0x2C;
    const POWER_CTL: u8 = 0x2D;

    const ID_AD: u8 = 0xAD;
    const ID_MST: u8 = 0x1D;
    const ID_PART: u8 = 0xF7;
    const RESET_CODE: u8 = 0x52;
    const MEASURE: u8 = 0b10;

    pub fn new(i2c: I2C, addr: u8, range: Range) -> Self {
        Self { i2c, addr, range }
    }

    /// Verify identity, reset, set the range and enter measurement mode.
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 3];
        self.i2c
            .write_read(self.addr, &[Self::DEVID_AD], &mut id)
            .map_err(|_| SensorError::NotReady)?;

        if id != [Self::ID_AD, Self::ID_MST, Self::ID_PART] {
            error!("ADXL367 is not ready (id {:02x?})", id);
            return Err(SensorError::NotReady);
        }

        self.write_reg(Self::SOFT_RESET, Self::RESET_CODE)?;
        self.write_reg(Self::FILTER_CTL, self.range.bits())?;
        self.write_reg(Self::POWER_CTL, Self::MEASURE)?;

        info!("ADXL367 ready ({:?})", self.range);
        Ok(())
    }

    fn write_reg(&mut self, reg: u8, val: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.addr, &[reg, val])
            .map_err(|_| SensorError::NotReady)
    }

    /// Release the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// 14-bit two's complement, left-justified across H/L.
fn decode_axis(h: u8, l: u8) -> i16 {
    i16::from_be_bytes([h, l]) >> 2
}

impl<I2C: I2c> AccelerometerPort for Adxl367<I2C> {
    fn read(&mut self) -> Result<AccelSample, SensorError> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(self.addr, &[Self::XDATA_H], &mut buf)
            .map_err(|_| {
                error!("Error fetching low-power accelerometer sensor sample");
                SensorError::FetchFailed
            })?;

        let scale = G / self.range.lsb_per_g();
        let axis = |i: usize| f64::from(decode_axis(buf[i], buf[i + 1])) * scale;
        Ok(AccelSample {
            x: axis(0),
            y: axis(2),
            z: axis(4),
        })
    }
}
