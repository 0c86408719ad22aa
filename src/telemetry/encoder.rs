//! CBOR telemetry payload.
//!
//! Wire schema (key order is fixed, every leaf is a float64):
//! ```text
//! {
//!   "accel":       { "x": f64, "y": f64, "z": f64 },
//!   "tilt":        { "pitch": f64 (deg), "roll": f64 (deg) },
//!   "water_level": { "float_length": f64, "float_offset": f64, "float_height": f64 }
//! }
//! ```
//!
//! Maps use definite lengths and floats are always written as 8-byte
//! doubles, so two encoders following the same rules produce identical
//! bytes.

use heapless::Vec;
use minicbor::Encoder;
use minicbor::encode::write::{Cursor, EndOfSlice};

use super::TelemetryFrame;
use crate::error::EncodeError;

/// Scratch size for one frame.  The schema needs 155 bytes.
pub const TELEMETRY_BUF_SIZE: usize = 256;

/// Encoded frame, ready for the stream endpoint.
pub type Payload = Vec<u8, TELEMETRY_BUF_SIZE>;

type EncResult = Result<(), minicbor::encode::Error<EndOfSlice>>;

fn encode_accel(e: &mut Encoder<Cursor<&mut [u8]>>, f: &TelemetryFrame) -> EncResult {
    e.str("accel")?.map(3)?;
    e.str("x")?.f64(f.accel.x)?;
    e.str("y")?.f64(f.accel.y)?;
    e.str("z")?.f64(f.accel.z)?;
    Ok(())
}

fn encode_tilt(e: &mut Encoder<Cursor<&mut [u8]>>, f: &TelemetryFrame) -> EncResult {
    e.str("tilt")?.map(2)?;
    e.str("pitch")?.f64(f.tilt.pitch_deg)?;
    e.str("roll")?.f64(f.tilt.roll_deg)?;
    Ok(())
}

fn encode_water_level(e: &mut Encoder<Cursor<&mut [u8]>>, f: &TelemetryFrame) -> EncResult {
    e.str("water_level")?.map(3)?;
    e.str("float_length")?.f64(f.water_level.float_length)?;
    e.str("float_offset")?.f64(f.water_level.float_offset)?;
    e.str("float_height")?.f64(f.water_level.float_height)?;
    Ok(())
}

fn encode_body(e: &mut Encoder<Cursor<&mut [u8]>>, f: &TelemetryFrame) -> EncResult {
    e.map(3)?;
    encode_accel(e, f)?;
    encode_tilt(e, f)?;
    encode_water_level(e, f)
}

/// Encode `frame` into `out`.  Returns the number of bytes written.
pub fn encode_into(frame: &TelemetryFrame, out: &mut [u8]) -> Result<usize, EncodeError> {
    let mut e = Encoder::new(Cursor::new(out));
    encode_body(&mut e, frame).map_err(|_| EncodeError::BufferTooSmall)?;
    Ok(e.writer().position())
}

/// Encode `frame` into an owned fixed-capacity payload.
pub fn encode(frame: &TelemetryFrame) -> Result<Payload, EncodeError> {
    let mut buf = [0u8; TELEMETRY_BUF_SIZE];
    let len = encode_into(frame, &mut buf)?;
    Payload::from_slice(&buf[..len]).map_err(|_| EncodeError::BufferTooSmall)
}
