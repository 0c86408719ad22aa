//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements             | Connects to                   |
//! |------------|------------------------|-------------------------------|
//! | `adxl367`  | AccelerometerPort      | ADXL367 over I²C              |
//! | `gauge`    | FuelGaugeModel         | coulomb counter (in-process)  |
//! | `log_sink` | EventSink              | Serial log output             |
//! | `sim`      | LinkPort, CloudSession | bench stand-ins               |
//! |            | SettingsTransport      |                               |
//! |            | ChargerPort            |                               |
//! |            | PeripheralPower        |                               |
//! | `time`     | ClockPort, TimerPort   | ESP32 system timer            |

pub mod adxl367;
pub mod gauge;
pub mod log_sink;
pub mod sim;
pub mod time;
