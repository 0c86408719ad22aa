//! Asynchronous device events.
//!
//! Four kinds of callback reach the firmware from outside the control
//! task: modem status, cloud session/settings/OTA notifications and the
//! PMIC VBUS interrupt.  Each is translated into a [`DeviceEvent`] and
//! posted to the [`DeviceContext`](crate::app::context::DeviceContext).
//!
//! ```text
//! ┌──────────────┐
//! │ Modem        │──Network──▶┐
//! │ Cloud client │──Session──▶│   ┌───────────────┐     ┌─────────────┐
//! │ Settings svc │──Setting──▶├──▶│ DeviceContext │────▶│  Scheduler  │
//! │ OTA client   │──Ota──────▶│   │ ::post        │     │ (waiters)   │
//! │ PMIC ISR     │──Vbus─────▶┘   └───────────────┘     └─────────────┘
//! ```
//!
//! Handling an event only flips a flag, bumps a counter or signals a
//! waiter.  Nothing here blocks or performs I/O.

use crate::battery::VbusEdge;
use crate::connectivity::{NetworkEvent, SessionEvent};
use crate::ota::{OtaReason, OtaState};
use crate::settings::{SettingKey, SettingValue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceEvent {
    /// Link-layer status from the modem.
    Network(NetworkEvent),
    /// Cloud client connected / disconnected.
    Session(SessionEvent),
    /// A remote setting was delivered.
    Setting { key: SettingKey, value: SettingValue },
    /// Firmware-update client changed state.
    Ota { state: OtaState, reason: OtaReason },
    /// VBUS detected / removed.
    Vbus(VbusEdge),
}
