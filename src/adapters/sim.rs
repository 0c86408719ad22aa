//! Simulated collaborators for bench runs and host tests.
//!
//! | Stand-in               | Implements         | Behaviour                                  |
//! |------------------------|--------------------|--------------------------------------------|
//! | `SimLink`              | LinkPort           | replays a scripted event sequence          |
//! | `SimCloud`             | CloudSession       | connects on start, pushes remote settings  |
//! | `SimSettingsTransport` | SettingsTransport  | records registrations                      |
//! | `SimCharger`           | ChargerPort        | fixed, adjustable reading                  |
//! | `SimFlashPower`        | PeripheralPower    | tracks resume/suspend                      |
//!
//! `SimCloud` posts into the [`DeviceContext`] exactly as a real client's
//! callbacks would, so the scheduler cannot tell the difference.

use std::sync::Arc;

use heapless::Vec as HVec;
use log::{debug, info};

use crate::app::context::DeviceContext;
use crate::app::ports::{
    ChargerPort, CloudSession, ContentType, LinkPort, NetworkHandler, PeripheralPower,
    SettingsTransport,
};
use crate::battery::ChargerReading;
use crate::connectivity::{NetworkEvent, RegistrationStatus, SessionEvent};
use crate::error::{CloudError, PowerError, SensorError, SettingsError};
use crate::events::DeviceEvent;
use crate::settings::{Bounds, SETTING_COUNT, SettingKey, SettingValue};
use crate::telemetry::encoder::Payload;

// ── Link ──────────────────────────────────────────────────────

pub struct SimLink {
    script: Vec<NetworkEvent>,
}

impl Default for SimLink {
    fn default() -> Self {
        Self::new(vec![
            NetworkEvent::Registration(RegistrationStatus::Searching),
            NetworkEvent::Registration(RegistrationStatus::RegisteredHome),
        ])
    }
}

impl SimLink {
    pub fn new(script: Vec<NetworkEvent>) -> Self {
        Self { script }
    }
}

impl LinkPort for SimLink {
    fn connect_async(&mut self, mut handler: NetworkHandler) -> crate::error::Result<()> {
        info!("SimLink: attaching ({} scripted events)", self.script.len());
        for ev in self.script.drain(..) {
            handler(ev);
        }
        Ok(())
    }
}

// ── Cloud ─────────────────────────────────────────────────────

pub struct SimCloud {
    ctx: Arc<DeviceContext>,
    remote: HVec<(SettingKey, SettingValue), SETTING_COUNT>,
    running: bool,
    connected: bool,
    connect_on_start: bool,
    last_payload: Option<Payload>,
    published: u32,
    starts: u32,
}

impl SimCloud {
    pub fn new(ctx: Arc<DeviceContext>) -> Self {
        Self {
            ctx,
            remote: HVec::new(),
            running: false,
            connected: false,
            connect_on_start: true,
            last_payload: None,
            published: 0,
            starts: 0,
        }
    }

    /// Value the cloud holds for `key`; pushed on every connect.
    pub fn with_remote(mut self, key: SettingKey, value: SettingValue) -> Self {
        if let Some(slot) = self.remote.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            // Capacity equals the key count, so a new key always fits.
            let _ = self.remote.push((key, value));
        }
        self
    }

    /// Leave the session unconnected after `start` (connect timeout path).
    pub fn unreachable(mut self) -> Self {
        self.connect_on_start = false;
        self
    }

    pub fn published(&self) -> u32 {
        self.published
    }

    pub fn starts(&self) -> u32 {
        self.starts
    }

    pub fn last_payload(&self) -> Option<&[u8]> {
        self.last_payload.as_deref()
    }
}

impl CloudSession for SimCloud {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) -> Result<(), CloudError> {
        self.running = true;
        self.starts += 1;
        if !self.connect_on_start {
            return Ok(());
        }
        self.connected = true;
        self.ctx.post(DeviceEvent::Session(SessionEvent::Connected));
        for &(key, value) in &self.remote {
            self.ctx.post(DeviceEvent::Setting { key, value });
        }
        Ok(())
    }

    fn stop(&mut self) {
        if self.connected {
            self.ctx.post(DeviceEvent::Session(SessionEvent::Disconnected));
        }
        self.running = false;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn stream_set(
        &mut self,
        path: &str,
        content_type: ContentType,
        payload: &[u8],
    ) -> Result<(), CloudError> {
        if !self.connected {
            return Err(CloudError::NotConnected);
        }
        debug!(
            "SimCloud: {} bytes to /{} ({:?})",
            payload.len(),
            path,
            content_type
        );
        self.last_payload = Some(Payload::from_slice(payload).map_err(|_| CloudError::Rejected)?);
        self.published += 1;
        Ok(())
    }
}

// ── Settings transport ────────────────────────────────────────

#[derive(Default)]
pub struct SimSettingsTransport {
    registered: HVec<SettingKey, SETTING_COUNT>,
}

impl SimSettingsTransport {
    pub fn registered(&self) -> &[SettingKey] {
        &self.registered
    }
}

impl SettingsTransport for SimSettingsTransport {
    fn reset(&mut self) {
        self.registered.clear();
    }

    fn register(&mut self, key: SettingKey, bounds: Option<Bounds>) -> Result<(), SettingsError> {
        debug!("SimSettings: register {} {:?}", key.name(), bounds);
        self.registered
            .push(key)
            .map_err(|_| SettingsError::RegistrationFailed)
    }
}

// ── Charger ───────────────────────────────────────────────────

pub struct SimCharger {
    pub reading: ChargerReading,
    pub charge_current_a: f32,
    pub vbus: bool,
}

impl Default for SimCharger {
    fn default() -> Self {
        Self {
            reading: ChargerReading {
                voltage_v: 3.85,
                current_a: 0.005,
                temp_c: 24.0,
                status_bits: 0,
            },
            charge_current_a: 0.15,
            vbus: false,
        }
    }
}

impl ChargerPort for SimCharger {
    fn read(&mut self) -> Result<ChargerReading, SensorError> {
        Ok(self.reading)
    }

    fn desired_charge_current(&mut self) -> Result<f32, SensorError> {
        Ok(self.charge_current_a)
    }

    fn vbus_present(&mut self) -> Result<bool, SensorError> {
        Ok(self.vbus)
    }
}

// ── Flash power ───────────────────────────────────────────────

#[derive(Default)]
pub struct SimFlashPower {
    suspended: bool,
    transitions: u32,
}

impl SimFlashPower {
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}

impl PeripheralPower for SimFlashPower {
    fn resume(&mut self) -> Result<(), PowerError> {
        self.suspended = false;
        self.transitions += 1;
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), PowerError> {
        self.suspended = true;
        self.transitions += 1;
        Ok(())
    }
}
