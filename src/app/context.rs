//! Device context — the single shared-state object.
//!
//! Created once at start-up, wrapped in an `Arc`, and handed to the
//! scheduler, the battery loop and every adapter that receives callbacks.
//! All fields are interior-mutable and safe to touch from callback
//! context.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::trace;

use crate::app::ports::NetworkHandler;
use crate::battery::VbusFlag;
use crate::config::DeviceConfig;
use crate::connectivity::{ConnectivitySignal, SessionSignal};
use crate::events::DeviceEvent;
use crate::ota::OtaTracker;
use crate::settings::{Delivery, SettingsRegistry};

/// What [`DeviceContext::post`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    Handled,
    /// Network registration fired the one-shot connectivity signal.
    Connected,
    Setting(Delivery),
}

pub struct DeviceContext {
    pub network: ConnectivitySignal,
    pub session: SessionSignal,
    /// Interrupts the duty-cycle sleep.
    pub wake: Signal<CriticalSectionRawMutex, ()>,
    pub settings: SettingsRegistry,
    pub ota: OtaTracker,
    pub vbus: VbusFlag,
}

impl DeviceContext {
    pub fn new(defaults: &DeviceConfig) -> Self {
        Self {
            network: ConnectivitySignal::new(),
            session: SessionSignal::new(),
            wake: Signal::new(),
            settings: SettingsRegistry::new(defaults),
            ota: OtaTracker::new(),
            vbus: VbusFlag::new(),
        }
    }

    /// Handler for [`LinkPort::connect_async`](crate::app::ports::LinkPort::connect_async)
    /// that posts every modem event here.
    pub fn network_handler(self: &Arc<Self>) -> NetworkHandler {
        let ctx = Arc::clone(self);
        Box::new(move |ev| {
            ctx.post(DeviceEvent::Network(ev));
        })
    }

    /// Apply one asynchronous event.
    pub fn post(&self, event: DeviceEvent) -> PostOutcome {
        trace!("post {:?}", event);
        match event {
            DeviceEvent::Network(ev) => {
                if self.network.on_event(&ev) {
                    PostOutcome::Connected
                } else {
                    PostOutcome::Handled
                }
            }
            DeviceEvent::Session(ev) => {
                self.session.on_event(ev);
                PostOutcome::Handled
            }
            DeviceEvent::Setting { key, value } => {
                let d = self.settings.deliver(key, value);
                if d.wake {
                    self.wake.signal(());
                }
                PostOutcome::Setting(d)
            }
            DeviceEvent::Ota { state, reason } => {
                self.ota.on_state(state, reason);
                PostOutcome::Handled
            }
            DeviceEvent::Vbus(edge) => {
                self.vbus.on_edge(edge);
                PostOutcome::Handled
            }
        }
    }
}
