//! Connectivity signals — network registration and cloud-session state.
//!
//! The modem reports a stream of [`NetworkEvent`]s after
//! [`LinkPort::connect_async`](crate::app::ports::LinkPort::connect_async).
//! Only the first home/roaming registration matters to the duty cycle: it
//! fires [`ConnectivitySignal`] exactly once for the lifetime of the
//! process.  Everything else is informational and only logged.
//!
//! Loss of registration after the first connect is not tracked here; it
//! shows up later as a publish failure.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════
//  Network events
// ═══════════════════════════════════════════════════════════════

/// Network registration status as reported by the modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    NotRegistered,
    RegisteredHome,
    Searching,
    RegistrationDenied,
    Unknown,
    RegisteredRoaming,
}

impl RegistrationStatus {
    pub fn is_registered(self) -> bool {
        matches!(self, Self::RegisteredHome | Self::RegisteredRoaming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LteMode {
    LteM,
    NbIot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RrcMode {
    Connected,
    Idle,
}

/// Why the modem went to sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemSleepKind {
    Psm,
    ProprietaryPsm,
    RfInactivity,
    LimitedService,
    FlightMode,
}

/// Link-layer status events delivered to the attach handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    Registration(RegistrationStatus),
    ModeUpdate(LteMode),
    RrcUpdate(RrcMode),
    PsmUpdate { tau_s: i32, active_time_s: i32 },
    TauPreWarning { time_ms: i64 },
    ModemSleepExitPreWarning { time_ms: i64 },
    ModemSleepExit { time_ms: i64 },
    ModemSleepEnter { kind: ModemSleepKind, time_ms: i64 },
}

fn log_informational(event: &NetworkEvent) {
    match event {
        NetworkEvent::Registration(status) => {
            debug!("LTE network registration status: {:?}", status);
        }
        NetworkEvent::ModeUpdate(mode) => {
            info!(
                "LTE mode: {}",
                if *mode == LteMode::LteM { "LTE-M" } else { "NB-IoT" }
            );
        }
        NetworkEvent::RrcUpdate(rrc) => {
            info!(
                "LTE RRC connection state: {}",
                if *rrc == RrcMode::Connected { "Connected" } else { "Idle" }
            );
        }
        NetworkEvent::PsmUpdate { tau_s, active_time_s } => {
            info!(
                "LTE PSM parameter update: TAU: {} s, Active time: {} s",
                tau_s, active_time_s
            );
        }
        NetworkEvent::TauPreWarning { time_ms } => {
            info!("LTE modem will perform a Tracking Area Update in {} ms", time_ms);
        }
        NetworkEvent::ModemSleepExitPreWarning { time_ms } => {
            info!("LTE modem will exit sleep in {} ms", time_ms);
        }
        NetworkEvent::ModemSleepExit { time_ms } => {
            info!("LTE modem exited sleep after {} ms", time_ms);
        }
        NetworkEvent::ModemSleepEnter { kind, time_ms } => {
            info!("LTE modem entered {:?} sleep for {} ms", kind, time_ms);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  One-shot "network ready"
// ═══════════════════════════════════════════════════════════════

/// Transition-once "network registered" signal.
pub struct ConnectivitySignal {
    fired: AtomicBool,
    ready: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for ConnectivitySignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivitySignal {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            ready: Signal::new(),
        }
    }

    /// Feed one modem event.  Returns `true` only for the event that fired
    /// the signal.  Safe from callback context: no blocking, no I/O.
    pub fn on_event(&self, event: &NetworkEvent) -> bool {
        let NetworkEvent::Registration(status) = event else {
            log_informational(event);
            return false;
        };
        if !status.is_registered() {
            log_informational(event);
            return false;
        }

        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            info!(
                "LTE network registration status: {}",
                if *status == RegistrationStatus::RegisteredHome {
                    "Registered, home network"
                } else {
                    "Registered, roaming"
                }
            );
            self.ready.signal(());
            true
        } else {
            debug!("LTE re-registration ignored ({:?})", status);
            false
        }
    }

    pub fn is_connected(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Wait for the first registration.  Consumed once at start-up.
    pub async fn wait(&self) {
        if self.is_connected() {
            return;
        }
        self.ready.wait().await;
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cloud session state
// ═══════════════════════════════════════════════════════════════

/// Connected/disconnected notifications from the cloud client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
}

/// Tracks whether the cloud session is connected and lets the scheduler
/// wait for the next connect.
pub struct SessionSignal {
    connected: AtomicBool,
    on_connect: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSignal {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            on_connect: Signal::new(),
        }
    }

    pub fn on_event(&self, event: SessionEvent) {
        let is_connected = event == SessionEvent::Connected;
        self.connected.store(is_connected, Ordering::Release);
        if is_connected {
            self.on_connect.signal(());
        }
        info!(
            "Cloud client {}",
            if is_connected { "connected" } else { "disconnected" }
        );
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Forget any stale connect notification before a fresh start.
    pub fn rearm(&self) {
        self.on_connect.reset();
    }

    /// Resolve on the next connect, or immediately if already connected.
    pub async fn wait_connected(&self) {
        if self.is_connected() {
            return;
        }
        self.on_connect.wait().await;
    }
}
