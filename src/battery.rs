//! Battery fuel-gauge monitor.
//!
//! Reads the charger/PMIC channels, keeps the external fuel-gauge model
//! informed about VBUS and charge-state changes, and turns each reading
//! into a [`BatteryStatus`].
//!
//! ```text
//!   ChargerPort ──▶ BatteryMonitor ──update/process──▶ FuelGaugeModel
//!        ▲               │
//!   VbusFlag (ISR)       ▼
//!                   BatteryStatus ──▶ EventSink
//! ```
//!
//! The charger's status register can have several bits set at once, so
//! [`ChargeState::from_status`] applies a fixed precedence:
//! Complete > Trickle > ConstantCurrent > ConstantVoltage > Idle.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ChargerPort, ClockPort, EventSink, FuelGaugeModel, TimerPort};
use crate::error::{Error, GaugeError};

// ═══════════════════════════════════════════════════════════════
//  Charge state
// ═══════════════════════════════════════════════════════════════

/// Charger status register bits.
pub mod status_bits {
    pub const COMPLETE: u32 = 1 << 1;
    pub const TRICKLE: u32 = 1 << 2;
    pub const CONSTANT_CURRENT: u32 = 1 << 3;
    pub const CONSTANT_VOLTAGE: u32 = 1 << 4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeState {
    Idle,
    Trickle,
    ConstantCurrent,
    ConstantVoltage,
    Complete,
}

impl ChargeState {
    /// Decode the raw status bitmask.  First matching bit in precedence
    /// order wins.
    pub const fn from_status(bits: u32) -> Self {
        if bits & status_bits::COMPLETE != 0 {
            Self::Complete
        } else if bits & status_bits::TRICKLE != 0 {
            Self::Trickle
        } else if bits & status_bits::CONSTANT_CURRENT != 0 {
            Self::ConstantCurrent
        } else if bits & status_bits::CONSTANT_VOLTAGE != 0 {
            Self::ConstantVoltage
        } else {
            Self::Idle
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  VBUS flag
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VbusEdge {
    Detected,
    Removed,
}

/// Written from the PMIC interrupt, read by the sampling loop.
pub struct VbusFlag(AtomicBool);

impl Default for VbusFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl VbusFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn set(&self, connected: bool) {
        self.0.store(connected, Ordering::Release);
    }

    pub fn on_edge(&self, edge: VbusEdge) {
        self.set(edge == VbusEdge::Detected);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Model call contract types
// ═══════════════════════════════════════════════════════════════

/// One charger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChargerReading {
    pub voltage_v: f32,
    pub current_a: f32,
    pub temp_c: f32,
    pub status_bits: u32,
}

/// Initial conditions for the fuel-gauge model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeInit {
    pub v0: f32,
    pub i0: f32,
    pub t0: f32,
}

/// External state pushed into the model between process steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtStateUpdate {
    ChargeCurrentLimit(f32),
    TermCurrent(f32),
    ChargeState(ChargeState),
    VbusConnected,
    VbusDisconnected,
}

/// Transient per-tick result.  `tte_s` / `ttf_s` are `None` when the model
/// has no estimate (not discharging / not charging).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryStatus {
    pub voltage_v: f32,
    pub current_a: f32,
    pub temp_c: f32,
    pub soc_pct: f32,
    pub tte_s: Option<f32>,
    pub ttf_s: Option<f32>,
}

fn finite(v: f32) -> Option<f32> {
    v.is_finite().then_some(v)
}

/// Smallest step handed to the model.  Back-to-back samples within the
/// same millisecond would otherwise pass a zero delta.
const MIN_DELTA_S: f32 = 0.001;

// ═══════════════════════════════════════════════════════════════
//  Monitor
// ═══════════════════════════════════════════════════════════════

pub struct BatteryMonitor<C, G, K> {
    charger: C,
    gauge: G,
    clock: K,
    ref_ms: u64,
    prev_status: u32,
    last_soc: Option<f32>,
    initialised: bool,
}

impl<C, G, K> BatteryMonitor<C, G, K>
where
    C: ChargerPort,
    G: FuelGaugeModel,
    K: ClockPort,
{
    pub fn new(charger: C, gauge: G, clock: K) -> Self {
        Self {
            charger,
            gauge,
            clock,
            ref_ms: 0,
            prev_status: 0,
            last_soc: None,
            initialised: false,
        }
    }

    /// Initialise the model from one charger reading, push the charge
    /// current limits and initial charge state, and seed `vbus`.
    ///
    /// Any failure here is fatal to start-up.
    pub fn init(&mut self, vbus: &VbusFlag) -> Result<(), Error> {
        let r = self.charger.read().inspect_err(|e| {
            error!("Could not read sensors from charger device: {}", e);
        })?;

        let max_charge_current = self.charger.desired_charge_current()?;
        let term_charge_current = max_charge_current / 10.0;

        self.gauge.init(&GaugeInit {
            v0: r.voltage_v,
            i0: r.current_a,
            t0: r.temp_c,
        })?;
        self.ref_ms = self.clock.uptime_ms();

        self.gauge
            .update(ExtStateUpdate::ChargeCurrentLimit(max_charge_current))?;
        self.gauge
            .update(ExtStateUpdate::TermCurrent(term_charge_current))?;
        self.push_charge_state(r.status_bits)?;

        vbus.set(self.charger.vbus_present()?);
        self.initialised = true;

        info!(
            "Fuel gauge initialised (charge limit {:.3} A, term {:.3} A, VBUS {})",
            max_charge_current,
            term_charge_current,
            if vbus.get() { "connected" } else { "disconnected" }
        );
        Ok(())
    }

    fn push_charge_state(&mut self, bits: u32) -> Result<(), GaugeError> {
        let state = ChargeState::from_status(bits);
        debug!("Charge state: {:?}", state);
        self.prev_status = bits;
        self.gauge.update(ExtStateUpdate::ChargeState(state))
    }

    /// Take one reading and advance the model.
    pub fn sample(&mut self, vbus: &VbusFlag) -> Result<BatteryStatus, Error> {
        if !self.initialised {
            return Err(GaugeError::NotInitialised.into());
        }

        let r = self.charger.read()?;

        self.gauge.update(if vbus.get() {
            ExtStateUpdate::VbusConnected
        } else {
            ExtStateUpdate::VbusDisconnected
        })?;

        if r.status_bits != self.prev_status {
            self.push_charge_state(r.status_bits)?;
        }

        let now = self.clock.uptime_ms();
        let delta_ms = now.saturating_sub(self.ref_ms);
        self.ref_ms = now;
        let delta_s = (delta_ms as f32 / 1000.0).max(MIN_DELTA_S);

        let soc = self
            .gauge
            .process(r.voltage_v, r.current_a, r.temp_c, delta_s);
        let soc_pct = if soc.is_finite() {
            soc
        } else {
            warn!("Fuel gauge returned non-finite SoC (delta {} s)", delta_s);
            self.last_soc.ok_or(GaugeError::NonFiniteOutput)?
        };
        self.last_soc = Some(soc_pct);

        let status = BatteryStatus {
            voltage_v: r.voltage_v,
            current_a: r.current_a,
            temp_c: r.temp_c,
            soc_pct,
            tte_s: finite(self.gauge.tte()),
            ttf_s: finite(self.gauge.ttf()),
        };

        info!(
            "V: {:.3} V, I: {:.3} A, T: {:.2} \u{00b0}C, SoC: {:.2}%, TTE: {:.0} s, TTF: {:.0} s",
            status.voltage_v,
            status.current_a,
            status.temp_c,
            status.soc_pct,
            status.tte_s.unwrap_or(f32::NAN),
            status.ttf_s.unwrap_or(f32::NAN),
        );

        Ok(status)
    }
}

/// Sample the fuel gauge every `interval`, forever.  Read failures are
/// logged and the next tick retries.
pub async fn run_battery_loop<C, G, K, T, S>(
    monitor: &mut BatteryMonitor<C, G, K>,
    vbus: &VbusFlag,
    timer: &T,
    sink: &mut S,
    interval: Duration,
) where
    C: ChargerPort,
    G: FuelGaugeModel,
    K: ClockPort,
    T: TimerPort,
    S: EventSink,
{
    loop {
        match monitor.sample(vbus) {
            Ok(status) => sink.emit(&AppEvent::Battery(status)),
            Err(e) => error!("Fuel gauge sample failed: {}", e),
        }
        timer.sleep(interval).await;
    }
}
