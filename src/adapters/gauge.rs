//! Coulomb-counting fuel-gauge model.
//!
//! A simple stand-in for the vendor battery model.  State of charge is
//! seeded from the open-circuit voltage at init and then integrated from
//! current.  Current is positive when discharging.

use log::debug;

use crate::app::ports::FuelGaugeModel;
use crate::battery::{ChargeState, ExtStateUpdate, GaugeInit};
use crate::error::GaugeError;

/// Resting voltage → SoC (%) for a single Li-ion/LiPo cell.
const OCV_TABLE: [(f32, f32); 9] = [
    (3.00, 0.0),
    (3.45, 5.0),
    (3.60, 15.0),
    (3.70, 35.0),
    (3.75, 50.0),
    (3.85, 65.0),
    (3.95, 80.0),
    (4.10, 95.0),
    (4.20, 100.0),
];

fn soc_from_ocv(v: f32) -> f32 {
    let (first_v, first_soc) = OCV_TABLE[0];
    if v <= first_v {
        return first_soc;
    }
    for pair in OCV_TABLE.windows(2) {
        let (v0, s0) = pair[0];
        let (v1, s1) = pair[1];
        if v <= v1 {
            return s0 + (v - v0) / (v1 - v0) * (s1 - s0);
        }
    }
    100.0
}

pub struct CoulombGauge {
    capacity_ah: f32,
    soc: f32,
    current_a: f32,
    charge_limit_a: f32,
    term_current_a: f32,
    charge_state: ChargeState,
    vbus: bool,
    initialised: bool,
}

impl CoulombGauge {
    pub fn new(capacity_mah: f32) -> Self {
        Self {
            capacity_ah: capacity_mah / 1000.0,
            soc: 0.0,
            current_a: 0.0,
            charge_limit_a: 0.0,
            term_current_a: 0.0,
            charge_state: ChargeState::Idle,
            vbus: false,
            initialised: false,
        }
    }

    fn charging(&self) -> bool {
        self.vbus
            && matches!(
                self.charge_state,
                ChargeState::Trickle | ChargeState::ConstantCurrent | ChargeState::ConstantVoltage
            )
    }
}

impl FuelGaugeModel for CoulombGauge {
    fn init(&mut self, p: &GaugeInit) -> Result<(), GaugeError> {
        if !(p.v0.is_finite() && self.capacity_ah > 0.0) {
            return Err(GaugeError::InitFailed);
        }
        self.soc = soc_from_ocv(p.v0);
        self.current_a = p.i0;
        self.initialised = true;
        debug!("Coulomb gauge seeded at {:.1}% from {:.3} V", self.soc, p.v0);
        Ok(())
    }

    fn update(&mut self, update: ExtStateUpdate) -> Result<(), GaugeError> {
        if !self.initialised {
            return Err(GaugeError::UpdateFailed);
        }
        match update {
            ExtStateUpdate::ChargeCurrentLimit(a) => self.charge_limit_a = a,
            ExtStateUpdate::TermCurrent(a) => self.term_current_a = a,
            ExtStateUpdate::ChargeState(s) => self.charge_state = s,
            ExtStateUpdate::VbusConnected => self.vbus = true,
            ExtStateUpdate::VbusDisconnected => self.vbus = false,
        }
        Ok(())
    }

    fn process(&mut self, _voltage_v: f32, current_a: f32, _temp_c: f32, delta_s: f32) -> f32 {
        self.current_a = current_a;
        if delta_s > 0.0 && delta_s.is_finite() && current_a.is_finite() {
            let used_ah = current_a * delta_s / 3600.0;
            self.soc -= used_ah / self.capacity_ah * 100.0;
        }
        if self.charge_state == ChargeState::Complete {
            self.soc = 100.0;
        }
        self.soc = self.soc.clamp(0.0, 100.0);
        self.soc
    }

    fn tte(&self) -> f32 {
        if self.current_a <= 0.0 {
            return f32::NAN;
        }
        self.soc / 100.0 * self.capacity_ah / self.current_a * 3600.0
    }

    fn ttf(&self) -> f32 {
        if !self.charging() {
            return f32::NAN;
        }
        let rate = if self.current_a < 0.0 {
            -self.current_a
        } else {
            self.charge_limit_a
        };
        if rate <= self.term_current_a || rate <= 0.0 {
            return f32::NAN;
        }
        (100.0 - self.soc) / 100.0 * self.capacity_ah / rate * 3600.0
    }
}
