//! FloatLevel Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Adxl367        CoulombGauge    LogEventSink   Esp32Time       │
//! │  (Accelerometer)(FuelGauge)     (EventSink)    (Clock+Timer)   │
//! │  SimLink  SimCloud  SimSettingsTransport  SimCharger  SimFlash │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  DutyCycleScheduler          run_battery_loop          │    │
//! │  │  (settings · telemetry)      (BatteryMonitor)          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                 Arc<DeviceContext> (callbacks post here)       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The modem, the cloud client and the PMIC are external collaborators;
//! this binary wires the bench stand-ins from `adapters::sim` in their
//! place.
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::FromValueType;
use log::info;

use floatlevel::adapters::adxl367::{Adxl367, Range};
use floatlevel::adapters::gauge::CoulombGauge;
use floatlevel::adapters::log_sink::LogEventSink;
use floatlevel::adapters::sim::{
    SimCharger, SimCloud, SimFlashPower, SimLink, SimSettingsTransport,
};
use floatlevel::adapters::time::Esp32TimeAdapter;
use floatlevel::app::context::DeviceContext;
use floatlevel::app::ports::LinkPort;
use floatlevel::battery::{BatteryMonitor, run_battery_loop};
use floatlevel::config::DeviceConfig;
use floatlevel::error::Error;
use floatlevel::scheduler::DutyCycleScheduler;
use floatlevel::settings::{SettingKey, SettingValue};

/// Rated capacity of the LP803448 cell.
const BATTERY_CAPACITY_MAH: f32 = 1500.0;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("FloatLevel v{}", env!("CARGO_PKG_VERSION"));

    let config = DeviceConfig::default();
    config.validate()?;
    let ctx = Arc::new(DeviceContext::new(&config));

    // ── 2. Accelerometer ──────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio8,
        peripherals.pins.gpio9,
        &I2cConfig::new().baudrate(400.kHz().into()),
    )?;
    let mut accel = Adxl367::new(i2c, Adxl367::<I2cDriver>::DEFAULT_ADDR, Range::G2);
    accel.init().map_err(Error::from)?;

    // ── 3. Settings registration ──────────────────────────────
    let mut settings_transport = SimSettingsTransport::default();
    ctx.settings.init(&mut settings_transport);

    // ── 4. Fuel gauge (fatal on failure) ──────────────────────
    let mut battery = BatteryMonitor::new(
        SimCharger::default(),
        CoulombGauge::new(BATTERY_CAPACITY_MAH),
        Esp32TimeAdapter::new(),
    );
    battery.init(&ctx.vbus)?;

    // ── 5. LTE attach (non-blocking) ──────────────────────────
    SimLink::default().connect_async(ctx.network_handler())?;

    // ── 6. Cloud session ──────────────────────────────────────
    let cloud = SimCloud::new(ctx.clone())
        .with_remote(
            SettingKey::StreamDelayS,
            SettingValue::Int(config.stream_delay_s),
        )
        .with_remote(
            SettingKey::FloatLength,
            SettingValue::Float(config.float_length_in),
        )
        .with_remote(
            SettingKey::FloatOffset,
            SettingValue::Float(config.float_offset_in),
        )
        .with_remote(
            SettingKey::AccelNumSamples,
            SettingValue::Int(config.accel_num_samples),
        )
        .with_remote(
            SettingKey::AccelSampleDelayMs,
            SettingValue::Int(config.accel_sample_delay_ms),
        );

    let mut scheduler = DutyCycleScheduler::new(
        ctx.clone(),
        &config,
        cloud,
        SimFlashPower::default(),
        accel,
        Esp32TimeAdapter::new(),
        LogEventSink::new(),
    );

    // ── 7. Run forever ────────────────────────────────────────
    let battery_interval = Duration::from_secs(u64::from(config.battery_sample_interval_s));
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();

    executor
        .spawn(async move { scheduler.run().await })
        .detach();
    executor
        .spawn(async move {
            let timer = Esp32TimeAdapter::new();
            let mut sink = LogEventSink::new();
            run_battery_loop(&mut battery, &ctx.vbus, &timer, &mut sink, battery_interval).await;
        })
        .detach();

    info!("Duty cycle started");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    Ok(())
}
