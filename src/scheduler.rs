//! Duty-cycle scheduler.
//!
//! One-time setup, then the same cycle forever:
//!
//! ```text
//!  WaitConnectivity ──▶ WaitSettingsReady
//!                              │
//!        ┌─────────────────────┘
//!        ▼
//!  ResumePeripherals ──▶ EnsureSessionStarted ──▶ WaitSessionConnect(timeout)
//!        ▲                                               │
//!        │                                               ▼
//!  Sleep(interval) ◀── SuspendPeripherals ◀── DecideStopSession ◀── Publish / Skip
//!   (wake interrupts)
//! ```
//!
//! The session is started and stopped every cycle so the cloud client
//! re-registers its observations (settings, OTA) on each wake, even when
//! the link dropped during PSM.  While an OTA transfer is in flight the
//! session is left open.
//!
//! No step is retried within a cycle.  A failed step is logged and the
//! cycle carries on to the next sleep.

use core::time::Duration;
use std::sync::Arc;

use futures_lite::future;
use log::{error, info, warn};

use crate::app::context::DeviceContext;
use crate::app::events::AppEvent;
use crate::app::ports::{
    AccelerometerPort, CloudSession, ContentType, EventSink, PeripheralPower, TimerPort,
};
use crate::config::{DeviceConfig, TELEMETRY_PATH};
use crate::error::{CloudError, Error};
use crate::telemetry::{TelemetryFrame, encoder, sampler};

/// What happened to this cycle's telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PublishOutcome {
    Published,
    /// Settings have never been fully received; calibration unknown.
    SettingsNotReady,
    /// Sampled, but the session was not connected.
    NotConnected,
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub cycle: u32,
    pub session_connected: bool,
    pub publish: PublishOutcome,
    /// The session was left open because OTA was busy.
    pub session_kept_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Elapsed,
    /// Interrupted by an interval change.
    Woken,
}

pub struct DutyCycleScheduler<S, P, A, T, E> {
    ctx: Arc<DeviceContext>,
    cloud: S,
    power: P,
    accel: A,
    timer: T,
    sink: E,
    session_timeout: Duration,
    settings_observed: bool,
    cycle: u32,
}

impl<S, P, A, T, E> DutyCycleScheduler<S, P, A, T, E>
where
    S: CloudSession,
    P: PeripheralPower,
    A: AccelerometerPort,
    T: TimerPort,
    E: EventSink,
{
    pub fn new(
        ctx: Arc<DeviceContext>,
        config: &DeviceConfig,
        cloud: S,
        power: P,
        accel: A,
        timer: T,
        sink: E,
    ) -> Self {
        Self {
            ctx,
            cloud,
            power,
            accel,
            timer,
            sink,
            session_timeout: Duration::from_secs(u64::from(config.session_connect_timeout_s)),
            settings_observed: false,
            cycle: 0,
        }
    }

    pub fn cloud(&self) -> &S {
        &self.cloud
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Wait for network registration, start the session so settings can
    /// arrive, then wait until every setting has been received.
    ///
    /// Both waits are unbounded.  A key that failed to register keeps the
    /// device here forever.
    pub async fn start(&mut self) {
        info!("Connecting to LTE, this may take some time...");
        self.ctx.network.wait().await;

        info!("Connecting to cloud...");
        if let Err(e) = self.ensure_session_started() {
            error!("Failed to start cloud session: {}", e);
        }

        self.ctx.settings.wait_ready().await;
        self.settings_observed = true;

        self.sink.emit(&AppEvent::Started {
            stream_delay_s: self.ctx.settings.stream_delay_s(),
        });
    }

    /// Run [`start`](Self::start) and then cycle forever.
    pub async fn run(&mut self) {
        self.start().await;
        loop {
            self.run_cycle().await;
            self.sleep().await;
        }
    }

    /// One pass from resume to suspend.  Does not sleep.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle = self.cycle.wrapping_add(1);
        if self.ctx.settings.ready() {
            self.settings_observed = true;
        }

        if let Err(e) = self.power.resume() {
            warn!("Failed to resume flash: {}", e);
        }

        if let Err(e) = self.ensure_session_started() {
            error!("Failed to start cloud session: {}", e);
        }
        let session_connected = self.wait_session_connect().await;

        let publish = if self.settings_observed {
            self.publish().await
        } else {
            warn!("Settings not synchronised; skipping publish");
            PublishOutcome::SettingsNotReady
        };

        let session_kept_open = self.ctx.ota.is_busy();
        if session_kept_open {
            info!("OTA in progress; keeping cloud session open");
        } else {
            self.cloud.stop();
        }

        if let Err(e) = self.power.suspend() {
            warn!("Failed to suspend flash: {}", e);
        }

        let report = CycleReport {
            cycle: self.cycle,
            session_connected,
            publish,
            session_kept_open,
        };
        self.sink.emit(&AppEvent::CycleCompleted(report));
        report
    }

    fn ensure_session_started(&mut self) -> Result<(), CloudError> {
        if self.cloud.is_running() {
            return Ok(());
        }
        self.ctx.session.rearm();
        self.cloud.start()
    }

    async fn wait_session_connect(&self) -> bool {
        if self.ctx.session.is_connected() {
            return true;
        }

        let connected = future::or(
            async {
                self.ctx.session.wait_connected().await;
                true
            },
            async {
                self.timer.sleep(self.session_timeout).await;
                false
            },
        )
        .await;

        if !connected {
            warn!(
                "Cloud session did not connect within {} s",
                self.session_timeout.as_secs()
            );
        }
        connected
    }

    async fn publish(&mut self) -> PublishOutcome {
        let settings = &self.ctx.settings;
        let n = u32::try_from(settings.accel_num_samples()).unwrap_or(0);
        let delay_ms = u64::try_from(settings.accel_sample_delay_ms()).unwrap_or(0);
        let length = f64::from(settings.float_length_in());
        let offset = f64::from(settings.float_offset_in());

        let avg = match sampler::sample(
            &mut self.accel,
            &self.timer,
            n,
            Duration::from_millis(delay_ms),
        )
        .await
        {
            Ok(avg) => avg,
            Err(e) => {
                error!("Accelerometer sampling failed: {}", e);
                return PublishOutcome::Failed(e.into());
            }
        };

        let frame = TelemetryFrame::from_average(avg, length, offset);
        self.sink.emit(&AppEvent::Telemetry(frame));

        if !self.cloud.is_connected() {
            warn!("Cloud session not connected; telemetry not sent");
            return PublishOutcome::NotConnected;
        }

        let payload = match encoder::encode(&frame) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to encode sensor data: {}", e);
                return PublishOutcome::Failed(e.into());
            }
        };

        match self
            .cloud
            .stream_set(TELEMETRY_PATH, ContentType::Cbor, &payload)
        {
            Ok(()) => PublishOutcome::Published,
            Err(e) => {
                error!("Failed to send sensor data: {}", e);
                PublishOutcome::Failed(e.into())
            }
        }
    }

    /// Sleep for the current interval, or until an interval change.
    ///
    /// The interval is read fresh on every call.  A wake that arrived
    /// while the cycle was running is dropped here; the new interval is
    /// picked up by this read anyway.
    pub async fn sleep(&mut self) -> SleepOutcome {
        self.ctx.wake.reset();
        let secs = u64::try_from(self.ctx.settings.stream_delay_s()).unwrap_or(1);
        let interval = Duration::from_secs(secs);

        let outcome = future::or(
            async {
                self.timer.sleep(interval).await;
                SleepOutcome::Elapsed
            },
            async {
                self.ctx.wake.wait().await;
                SleepOutcome::Woken
            },
        )
        .await;

        if outcome == SleepOutcome::Woken {
            info!("Interval changed; starting next cycle now");
        }
        outcome
    }
}
