//! Mock adapters for integration tests.
//!
//! Every mock records its calls so tests can assert on the full history
//! without real hardware, modem or cloud.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use floatlevel::app::context::DeviceContext;
use floatlevel::app::events::AppEvent;
use floatlevel::app::ports::{
    AccelerometerPort, CloudSession, ContentType, EventSink, PeripheralPower, SettingsTransport,
    TimerPort,
};
use floatlevel::config::DeviceConfig;
use floatlevel::connectivity::{NetworkEvent, RegistrationStatus, SessionEvent};
use floatlevel::error::{CloudError, PowerError, SensorError, SettingsError};
use floatlevel::events::DeviceEvent;
use floatlevel::settings::{Bounds, SettingKey};
use floatlevel::telemetry::AccelSample;

// ── Context helpers ───────────────────────────────────────────

pub struct AcceptAll;

impl SettingsTransport for AcceptAll {
    fn reset(&mut self) {}

    fn register(&mut self, _: SettingKey, _: Option<Bounds>) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// Context with every key registered and nothing received yet.
pub fn context() -> Arc<DeviceContext> {
    let ctx = Arc::new(DeviceContext::new(&DeviceConfig::default()));
    ctx.settings.init(&mut AcceptAll);
    ctx
}

/// Registered, network up, every setting received at its default.
#[allow(dead_code)]
pub fn ready_context() -> Arc<DeviceContext> {
    let ctx = context();
    ctx.post(DeviceEvent::Network(NetworkEvent::Registration(
        RegistrationStatus::RegisteredHome,
    )));
    for key in SettingKey::ALL {
        let value = ctx.settings.entry(key).value;
        ctx.post(DeviceEvent::Setting { key, value });
    }
    ctx
}

// ── Cloud ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CloudCall {
    Start,
    Stop,
    StreamSet {
        path: String,
        content_type: ContentType,
        len: usize,
    },
}

pub struct MockCloud {
    ctx: Arc<DeviceContext>,
    pub calls: Vec<CloudCall>,
    pub running: bool,
    pub connected: bool,
    pub connect_on_start: bool,
    pub publish_error: Option<CloudError>,
}

#[allow(dead_code)]
impl MockCloud {
    pub fn new(ctx: Arc<DeviceContext>) -> Self {
        Self {
            ctx,
            calls: Vec::new(),
            running: false,
            connected: false,
            connect_on_start: true,
            publish_error: None,
        }
    }

    pub fn count(&self, call: &CloudCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn published(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, CloudCall::StreamSet { .. }))
            .count()
    }
}

impl CloudSession for MockCloud {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) -> Result<(), CloudError> {
        self.calls.push(CloudCall::Start);
        self.running = true;
        if self.connect_on_start {
            self.connected = true;
            self.ctx.post(DeviceEvent::Session(SessionEvent::Connected));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.push(CloudCall::Stop);
        self.running = false;
        if self.connected {
            self.connected = false;
            self.ctx
                .post(DeviceEvent::Session(SessionEvent::Disconnected));
        }
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
        self.calls.push(CloudCall::StreamSet {
            path: path.to_owned(),
            content_type,
            len: payload.len(),
        });
        match self.publish_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ── Peripheral power ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerCall {
    Resume,
    Suspend,
}

#[derive(Default)]
pub struct MockPower {
    pub calls: Vec<PowerCall>,
}

impl PeripheralPower for MockPower {
    fn resume(&mut self) -> Result<(), PowerError> {
        self.calls.push(PowerCall::Resume);
        Ok(())
    }

    fn suspend(&mut self) -> Result<(), PowerError> {
        self.calls.push(PowerCall::Suspend);
        Ok(())
    }
}

// ── Accelerometer ─────────────────────────────────────────────

pub struct MockAccel {
    pub sample: AccelSample,
    pub fail_after: Option<usize>,
    pub reads: usize,
}

#[allow(dead_code)]
impl MockAccel {
    pub fn level() -> Self {
        Self {
            sample: AccelSample {
                x: 0.0,
                y: 0.0,
                z: -9.81,
            },
            fail_after: None,
            reads: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_after: Some(0),
            ..Self::level()
        }
    }
}

impl AccelerometerPort for MockAccel {
    fn read(&mut self) -> Result<AccelSample, SensorError> {
        if self.fail_after.is_some_and(|n| self.reads >= n) {
            return Err(SensorError::FetchFailed);
        }
        self.reads += 1;
        Ok(self.sample)
    }
}

// ── Timer ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStep {
    /// Resolve at once.
    Elapse,
    /// Never resolve.
    Hang,
    /// Signal the scheduler wake, then never resolve.
    WakeThenHang,
}

/// Scripted timer.  Once the script runs out every sleep elapses at once.
pub struct MockTimer {
    ctx: Arc<DeviceContext>,
    pub script: RefCell<VecDeque<TimerStep>>,
    pub sleeps: RefCell<Vec<Duration>>,
    pub wakes_sent: Cell<u32>,
}

#[allow(dead_code)]
impl MockTimer {
    pub fn new(ctx: Arc<DeviceContext>) -> Self {
        Self {
            ctx,
            script: RefCell::new(VecDeque::new()),
            sleeps: RefCell::new(Vec::new()),
            wakes_sent: Cell::new(0),
        }
    }

    pub fn then(self, step: TimerStep) -> Self {
        self.script.borrow_mut().push_back(step);
        self
    }

    pub fn last_sleep(&self) -> Option<Duration> {
        self.sleeps.borrow().last().copied()
    }
}

impl TimerPort for MockTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        self.sleeps.borrow_mut().push(duration);
        let step = self
            .script
            .borrow_mut()
            .pop_front()
            .unwrap_or(TimerStep::Elapse);
        if step == TimerStep::WakeThenHang {
            self.ctx.wake.signal(());
            self.wakes_sent.set(self.wakes_sent.get() + 1);
        }
        async move {
            if step != TimerStep::Elapse {
                futures_lite::future::pending::<()>().await;
            }
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Telemetry(_)))
            .count()
    }

    pub fn started(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, AppEvent::Started { .. }))
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
