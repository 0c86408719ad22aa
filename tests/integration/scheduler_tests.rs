//! Duty-cycle scheduler against mock ports.

use std::sync::Arc;
use std::time::Duration;

use futures_lite::future::{block_on, poll_once};

use floatlevel::adapters::sim::{SimCloud, SimFlashPower, SimLink};
use floatlevel::app::context::DeviceContext;
use floatlevel::app::ports::{CloudSession, ContentType, LinkPort};
use floatlevel::config::DeviceConfig;
use floatlevel::error::{CloudError, Error, SensorError};
use floatlevel::events::DeviceEvent;
use floatlevel::ota::{OtaReason, OtaState};
use floatlevel::scheduler::{DutyCycleScheduler, PublishOutcome, SleepOutcome};
use floatlevel::settings::{SettingKey, SettingValue};

use crate::mocks::{
    CloudCall, MockAccel, MockCloud, MockPower, MockTimer, PowerCall, RecordingSink, TimerStep,
    context, ready_context,
};

type Sched = DutyCycleScheduler<MockCloud, MockPower, MockAccel, MockTimer, RecordingSink>;

fn scheduler(ctx: &Arc<DeviceContext>, cloud: MockCloud, accel: MockAccel, timer: MockTimer) -> Sched {
    DutyCycleScheduler::new(
        ctx.clone(),
        &DeviceConfig::default(),
        cloud,
        MockPower::default(),
        accel,
        timer,
        RecordingSink::default(),
    )
}

fn default_scheduler(ctx: &Arc<DeviceContext>) -> Sched {
    scheduler(
        ctx,
        MockCloud::new(ctx.clone()),
        MockAccel::level(),
        MockTimer::new(ctx.clone()),
    )
}

fn set_ota(ctx: &DeviceContext, state: OtaState) {
    ctx.post(DeviceEvent::Ota {
        state,
        reason: OtaReason::Ready,
    });
}

// ── Start-up gating ───────────────────────────────────────────

#[test]
fn start_blocks_until_network_registration() {
    let ctx = context();
    let mut s = default_scheduler(&ctx);
    assert!(block_on(poll_once(s.start())).is_none());
    assert!(s.cloud().calls.is_empty(), "no session before network");
}

#[test]
fn start_blocks_until_all_settings_received() {
    let ctx = context();
    ctx.post(DeviceEvent::Network(
        floatlevel::connectivity::NetworkEvent::Registration(
            floatlevel::connectivity::RegistrationStatus::RegisteredRoaming,
        ),
    ));
    let mut s = default_scheduler(&ctx);

    assert!(block_on(poll_once(s.start())).is_none());
    assert_eq!(s.cloud().count(&CloudCall::Start), 1, "session started for settings");
    assert!(!s.sink().started());

    for key in SettingKey::ALL {
        let value = ctx.settings.entry(key).value;
        ctx.post(DeviceEvent::Setting { key, value });
    }
    block_on(s.start());
    assert!(s.sink().started());
    assert_eq!(s.cloud().count(&CloudCall::Start), 1, "start is idempotent");
}

// ── One cycle ─────────────────────────────────────────────────

#[test]
fn cycle_publishes_cbor_and_closes_session() {
    let ctx = ready_context();
    let mut s = default_scheduler(&ctx);
    block_on(s.start());

    let r = block_on(s.run_cycle());
    assert_eq!(r.publish, PublishOutcome::Published);
    assert!(r.session_connected);
    assert!(!r.session_kept_open);

    let cloud = s.cloud();
    assert!(cloud.calls.contains(&CloudCall::StreamSet {
        path: "sensor".into(),
        content_type: ContentType::Cbor,
        len: 155,
    }));
    assert_eq!(cloud.calls.last(), Some(&CloudCall::Stop));
    assert!(!cloud.running);
    assert_eq!(s.power().calls, vec![PowerCall::Resume, PowerCall::Suspend]);
    assert_eq!(s.sink().telemetry_count(), 1);
}

#[test]
fn samples_are_spaced_by_the_configured_delay() {
    let ctx = ready_context();
    ctx.post(DeviceEvent::Setting {
        key: SettingKey::AccelNumSamples,
        value: SettingValue::Int(4),
    });
    ctx.post(DeviceEvent::Setting {
        key: SettingKey::AccelSampleDelayMs,
        value: SettingValue::Int(25),
    });
    let mut s = default_scheduler(&ctx);
    block_on(s.run_cycle());
    assert_eq!(
        *s.timer().sleeps.borrow(),
        vec![Duration::from_millis(25); 3]
    );
}

#[test]
fn ota_busy_keeps_session_open() {
    let ctx = ready_context();
    let mut s = default_scheduler(&ctx);
    block_on(s.start());

    set_ota(&ctx, OtaState::Downloading);
    let r = block_on(s.run_cycle());
    assert!(r.session_kept_open);
    assert_eq!(s.cloud().count(&CloudCall::Stop), 0);
    assert!(s.cloud().running);

    // Still busy: session is reused, not restarted.
    set_ota(&ctx, OtaState::Updating);
    block_on(s.run_cycle());
    assert_eq!(s.cloud().count(&CloudCall::Start), 1);
    assert_eq!(s.cloud().count(&CloudCall::Stop), 0);

    set_ota(&ctx, OtaState::Idle);
    let r = block_on(s.run_cycle());
    assert!(!r.session_kept_open);
    assert_eq!(s.cloud().count(&CloudCall::Stop), 1);
    assert!(!s.cloud().running);
}

#[test]
fn session_connect_timeout_skips_send() {
    let ctx = ready_context();
    let mut cloud = MockCloud::new(ctx.clone());
    cloud.connect_on_start = false;
    let mut s = scheduler(&ctx, cloud, MockAccel::level(), MockTimer::new(ctx.clone()));

    let r = block_on(s.run_cycle());
    assert!(!r.session_connected);
    assert_eq!(r.publish, PublishOutcome::NotConnected);
    assert_eq!(s.cloud().published(), 0);
    assert_eq!(s.timer().sleeps.borrow()[0], Duration::from_secs(30));
    assert_eq!(s.sink().telemetry_count(), 1, "frame still sampled");
}

#[test]
fn publish_failure_is_not_retried() {
    let ctx = ready_context();
    let mut cloud = MockCloud::new(ctx.clone());
    cloud.publish_error = Some(CloudError::Transport);
    let mut s = scheduler(&ctx, cloud, MockAccel::level(), MockTimer::new(ctx.clone()));

    let r = block_on(s.run_cycle());
    assert_eq!(r.publish, PublishOutcome::Failed(Error::Cloud(CloudError::Transport)));
    assert_eq!(s.cloud().published(), 1);
    assert_eq!(s.cloud().calls.last(), Some(&CloudCall::Stop));
}

#[test]
fn sensor_failure_aborts_publish_but_finishes_cycle() {
    let ctx = ready_context();
    let mut s = scheduler(
        &ctx,
        MockCloud::new(ctx.clone()),
        MockAccel::failing(),
        MockTimer::new(ctx.clone()),
    );

    let r = block_on(s.run_cycle());
    assert_eq!(
        r.publish,
        PublishOutcome::Failed(Error::Sensor(SensorError::FetchFailed))
    );
    assert_eq!(s.cloud().published(), 0);
    assert_eq!(s.sink().telemetry_count(), 0);
    assert_eq!(s.power().calls.last(), Some(&PowerCall::Suspend));
}

#[test]
fn no_publish_before_settings_ready() {
    let ctx = context();
    let mut s = default_scheduler(&ctx);
    let r = block_on(s.run_cycle());
    assert_eq!(r.publish, PublishOutcome::SettingsNotReady);
    assert_eq!(s.cloud().published(), 0);
    assert_eq!(s.sink().telemetry_count(), 0);
}

// ── Sleep ─────────────────────────────────────────────────────

#[test]
fn sleep_reads_interval_fresh_each_time() {
    let ctx = ready_context();
    let mut s = default_scheduler(&ctx);

    assert_eq!(block_on(s.sleep()), SleepOutcome::Elapsed);
    assert_eq!(s.timer().last_sleep(), Some(Duration::from_secs(300)));

    ctx.post(DeviceEvent::Setting {
        key: SettingKey::StreamDelayS,
        value: SettingValue::Int(45),
    });
    assert_eq!(block_on(s.sleep()), SleepOutcome::Elapsed);
    assert_eq!(s.timer().last_sleep(), Some(Duration::from_secs(45)));
}

#[test]
fn interval_change_interrupts_sleep() {
    let ctx = ready_context();
    let timer = MockTimer::new(ctx.clone()).then(TimerStep::WakeThenHang);
    let mut s = scheduler(&ctx, MockCloud::new(ctx.clone()), MockAccel::level(), timer);

    assert_eq!(block_on(s.sleep()), SleepOutcome::Woken);
    assert_eq!(s.timer().wakes_sent.get(), 1);
}

#[test]
fn pending_sleep_stays_pending_without_wake() {
    let ctx = ready_context();
    let timer = MockTimer::new(ctx.clone()).then(TimerStep::Hang);
    let mut s = scheduler(&ctx, MockCloud::new(ctx.clone()), MockAccel::level(), timer);
    assert!(block_on(poll_once(s.sleep())).is_none());
}

#[test]
fn duplicate_interval_does_not_wake() {
    let ctx = ready_context();
    ctx.post(DeviceEvent::Setting {
        key: SettingKey::StreamDelayS,
        value: SettingValue::Int(300),
    });
    assert!(ctx.wake.try_take().is_none());

    ctx.post(DeviceEvent::Setting {
        key: SettingKey::StreamDelayS,
        value: SettingValue::Int(600),
    });
    assert!(ctx.wake.try_take().is_some());
    assert!(ctx.wake.try_take().is_none(), "exactly one wake");
}

// ── Bench stand-ins end to end ────────────────────────────────

#[test]
fn bench_stack_runs_a_full_cycle() {
    let ctx = context();
    SimLink::default()
        .connect_async(ctx.network_handler())
        .unwrap();

    let mut cloud = SimCloud::new(ctx.clone());
    for key in SettingKey::ALL {
        cloud = cloud.with_remote(key, ctx.settings.entry(key).value);
    }
    let cloud = cloud.with_remote(SettingKey::FloatLength, SettingValue::Float(10.0));

    let mut s = DutyCycleScheduler::new(
        ctx.clone(),
        &DeviceConfig::default(),
        cloud,
        SimFlashPower::default(),
        MockAccel::level(),
        MockTimer::new(ctx.clone()),
        RecordingSink::default(),
    );

    block_on(s.start());
    let r = block_on(s.run_cycle());
    assert_eq!(r.publish, PublishOutcome::Published);
    assert_eq!(s.cloud().published(), 1);
    assert_eq!(s.cloud().last_payload().map(<[u8]>::len), Some(155));
    assert!(s.power().is_suspended());
    assert!(!s.cloud().is_running());
    assert_eq!(ctx.settings.float_length_in(), 10.0);

    // Next cycle restarts the session and re-pushes settings.
    block_on(s.run_cycle());
    assert_eq!(s.cloud().starts(), 2);
    assert_eq!(s.cloud().published(), 2);
}
