//! Settings synchronisation through the device context.

use futures_lite::future::{block_on, poll_once};

use floatlevel::adapters::sim::SimSettingsTransport;
use floatlevel::app::context::PostOutcome;
use floatlevel::events::DeviceEvent;
use floatlevel::settings::{DeliveryStatus, SettingKey, SettingValue};

use crate::mocks::context;

fn deliver(ctx: &floatlevel::app::context::DeviceContext, key: SettingKey, value: SettingValue) -> PostOutcome {
    ctx.post(DeviceEvent::Setting { key, value })
}

fn deliver_all(ctx: &floatlevel::app::context::DeviceContext) {
    deliver(ctx, SettingKey::StreamDelayS, SettingValue::Int(120));
    deliver(ctx, SettingKey::FloatLength, SettingValue::Float(11.5));
    deliver(ctx, SettingKey::FloatOffset, SettingValue::Float(-0.5));
    deliver(ctx, SettingKey::AccelNumSamples, SettingValue::Int(5));
    deliver(ctx, SettingKey::AccelSampleDelayMs, SettingValue::Int(0));
}

#[test]
fn wait_ready_pends_until_last_key_arrives() {
    let ctx = context();
    assert!(block_on(poll_once(ctx.settings.wait_ready())).is_none());

    deliver_all(&ctx);
    assert!(ctx.settings.ready());
    block_on(ctx.settings.wait_ready());

    assert_eq!(ctx.settings.stream_delay_s(), 120);
    assert_eq!(ctx.settings.float_length_in(), 11.5);
    assert_eq!(ctx.settings.float_offset_in(), -0.5);
    assert_eq!(ctx.settings.accel_num_samples(), 5);
    assert_eq!(ctx.settings.accel_sample_delay_ms(), 0);
}

#[test]
fn reinit_rearms_gate_and_keeps_values() {
    let ctx = context();
    deliver_all(&ctx);
    assert!(ctx.settings.ready());

    let mut transport = SimSettingsTransport::default();
    ctx.settings.init(&mut transport);
    assert_eq!(transport.registered(), &SettingKey::ALL[..]);
    assert!(!ctx.settings.ready());
    assert!(block_on(poll_once(ctx.settings.wait_ready())).is_none());
    assert_eq!(ctx.settings.stream_delay_s(), 120, "values survive re-arm");

    deliver_all(&ctx);
    assert!(ctx.settings.ready());
    block_on(ctx.settings.wait_ready());
}

#[test]
fn second_sync_needs_every_key_again() {
    let ctx = context();
    deliver_all(&ctx);
    ctx.settings.reset();

    for key in &SettingKey::ALL[1..] {
        let value = ctx.settings.entry(*key).value;
        deliver(&ctx, *key, value);
    }
    assert!(!ctx.settings.ready());

    deliver(&ctx, SettingKey::StreamDelayS, SettingValue::Int(120));
    assert!(ctx.settings.ready());
}

#[test]
fn out_of_bounds_interval_is_rejected_without_wake() {
    let ctx = context();
    for bad in [0, -5, 86_401] {
        match deliver(&ctx, SettingKey::StreamDelayS, SettingValue::Int(bad)) {
            PostOutcome::Setting(d) => assert_eq!(d.status, DeliveryStatus::OutOfRange),
            other => panic!("unexpected {:?}", other),
        }
    }
    assert!(ctx.wake.try_take().is_none());
    assert!(!ctx.settings.entry(SettingKey::StreamDelayS).received);

    match deliver(&ctx, SettingKey::StreamDelayS, SettingValue::Int(86_400)) {
        PostOutcome::Setting(d) => assert!(d.wake),
        other => panic!("unexpected {:?}", other),
    }
    assert!(ctx.wake.try_take().is_some());
}

#[test]
fn float_keys_accept_any_finite_value_without_wake() {
    let ctx = context();
    deliver(&ctx, SettingKey::FloatOffset, SettingValue::Float(-1.0e6));
    assert_eq!(ctx.settings.float_offset_in(), -1.0e6);
    assert!(ctx.wake.try_take().is_none());
}
