//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::scheduler::PublishOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { stream_delay_s } => {
                info!("START | stream_delay={}s", stream_delay_s);
            }
            AppEvent::Telemetry(f) => {
                debug!(
                    "X: {:.6}; Y: {:.6}; Z: {:.6}",
                    f.accel.x, f.accel.y, f.accel.z
                );
                info!(
                    "TELEM | roll={:.2}\u{00b0} pitch={:.2}\u{00b0} | \
                     float length={:.2}in offset={:.2}in height={:.2}in",
                    f.tilt.roll_deg,
                    f.tilt.pitch_deg,
                    f.water_level.float_length,
                    f.water_level.float_offset,
                    f.water_level.float_height,
                );
            }
            AppEvent::Battery(b) => {
                info!(
                    "BATT | {:.3}V {:.3}A {:.1}\u{00b0}C soc={:.1}%",
                    b.voltage_v, b.current_a, b.temp_c, b.soc_pct
                );
            }
            AppEvent::CycleCompleted(r) => {
                let publish = match r.publish {
                    PublishOutcome::Published => "sent",
                    PublishOutcome::SettingsNotReady => "settings-pending",
                    PublishOutcome::NotConnected => "offline",
                    PublishOutcome::Failed(_) => "failed",
                };
                info!(
                    "CYCLE | #{} | session={} | telemetry={} | keep_open={}",
                    r.cycle,
                    if r.session_connected { "up" } else { "down" },
                    publish,
                    r.session_kept_open,
                );
            }
        }
    }
}
