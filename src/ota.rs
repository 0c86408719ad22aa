//! OTA activity tracking.
//!
//! The firmware-update client reports its state asynchronously.  Only the
//! Idle / non-Idle distinction matters here: while an update is in flight
//! the scheduler keeps the cloud session open after each cycle.

use core::sync::atomic::{AtomicU32, Ordering};

use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaState {
    Idle,
    Downloading,
    Downloaded,
    Updating,
}

/// Why the OTA client changed state.  Carried for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtaReason {
    Ready,
    FirmwareUpdateFailed,
    NotEnoughSpace,
    OutOfRam,
    IntegrityCheckFailure,
    InvalidUri,
    FirmwareUpdateCancelled,
    AwaitRetry,
}

/// Busy counter used only as a zero / non-zero test.
pub struct OtaTracker {
    busy: AtomicU32,
}

impl Default for OtaTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OtaTracker {
    pub const fn new() -> Self {
        Self {
            busy: AtomicU32::new(0),
        }
    }

    /// Record a state notification.  Non-blocking; callback-safe.
    pub fn on_state(&self, state: OtaState, reason: OtaReason) {
        if state == OtaState::Idle {
            let was = self.busy.swap(0, Ordering::AcqRel);
            if was != 0 {
                info!("OTA idle ({:?})", reason);
            }
        } else {
            // Saturating: fetch_update only fails when the closure returns None.
            let _ = self
                .busy
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    Some(n.saturating_add(1))
                });
            debug!("OTA state {:?} ({:?})", state, reason);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire) != 0
    }
}
