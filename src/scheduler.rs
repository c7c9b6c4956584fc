// SPDX-License-Identifier: GPL-3.0-only

//! The eco-mode adaptive sleep scheduler (spec.md §4.7), grounded on the
//! main-loop timing description in spec.md and on the teacher's plain
//! struct-holds-state timer pattern (no new async runtime).
//!
//! The scheduler measures the interval between event-carrying capture
//! calls (anything but `Sleep`/`None`) and low-pass filters a sleep target
//! toward 85% of that interval, so the main loop spends most of its idle
//! time asleep without drifting behind a roughly-periodic capture source.

use std::time::{Duration, Instant};

use crate::capture::event_queue::CaptureEvent;
use crate::constants::timing::{ECO_DROPPED_FRAME_PENALTY, ECO_LOWPASS_WEIGHT, ECO_SLEEP_CAP, ECO_TARGET_FRACTION, NO_SIGNAL_SLEEP};

fn lerp(from: f64, to: f64, weight: f64) -> f64 {
    from + (to - from) * weight
}

/// Adaptive sleep state for the main loop's eco mode. Call
/// [`EcoScheduler::record_event`] once per iteration with the event
/// [`crate::capture::coordinator::CaptureCoordinator::process_next_capture_event`]
/// just returned, then [`EcoScheduler::maybe_sleep`] to apply whatever
/// sleep that leaves the scheduler wanting.
#[derive(Debug, Clone, Copy)]
pub struct EcoScheduler {
    enabled: bool,
    target_ms: f64,
    last_event_at: Option<Instant>,
    frames_dropped_since_last_event: bool,
}

impl EcoScheduler {
    pub fn new() -> Self {
        Self { enabled: false, target_ms: 0.0, last_event_at: None, frames_dropped_since_last_event: false }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The scheduler's current low-pass-filtered sleep target.
    pub fn target(&self) -> Duration {
        Duration::from_secs_f64(self.target_ms.max(0.0) / 1000.0)
    }

    /// Updates the sleep target from one main-loop iteration's outcome.
    /// `frames_dropped_since_last_event` should reflect whether the
    /// backend's `missed_frames_count()` grew since the previous call —
    /// the caller owns resetting that counter.
    pub fn record_event(&mut self, event: CaptureEvent, frames_dropped_since_last_event: bool) {
        self.frames_dropped_since_last_event = frames_dropped_since_last_event;

        let is_event_carrying = !matches!(event, CaptureEvent::Sleep | CaptureEvent::None);
        if !is_event_carrying {
            return;
        }

        let now = Instant::now();
        if let Some(last) = self.last_event_at {
            let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
            let divisor = if frames_dropped_since_last_event { ECO_DROPPED_FRAME_PENALTY } else { 1.0 };
            let decayed_target = self.target_ms / divisor;
            let sample = ECO_TARGET_FRACTION * elapsed_ms;
            self.target_ms = lerp(decayed_target, sample, ECO_LOWPASS_WEIGHT);
        }
        self.last_event_at = Some(now);
    }

    /// Sleeps the main thread per spec.md §4.7's step 4, if eco mode is
    /// enabled. A lost signal always sleeps a fixed [`NO_SIGNAL_SLEEP`]; a
    /// dropped frame this interval skips the sleep entirely, to recover
    /// latency as fast as possible.
    pub fn maybe_sleep(&self, has_valid_signal: bool) {
        if !self.enabled {
            return;
        }
        if !has_valid_signal {
            std::thread::sleep(NO_SIGNAL_SLEEP);
            return;
        }
        if self.frames_dropped_since_last_event {
            return;
        }

        let cap_ms = ECO_SLEEP_CAP.as_secs_f64() * 1000.0;
        let sleep_ms = self.target_ms.min(cap_ms).max(0.0);
        if sleep_ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(sleep_ms / 1000.0));
        }
    }
}

impl Default for EcoScheduler {
    fn default() -> Self {
        Self::new()
    }
}
