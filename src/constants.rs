// SPDX-License-Identifier: GPL-3.0-only

//! Crate-wide constants.

/// The largest frame this crate will allocate buffers for, in bytes.
///
/// Sized for a 7680x4320 (8K) frame at 32 bits per pixel, matching the
/// largest resolution tier the capture device interface is expected to
/// report (see `capture::types::Resolution`).
pub const MAX_FRAME_BYTES: usize = 7680 * 4320 * 4;

/// Anti-tear engine defaults, carried over from the original implementation's
/// `KAT_DEFAULT_*` constants (`anti_tear.h`), since spec.md documents the
/// parameters but not their default values.
pub mod anti_tear_defaults {
    /// `KAT_DEFAULT_THRESHOLD`
    pub const THRESHOLD: u32 = 3;
    /// `KAT_DEFAULT_WINDOW_LENGTH`
    pub const WINDOW_LENGTH: u32 = 8;
    /// `KAT_DEFAULT_NUM_MATCHES_REQUIRED`
    pub const MATCHES_REQUIRED: u32 = 11;
    /// `KAT_DEFAULT_STEP_SIZE`
    pub const STEP_SIZE: u32 = 1;
    /// `KAT_DEFAULT_VISUALIZE_TEARS`
    pub const VISUALIZE_TEARS: bool = false;
    /// `KAT_DEFAULT_VISUALIZE_SCAN_RANGE`
    pub const VISUALIZE_SCAN_RANGE: bool = false;
}

/// Main-loop / eco-scheduler timing constants (spec.md §4.7).
pub mod timing {
    use std::time::Duration;

    /// The interval the main loop sleeps for on a `Sleep` event.
    pub const SLEEP_EVENT_INTERVAL: Duration = Duration::from_millis(4);

    /// The fixed sleep applied while no capture signal is present.
    pub const NO_SIGNAL_SLEEP: Duration = Duration::from_millis(10);

    /// The eco scheduler's hard cap on adaptive sleep duration.
    pub const ECO_SLEEP_CAP: Duration = Duration::from_millis(10);

    /// Fraction of the measured inter-event interval the eco scheduler
    /// targets sleeping for.
    pub const ECO_TARGET_FRACTION: f64 = 0.85;

    /// Low-pass filter weight applied to each new sample when updating the
    /// eco scheduler's sleep target.
    pub const ECO_LOWPASS_WEIGHT: f64 = 0.01;

    /// Divisor applied to the running sleep target for the interval
    /// immediately following one or more dropped frames.
    pub const ECO_DROPPED_FRAME_PENALTY: f64 = 1.5;
}

/// Visualization constants for the anti-tear engine's diagnostic overlays.
pub mod visualization {
    /// Spacing (in pixels) of the dot pattern/dashed-line overlay used by
    /// `visualize_scan_range`.
    pub const PATTERN_DENSITY: u32 = 9;
}
