// SPDX-License-Identifier: GPL-3.0-only

//! The frame and video-mode data model (spec.md §3).

use crate::constants::MAX_FRAME_BYTES;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// A capture or output resolution, together with its bit depth.
///
/// Invariant: `bpp` is one of 16, 24, or 32, and `w * h * bpp / 8` does not
/// exceed [`MAX_FRAME_BYTES`]. The core's anti-tear and filter subsystems
/// additionally assume a fixed runtime pixel format of 32-bit BGRA; 16-bit
/// capture modes are expected to be converted upstream by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub w: u32,
    pub h: u32,
    pub bpp: u32,
}

impl Resolution {
    /// Constructs a resolution, clamping nothing — validity is checked
    /// separately via [`Resolution::is_valid`].
    pub fn new(w: u32, h: u32, bpp: u32) -> Self {
        Self { w, h, bpp }
    }

    /// `true` if `bpp` is a supported depth and the pixel buffer this
    /// resolution describes fits within [`MAX_FRAME_BYTES`].
    pub fn is_valid(&self) -> bool {
        matches!(self.bpp, 16 | 24 | 32) && self.byte_size() <= MAX_FRAME_BYTES
    }

    /// The number of bytes a frame at this resolution occupies.
    pub fn byte_size(&self) -> usize {
        (self.w as usize) * (self.h as usize) * (self.bpp as usize) / 8
    }

    /// The number of bytes a single row occupies.
    pub fn row_bytes(&self) -> usize {
        (self.w as usize) * (self.bpp as usize) / 8
    }

    /// `true` if this resolution (by `(w, h)` only) falls within the given
    /// device-reported `[min, max]` bounds, inclusive.
    pub fn within_bounds(&self, min: Resolution, max: Resolution) -> bool {
        self.w >= min.w && self.w <= max.w && self.h >= min.h && self.h <= max.h
    }
}

/// The pixel format the core operates on internally. Capture backends are
/// responsible for delivering frames already converted to this format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 32 bits per pixel, byte order B, G, R, A.
    Bgra32,
}

/// A single captured frame, owned by the capture backend and borrowed
/// read-only by the coordinator between a `NewFrame` event and the matching
/// `mark_frame_buffer_as_processed` call.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub resolution: Resolution,
    pub pixels: Vec<u8>,
    pub timestamp: Instant,
    pub pixel_format: PixelFormat,
    pub processed: bool,
}

impl CapturedFrame {
    /// Allocates a frame buffer pre-sized to `resolution`, filled with
    /// zeroes.
    pub fn blank(resolution: Resolution, pixel_format: PixelFormat) -> Self {
        Self {
            resolution,
            pixels: vec![0u8; resolution.byte_size()],
            timestamp: Instant::now(),
            pixel_format,
            processed: true,
        }
    }
}

/// A refresh rate comparator tag, determining how two refresh rates (stored
/// in milli-Hz to avoid float drift) are considered equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRateComparator {
    Equals,
    Ceiled,
    Floored,
    Rounded,
}

impl RefreshRateComparator {
    /// Compares `a` against `b` (both in milli-Hz) under this comparator's
    /// semantics.
    pub fn matches(&self, a_m_hz: u32, b_m_hz: u32) -> bool {
        match self {
            RefreshRateComparator::Equals => a_m_hz == b_m_hz,
            RefreshRateComparator::Ceiled => (a_m_hz as i64 - b_m_hz as i64) >= 0,
            RefreshRateComparator::Floored => (a_m_hz as i64 - b_m_hz as i64) <= 0,
            RefreshRateComparator::Rounded => {
                let diff = (a_m_hz as i64 - b_m_hz as i64).abs();
                diff <= 500 // within half a Hz, expressed in milli-Hz
            }
        }
    }
}

/// A capture device video mode: a resolution paired with a refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMode {
    pub resolution: Resolution,
    pub refresh_rate_m_hz: u32,
}

impl VideoMode {
    pub fn new(resolution: Resolution, refresh_rate_m_hz: u32) -> Self {
        Self { resolution, refresh_rate_m_hz }
    }

    /// `true` iff `resolution` falls within `[min, max]` device bounds.
    pub fn is_valid(&self, min: Resolution, max: Resolution) -> bool {
        self.resolution.within_bounds(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_validity() {
        assert!(Resolution::new(640, 480, 32).is_valid());
        assert!(!Resolution::new(640, 480, 17).is_valid());
        assert!(!Resolution::new(1_000_000, 1_000_000, 32).is_valid());
    }

    #[test]
    fn byte_size_matches_row_bytes_times_height() {
        let r = Resolution::new(640, 480, 32);
        assert_eq!(r.byte_size(), r.row_bytes() * 480);
        assert_eq!(r.byte_size(), 640 * 480 * 4);
    }

    #[test]
    fn refresh_rate_rounded_tolerance() {
        assert!(RefreshRateComparator::Rounded.matches(70_086, 70_000));
        assert!(!RefreshRateComparator::Rounded.matches(70_086, 60_000));
    }
}
