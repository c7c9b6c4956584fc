// SPDX-License-Identifier: GPL-3.0-only

//! The scaler integration point (spec.md §2, "Scaler integration point":
//! "Consumes a post-filter frame; outside the core but its interface is
//! specified"). Scaling itself (the OpenGL presentation widget, any GPU or
//! CPU resampling) is explicitly out of scope (spec.md §1 Non-goals); this
//! module only specifies the boundary a real scaler plugs into.

use crate::capture::types::Resolution;

/// Something that turns a post-filter, post-anti-tear frame into pixels at
/// an output resolution. Grounded on [`crate::capture::backend::CaptureBackend`]'s
/// shape as the other external-collaborator trait this core defines: a
/// small, object-safe vtable the app wires in, not an in-core
/// implementation.
pub trait Scaler: Send {
    /// Scales `pixels` (at `input_resolution`) to `output_resolution`,
    /// returning a freshly allocated buffer. Implementations decide their
    /// own resampling method (nearest, bilinear, a GPU shader); this core
    /// has no opinion on it.
    fn scale(&mut self, pixels: &[u8], input_resolution: Resolution, output_resolution: Resolution) -> Vec<u8>;

    /// The resolution this scaler will target, if it can be asked ahead of
    /// presentation rather than driven frame by frame.
    fn target_resolution(&self) -> Option<Resolution>;
}

/// A [`Scaler`] that performs no resampling: it requires the output
/// resolution to equal the input resolution and passes pixels through
/// unchanged. Useful as the default for headless pipelines and tests where
/// an external GPU/CPU scaler hasn't been wired in yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughScaler {
    target: Option<Resolution>,
}

impl PassthroughScaler {
    pub fn new(target: Option<Resolution>) -> Self {
        Self { target }
    }
}

impl Scaler for PassthroughScaler {
    fn scale(&mut self, pixels: &[u8], input_resolution: Resolution, output_resolution: Resolution) -> Vec<u8> {
        if input_resolution.w != output_resolution.w || input_resolution.h != output_resolution.h {
            tracing::warn!(
                input = ?input_resolution,
                output = ?output_resolution,
                "passthrough scaler asked to resize; returning input unchanged"
            );
        }
        pixels.to_vec()
    }

    fn target_resolution(&self) -> Option<Resolution> {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_copies_pixels_unchanged_when_resolutions_match() {
        let resolution = Resolution::new(4, 4, 32);
        let mut scaler = PassthroughScaler::new(Some(resolution));
        let pixels = vec![9u8; resolution.byte_size()];
        let out = scaler.scale(&pixels, resolution, resolution);
        assert_eq!(out, pixels);
    }

    #[test]
    fn target_resolution_reports_what_was_configured() {
        let resolution = Resolution::new(1920, 1080, 32);
        let scaler = PassthroughScaler::new(Some(resolution));
        assert_eq!(scaler.target_resolution(), Some(resolution));
    }
}
