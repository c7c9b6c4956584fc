// SPDX-License-Identifier: GPL-3.0-only

//! The capture backend trait (spec.md §4.2), grounded on the original
//! implementation's `capture_api_s` interface (`capture_api.h`) and on the
//! `CameraBackend` trait's shape (enumerate/initialize/shutdown/operate).

use crate::capture::types::{CapturedFrame, Resolution, VideoMode};
use crate::capture::event_queue::CaptureEvent;
use crate::errors::{CaptureError, VcsResult};

/// A physical or virtual capture input channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputChannel(pub u32);

/// The device-facing half of the capture subsystem: everything the
/// coordinator needs from a concrete capture card, driver, or test source.
///
/// Implementations own a frame buffer shared with a producer thread or
/// callback (see [`crate::capture::virtual_backend::VirtualBackend`] for the
/// reference implementation of that sharing pattern). `&mut self` methods
/// are only ever called from the coordinator's thread; the shared buffer is
/// the only state a producer touches concurrently.
pub trait CaptureBackend: Send {
    /// One-time setup: opens the device, starts any producer thread.
    fn initialize(&mut self) -> VcsResult<()>;

    /// Releases the device and stops any producer thread. Safe to call
    /// multiple times.
    fn release(&mut self) -> VcsResult<()>;

    /// Polls the backend for its next event. Must not block longer than a
    /// few milliseconds; a backend with nothing to report returns
    /// [`CaptureEvent::Sleep`] or [`CaptureEvent::None`].
    fn pop_event(&mut self) -> CaptureEvent;

    /// Borrows the most recently captured frame. Valid only in the window
    /// between a [`CaptureEvent::NewFrame`] event and the matching call to
    /// [`CaptureBackend::mark_frame_buffer_as_processed`].
    fn peek_frame_buffer(&self) -> VcsResult<&CapturedFrame>;

    /// Signals that the coordinator has finished reading the current frame
    /// buffer, allowing the producer to overwrite it.
    fn mark_frame_buffer_as_processed(&mut self);

    /// The device's currently reported video mode, if a signal is present.
    fn current_video_mode(&self) -> Option<VideoMode>;

    /// The device's minimum and maximum supported resolution.
    fn resolution_bounds(&self) -> (Resolution, Resolution);

    /// Forces the device to capture at `resolution`, overriding whatever
    /// mode it auto-detected. Returns [`CaptureError::NoSignal`] if no
    /// signal is present, or [`CaptureError::ResolutionOutOfRange`] if
    /// `resolution` falls outside [`CaptureBackend::resolution_bounds`].
    fn force_capture_resolution(&mut self, resolution: Resolution) -> VcsResult<()>;

    /// The number of input channels this device exposes.
    fn input_channel_count(&self) -> u32;

    /// The currently selected input channel.
    fn current_input_channel(&self) -> InputChannel;

    /// Selects a different input channel. Returns
    /// [`CaptureError::InvalidInputChannel`] if `channel` is out of range.
    fn set_input_channel(&mut self, channel: InputChannel) -> VcsResult<()>;

    /// A human-readable name for this backend, for logging.
    fn device_name(&self) -> &str;

    /// The number of frames the producer has dropped since the last
    /// [`CaptureBackend::reset_missed_frames_count`] call, because the
    /// coordinator hadn't yet consumed the previous one (spec.md §4.2).
    fn missed_frames_count(&self) -> u32;

    /// Zeroes the dropped-frame counter, typically after reporting it.
    fn reset_missed_frames_count(&mut self);

    /// Whether the device currently reports a stable, decodable signal.
    /// `false` covers both "no cable" and "signal present but unreadable"
    /// (spec.md §4.3's "if valid signal" gating on frame/mode delivery).
    fn has_valid_signal(&self) -> bool;

    /// Whether the device is receiving any signal at all, stable or not.
    /// Distinct from [`CaptureBackend::has_valid_signal`]: a flickering or
    /// out-of-range signal is "receiving" without being "valid".
    fn is_receiving_signal(&self) -> bool;
}
