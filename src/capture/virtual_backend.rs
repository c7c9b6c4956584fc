// SPDX-License-Identifier: GPL-3.0-only

//! A software capture backend driven by a user-supplied frame source,
//! standing in for a physical capture card in tests, demos, and headless
//! pipelines.
//!
//! Grounded on the teacher's `Arc<Mutex<Option<Frame>>>` producer/consumer
//! sharing pattern (`backends/camera/v4l2_kernel_depth.rs`,
//! `depth_native.rs`) and the thread lifecycle handling of
//! `CaptureLoopController` (`backends/camera/frame_loop.rs`): a producer
//! thread pushes frames, the coordinator consumes them non-blockingly and
//! drops a frame rather than wait on contention.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, warn};

use crate::capture::backend::{CaptureBackend, InputChannel};
use crate::capture::event_queue::CaptureEvent;
use crate::capture::types::{CapturedFrame, Resolution, VideoMode};
use crate::errors::{CaptureError, VcsResult};

/// A source of synthetic frames for [`VirtualBackend`]. Implementors are
/// driven from the backend's producer thread; `next_frame` may block.
pub trait FrameSource: Send {
    /// Produces the next frame, or `None` if the source is exhausted (the
    /// producer thread exits and the backend reports no further events).
    fn next_frame(&mut self) -> Option<CapturedFrame>;

    /// The resolution bounds this source claims to support.
    fn resolution_bounds(&self) -> (Resolution, Resolution);
}

struct SharedState {
    frame: Mutex<Option<CapturedFrame>>,
    video_mode: Mutex<Option<VideoMode>>,
    has_new_frame: AtomicBool,
    signal_lost: AtomicBool,
    stop: AtomicBool,
    dropped_frames: AtomicU32,
}

/// A [`CaptureBackend`] backed by a [`FrameSource`] run on a dedicated
/// producer thread.
pub struct VirtualBackend {
    name: String,
    shared: Arc<SharedState>,
    thread_handle: Option<JoinHandle<()>>,
    resolution_bounds: (Resolution, Resolution),
    current_frame: Option<CapturedFrame>,
    input_channel: InputChannel,
    input_channel_count: u32,
    source_factory: Option<Box<dyn FnOnce() -> Box<dyn FrameSource> + Send>>,
}

impl VirtualBackend {
    /// Creates a backend around a frame source factory. The factory runs on
    /// the producer thread, not the caller's, so the source itself need not
    /// be `Send` to construct — only the closure that builds it.
    pub fn new<F, S>(name: impl Into<String>, input_channel_count: u32, build_source: F) -> Self
    where
        F: FnOnce() -> S + Send + 'static,
        S: FrameSource + 'static,
    {
        Self {
            name: name.into(),
            shared: Arc::new(SharedState {
                frame: Mutex::new(None),
                video_mode: Mutex::new(None),
                has_new_frame: AtomicBool::new(false),
                signal_lost: AtomicBool::new(false),
                stop: AtomicBool::new(false),
                dropped_frames: AtomicU32::new(0),
            }),
            thread_handle: None,
            resolution_bounds: (Resolution::new(1, 1, 32), Resolution::new(7680, 4320, 32)),
            current_frame: None,
            input_channel: InputChannel(0),
            input_channel_count,
            source_factory: Some(Box::new(move || Box::new(build_source()))),
        }
    }
}

impl CaptureBackend for VirtualBackend {
    fn initialize(&mut self) -> VcsResult<()> {
        let factory = self
            .source_factory
            .take()
            .ok_or_else(|| CaptureError::InitializationFailed("backend already initialized".to_string()))?;

        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();

        let thread_handle = std::thread::spawn(move || {
            let mut source = factory();
            shared.video_mode.lock().unwrap().replace(VideoMode::new(
                source.resolution_bounds().1,
                60_000,
            ));

            loop {
                if shared.stop.load(Ordering::SeqCst) {
                    debug!(backend = %name, "virtual backend producer thread stopping");
                    break;
                }

                match source.next_frame() {
                    Some(frame) => {
                        shared.signal_lost.store(false, Ordering::SeqCst);
                        match shared.frame.try_lock() {
                            Ok(mut slot) => {
                                *slot = Some(frame);
                                shared.has_new_frame.store(true, Ordering::SeqCst);
                            }
                            Err(_) => {
                                shared.dropped_frames.fetch_add(1, Ordering::SeqCst);
                                warn!(backend = %name, "dropped frame: consumer still holds the buffer");
                            }
                        }
                    }
                    None => {
                        shared.signal_lost.store(true, Ordering::SeqCst);
                    }
                }
            }
        });

        self.thread_handle = Some(thread_handle);
        Ok(())
    }

    fn release(&mut self) -> VcsResult<()> {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn pop_event(&mut self) -> CaptureEvent {
        if self.shared.signal_lost.load(Ordering::SeqCst) {
            return CaptureEvent::SignalLost;
        }
        if self.shared.has_new_frame.swap(false, Ordering::SeqCst) {
            if let Ok(mut slot) = self.shared.frame.try_lock() {
                if let Some(frame) = slot.take() {
                    self.current_frame = Some(frame);
                    return CaptureEvent::NewFrame;
                }
            }
        }
        CaptureEvent::Sleep
    }

    fn peek_frame_buffer(&self) -> VcsResult<&CapturedFrame> {
        self.current_frame
            .as_ref()
            .ok_or_else(|| CaptureError::Unrecoverable("no frame buffer available".to_string()).into())
    }

    fn mark_frame_buffer_as_processed(&mut self) {
        self.current_frame = None;
    }

    fn current_video_mode(&self) -> Option<VideoMode> {
        *self.shared.video_mode.lock().unwrap()
    }

    fn resolution_bounds(&self) -> (Resolution, Resolution) {
        self.resolution_bounds
    }

    fn force_capture_resolution(&mut self, resolution: Resolution) -> VcsResult<()> {
        let (min, max) = self.resolution_bounds;
        if !resolution.within_bounds(min, max) {
            return Err(CaptureError::ResolutionOutOfRange {
                requested: (resolution.w, resolution.h),
                min: (min.w, min.h),
                max: (max.w, max.h),
            }
            .into());
        }
        let mut mode = self.shared.video_mode.lock().unwrap();
        *mode = mode.map(|m| VideoMode::new(resolution, m.refresh_rate_m_hz));
        Ok(())
    }

    fn input_channel_count(&self) -> u32 {
        self.input_channel_count
    }

    fn current_input_channel(&self) -> InputChannel {
        self.input_channel
    }

    fn set_input_channel(&mut self, channel: InputChannel) -> VcsResult<()> {
        if channel.0 >= self.input_channel_count {
            return Err(CaptureError::InvalidInputChannel(channel.0).into());
        }
        self.input_channel = channel;
        Ok(())
    }

    fn device_name(&self) -> &str {
        &self.name
    }

    fn missed_frames_count(&self) -> u32 {
        self.shared.dropped_frames.load(Ordering::SeqCst)
    }

    fn reset_missed_frames_count(&mut self) {
        self.shared.dropped_frames.store(0, Ordering::SeqCst);
    }

    fn has_valid_signal(&self) -> bool {
        !self.shared.signal_lost.load(Ordering::SeqCst)
    }

    fn is_receiving_signal(&self) -> bool {
        // This reference backend doesn't model a distinct "present but
        // unreadable" signal state, so the two queries coincide here.
        !self.shared.signal_lost.load(Ordering::SeqCst)
    }
}

impl Drop for VirtualBackend {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
