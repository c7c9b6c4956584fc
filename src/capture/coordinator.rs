// SPDX-License-Identifier: GPL-3.0-only

//! The capture coordinator: the main loop's single step of draining the
//! backend's event queue and fanning events out onto the app's event buses
//! (spec.md §4.3).

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use crate::capture::alias::AliasTable;
use crate::capture::backend::CaptureBackend;
use crate::capture::event_queue::CaptureEvent;
use crate::capture::types::{CapturedFrame, VideoMode};
use crate::errors::VcsResult;
use crate::events::Bus;

/// The fixed sleep the coordinator applies on a `Sleep` event, per
/// spec.md §4.3 ("≈4 ms").
pub const SLEEP_EVENT_INTERVAL: Duration = crate::constants::timing::SLEEP_EVENT_INTERVAL;

/// The event buses a [`CaptureCoordinator`] fires into, plus the two
/// non-capture bus events spec.md §4.1 defines (`eco_mode_enabled`/
/// `eco_mode_disabled`, fired by [`crate::app::App`] directly). Grouped
/// here rather than scattered across `App` fields so the coordinator can
/// be driven and tested in isolation from the rest of the application,
/// and so the app has a single bus hub instead of two.
#[derive(Default)]
pub struct CaptureBuses {
    pub new_proposed_video_mode: Bus<VideoMode>,
    pub new_video_mode: Bus<VideoMode>,
    pub new_captured_frame: Bus<CapturedFrame>,
    pub signal_lost: Bus<()>,
    pub signal_gained: Bus<()>,
    pub invalid_signal: Bus<()>,
    pub invalid_device: Bus<()>,
    pub unrecoverable_error: Bus<()>,
    /// Fired by [`crate::app::App::set_eco_mode_enabled`] on a `false -> true`
    /// transition (spec.md §4.1's `eco_mode_enabled()` event). Lives here
    /// rather than on a separate bus group since this is already the app's
    /// one shared event-bus hub.
    pub eco_mode_enabled: Bus<()>,
    /// Fired on a `true -> false` eco-mode transition (spec.md §4.1's
    /// `eco_mode_disabled()` event).
    pub eco_mode_disabled: Bus<()>,
}

/// Drains one event from a capture backend per call and fires it onto the
/// relevant [`CaptureBuses`] entry, mirroring `process_next_capture_event()`
/// (spec.md §4.3). Also applies resolution aliasing to proposed video modes
/// (spec.md §4.4) and tracks the exit-requested flag for unrecoverable
/// errors.
pub struct CaptureCoordinator {
    backend: Mutex<Box<dyn CaptureBackend>>,
    aliases: AliasTable,
    exit_requested: std::sync::atomic::AtomicBool,
}

impl CaptureCoordinator {
    pub fn new(backend: Box<dyn CaptureBackend>, aliases: AliasTable) -> Self {
        Self {
            backend: Mutex::new(backend),
            aliases,
            exit_requested: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Drains and dispatches one capture event, returning the tag that was
    /// processed along with the frame it carried, if any. Called in a loop
    /// by the main loop / eco scheduler.
    ///
    /// The frame is cloned out from under the backend's mutex while it is
    /// still held, rather than left for a bus listener to fetch: a listener
    /// that tried to re-enter the coordinator (e.g. via
    /// [`CaptureCoordinator::with_current_frame`]) while this call still
    /// held the lock would deadlock, since [`Mutex`] isn't reentrant. `App`
    /// consumes the returned frame directly for its own internal pipeline;
    /// [`CaptureBuses::new_captured_frame`] exists for external listeners
    /// (a GUI, a recorder) that only need to observe it.
    pub fn process_next_capture_event(&self, buses: &CaptureBuses) -> VcsResult<(CaptureEvent, Option<CapturedFrame>)> {
        let mut backend = self.backend.lock().unwrap();
        let event = backend.pop_event();
        let mut delivered_frame = None;

        match event {
            CaptureEvent::NewFrame => {
                if backend.has_valid_signal() {
                    if let Ok(frame) = backend.peek_frame_buffer() {
                        let frame = frame.clone();
                        buses.new_captured_frame.fire(&frame);
                        delivered_frame = Some(frame);
                    }
                }
                backend.mark_frame_buffer_as_processed();
            }
            CaptureEvent::NewVideoMode => {
                if backend.has_valid_signal() {
                    if let Some(mode) = backend.current_video_mode() {
                        self.dispatch_proposed_mode(&mut backend, buses, mode);
                    }
                }
            }
            CaptureEvent::SignalLost => buses.signal_lost.fire(&()),
            CaptureEvent::SignalGained => buses.signal_gained.fire(&()),
            CaptureEvent::InvalidSignal => buses.invalid_signal.fire(&()),
            CaptureEvent::InvalidDevice => buses.invalid_device.fire(&()),
            CaptureEvent::UnrecoverableError => {
                self.exit_requested.store(true, std::sync::atomic::Ordering::SeqCst);
                buses.unrecoverable_error.fire(&());
            }
            CaptureEvent::Sleep => {
                drop(backend);
                std::thread::sleep(SLEEP_EVENT_INTERVAL);
            }
            CaptureEvent::None => {}
        }

        Ok((event, delivered_frame))
    }

    /// Applies alias resolution to a proposed video mode, per spec.md §4.4.
    fn dispatch_proposed_mode(
        &self,
        backend: &mut Box<dyn CaptureBackend>,
        buses: &CaptureBuses,
        mode: VideoMode,
    ) {
        buses.new_proposed_video_mode.fire(&mode);

        match self.aliases.lookup(mode.resolution) {
            Some(target) => match backend.force_capture_resolution(target) {
                Ok(()) => debug!(from = ?mode.resolution, to = ?target, "applied resolution alias"),
                Err(err) => warn!(%err, "alias-driven force_capture_resolution rejected"),
            },
            None => buses.new_video_mode.fire(&mode),
        }
    }

    /// Copies the current frame buffer out under the capture mutex. Returns
    /// an error if called outside the `NewFrame` processing window.
    pub fn with_current_frame<R>(&self, f: impl FnOnce(&CapturedFrame) -> R) -> VcsResult<R> {
        let backend = self.backend.lock().unwrap();
        backend.peek_frame_buffer().map(f)
    }

    /// Forwards a forced resolution request directly to the backend,
    /// rejecting it per the same rules `force_capture_resolution` enforces
    /// (no signal, out of device bounds).
    pub fn force_capture_resolution(&self, resolution: crate::capture::types::Resolution) -> VcsResult<()> {
        let mut backend = self.backend.lock().unwrap();
        backend.force_capture_resolution(resolution)
    }

    /// Whether the backend currently reports a stable, decodable signal.
    /// Used by the eco scheduler (spec.md §4.7: "if not receiving a
    /// signal, sleep a fixed 10 ms").
    pub fn has_valid_signal(&self) -> bool {
        self.backend.lock().unwrap().has_valid_signal()
    }

    /// The number of frames the backend has dropped since the last reset
    /// (spec.md §5: "the number of drops is exposed via
    /// `missed_frames_count()` and feeds the eco scheduler").
    pub fn missed_frames_count(&self) -> u32 {
        self.backend.lock().unwrap().missed_frames_count()
    }

    /// Zeroes the backend's dropped-frame counter.
    pub fn reset_missed_frames_count(&self) {
        self.backend.lock().unwrap().reset_missed_frames_count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::alias::ResolutionAlias;
    use crate::capture::types::{PixelFormat, Resolution};
    use crate::capture::virtual_backend::{FrameSource, VirtualBackend};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct OneShotSource {
        resolution: Resolution,
        emitted: bool,
    }

    impl FrameSource for OneShotSource {
        fn next_frame(&mut self) -> Option<CapturedFrame> {
            if self.emitted {
                std::thread::sleep(Duration::from_millis(1));
                return None;
            }
            self.emitted = true;
            Some(CapturedFrame::blank(self.resolution, PixelFormat::Bgra32))
        }

        fn resolution_bounds(&self) -> (Resolution, Resolution) {
            (self.resolution, self.resolution)
        }
    }

    #[test]
    fn fires_new_captured_frame_on_new_frame_event() {
        let resolution = Resolution::new(64, 64, 32);
        let backend = VirtualBackend::new("test", 1, move || OneShotSource { resolution, emitted: false });
        let mut backend: Box<dyn CaptureBackend> = Box::new(backend);
        backend.initialize().unwrap();

        let coordinator = CaptureCoordinator::new(backend, AliasTable::default());
        let mut buses = CaptureBuses::default();
        let frame_count = Arc::new(AtomicU32::new(0));
        let frame_count_clone = Arc::clone(&frame_count);
        buses.new_captured_frame.listen(move |_| {
            frame_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let mut returned_frame_count = 0;
        for _ in 0..5_000 {
            if let Ok((_, Some(_))) = coordinator.process_next_capture_event(&buses) {
                returned_frame_count += 1;
            }
            if frame_count.load(Ordering::SeqCst) > 0 {
                break;
            }
        }

        assert_eq!(frame_count.load(Ordering::SeqCst), 1);
        assert_eq!(returned_frame_count, 1);
    }

    #[test]
    fn alias_resolution_forwards_forced_resolution_and_suppresses_direct_fire() {
        struct StaticSource {
            resolution: Resolution,
        }
        impl FrameSource for StaticSource {
            fn next_frame(&mut self) -> Option<CapturedFrame> {
                std::thread::sleep(Duration::from_millis(1));
                None
            }
            fn resolution_bounds(&self) -> (Resolution, Resolution) {
                (Resolution::new(1, 1, 32), Resolution::new(1920, 1080, 32))
            }
        }

        let proposed = Resolution::new(720, 400, 32);
        let target = Resolution::new(640, 400, 32);

        let backend = VirtualBackend::new("test", 1, move || StaticSource { resolution: proposed });
        let mut backend: Box<dyn CaptureBackend> = Box::new(backend);
        backend.initialize().unwrap();

        let aliases = AliasTable::new(vec![ResolutionAlias { from: proposed, to: target }]);
        let coordinator = CaptureCoordinator::new(backend, aliases);
        let mut buses = CaptureBuses::default();

        let direct_fires = Arc::new(AtomicU32::new(0));
        let direct_fires_clone = Arc::clone(&direct_fires);
        buses.new_video_mode.listen(move |_| {
            direct_fires_clone.fetch_add(1, Ordering::SeqCst);
        });

        let proposed_fires = Arc::new(AtomicU32::new(0));
        let proposed_fires_clone = Arc::clone(&proposed_fires);
        buses.new_proposed_video_mode.listen(move |_| {
            proposed_fires_clone.fetch_add(1, Ordering::SeqCst);
        });

        coordinator.dispatch_proposed_mode_for_test(&buses, VideoMode::new(proposed, 70_086));

        assert_eq!(proposed_fires.load(Ordering::SeqCst), 1);
        assert_eq!(direct_fires.load(Ordering::SeqCst), 0);
    }

    impl CaptureCoordinator {
        fn dispatch_proposed_mode_for_test(&self, buses: &CaptureBuses, mode: VideoMode) {
            let mut backend = self.backend.lock().unwrap();
            self.dispatch_proposed_mode(&mut backend, buses, mode);
        }
    }
}
