// SPDX-License-Identifier: GPL-3.0-only

//! The top-level application struct (spec.md §9's redesign note: "a single
//! top-level struct constructed in `main`, passed by reference, replacing
//! the globals"). `App` owns the event buses, the filter graph, the
//! anti-tear engine, and the eco scheduler, and is driven one capture event
//! at a time by [`App::run_one_iteration`] — the body of spec.md §4.7's
//! main loop.

use tracing::warn;

use crate::anti_tear::AntiTearer;
use crate::capture::backend::CaptureBackend;
use crate::capture::coordinator::{CaptureBuses, CaptureCoordinator};
use crate::capture::event_queue::CaptureEvent;
use crate::capture::types::{CapturedFrame, Resolution};
use crate::capture::alias::AliasTable;
use crate::errors::VcsResult;
use crate::filter::FilterGraph;
use crate::scaler::Scaler;
use crate::scheduler::EcoScheduler;

/// Process-wide application state (spec.md §3, "AppState"): the pieces that
/// aren't better owned by a subsystem struct in their own right. The
/// resolution alias set and the exit-requested flag live on
/// [`CaptureCoordinator`]; the filter chain list and its enabled flag live
/// on [`FilterGraph`]; this struct is the remainder.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppState {
    pub anti_tear_enabled: bool,
}

/// The application: wires a capture backend, the filter graph, the
/// anti-tear engine, and an external [`Scaler`] into one driveable pipeline.
pub struct App {
    coordinator: CaptureCoordinator,
    buses: CaptureBuses,
    filter_graph: FilterGraph,
    anti_tear: AntiTearer,
    scaler: Box<dyn Scaler>,
    eco: EcoScheduler,
    state: AppState,
    last_presented_frame: Option<(Resolution, Vec<u8>)>,
}

impl App {
    pub fn new(backend: Box<dyn CaptureBackend>, aliases: AliasTable, anti_tear: AntiTearer, scaler: Box<dyn Scaler>) -> Self {
        Self {
            coordinator: CaptureCoordinator::new(backend, aliases),
            buses: CaptureBuses::default(),
            filter_graph: FilterGraph::new(),
            anti_tear,
            scaler,
            eco: EcoScheduler::new(),
            state: AppState::default(),
            last_presented_frame: None,
        }
    }

    pub fn buses(&self) -> &CaptureBuses {
        &self.buses
    }

    pub fn buses_mut(&mut self) -> &mut CaptureBuses {
        &mut self.buses
    }

    pub fn filter_graph(&self) -> &FilterGraph {
        &self.filter_graph
    }

    pub fn filter_graph_mut(&mut self) -> &mut FilterGraph {
        &mut self.filter_graph
    }

    pub fn set_anti_tear_enabled(&mut self, enabled: bool) {
        self.state.anti_tear_enabled = enabled;
    }

    pub fn anti_tear_enabled(&self) -> bool {
        self.state.anti_tear_enabled
    }

    /// Enables or disables eco mode, firing `eco_mode_enabled`/
    /// `eco_mode_disabled` (spec.md §4.1) on an actual state change. A
    /// call that doesn't change the flag fires nothing, since these are
    /// edge-triggered transition events, not level state broadcasts.
    pub fn set_eco_mode_enabled(&mut self, enabled: bool) {
        let was_enabled = self.eco.enabled();
        self.eco.set_enabled(enabled);

        if enabled && !was_enabled {
            self.buses.eco_mode_enabled.fire(&());
        } else if !enabled && was_enabled {
            self.buses.eco_mode_disabled.fire(&());
        }
    }

    pub fn eco_mode_enabled(&self) -> bool {
        self.eco.enabled()
    }

    pub fn exit_requested(&self) -> bool {
        self.coordinator.exit_requested()
    }

    pub fn force_capture_resolution(&self, resolution: Resolution) -> VcsResult<()> {
        self.coordinator.force_capture_resolution(resolution)
    }

    /// The most recently scaled/presented frame, if any has been produced
    /// yet. Stands in for the OpenGL presentation widget and the recorder,
    /// both out of scope for this crate (spec.md §1 Non-goals).
    pub fn last_presented_frame(&self) -> Option<(Resolution, &[u8])> {
        self.last_presented_frame.as_ref().map(|(resolution, pixels)| (*resolution, pixels.as_slice()))
    }

    /// Runs one iteration of spec.md §4.7's main loop body: drains and
    /// dispatches one capture event, runs the filter/anti-tear/scaler
    /// pipeline if a frame came with it, and sleeps adaptively if eco mode
    /// is enabled.
    pub fn run_one_iteration(&mut self) -> VcsResult<CaptureEvent> {
        let (event, frame) = self.coordinator.process_next_capture_event(&self.buses)?;

        if let Some(frame) = frame {
            self.process_captured_frame(frame);
        }

        let missed = self.coordinator.missed_frames_count();
        let frames_dropped = missed > 0;
        if frames_dropped {
            self.coordinator.reset_missed_frames_count();
        }

        self.eco.record_event(event, frames_dropped);
        self.eco.maybe_sleep(self.coordinator.has_valid_signal());

        Ok(event)
    }

    /// Runs the filter graph, anti-tear engine, and scaler over one
    /// captured frame's pixels, in the order spec.md §2 names ("filter
    /// graph (if a chain matches) → anti-tear (if enabled) → scaler").
    fn process_captured_frame(&mut self, frame: CapturedFrame) {
        let input_resolution = frame.resolution;
        let output_resolution = self.scaler.target_resolution().unwrap_or(input_resolution);
        let mut pixels = frame.pixels;

        self.filter_graph.apply(&mut pixels, input_resolution, output_resolution);

        let (presented_resolution, presented_pixels) = if self.state.anti_tear_enabled {
            match self.anti_tear.process(&pixels, input_resolution) {
                Ok(presented) => (self.anti_tear.present_resolution(), presented.to_vec()),
                Err(err) => {
                    warn!(%err, "anti-tear rejected this frame, skipping it");
                    return;
                }
            }
        } else {
            (input_resolution, pixels)
        };

        let scaled = self.scaler.scale(&presented_pixels, presented_resolution, output_resolution);
        self.last_presented_frame = Some((output_resolution, scaled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anti_tear::AntiTearConfig;
    use crate::capture::types::PixelFormat;
    use crate::capture::virtual_backend::{FrameSource, VirtualBackend};
    use crate::scaler::PassthroughScaler;
    use std::time::Duration;

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

    fn test_app(resolution: Resolution) -> App {
        let mut backend: Box<dyn CaptureBackend> =
            Box::new(VirtualBackend::new("test", 1, move || OneShotSource { resolution, emitted: false }));
        backend.initialize().unwrap();
        let anti_tear = AntiTearer::new(resolution, AntiTearConfig::default());
        let scaler = Box::new(PassthroughScaler::new(Some(resolution)));
        App::new(backend, AliasTable::default(), anti_tear, scaler)
    }

    #[test]
    fn a_captured_frame_eventually_reaches_the_presented_slot() {
        let resolution = Resolution::new(32, 32, 32);
        let mut app = test_app(resolution);

        for _ in 0..5_000 {
            app.run_one_iteration().unwrap();
            if app.last_presented_frame().is_some() {
                break;
            }
        }

        let (presented_resolution, pixels) = app.last_presented_frame().expect("a frame should have been presented");
        assert_eq!(presented_resolution, resolution);
        assert_eq!(pixels.len(), resolution.byte_size());
    }

    #[test]
    fn anti_tear_disabled_by_default() {
        let app = test_app(Resolution::new(8, 8, 32));
        assert!(!app.anti_tear_enabled());
    }

    #[test]
    fn eco_mode_disabled_by_default() {
        let app = test_app(Resolution::new(8, 8, 32));
        assert!(!app.eco_mode_enabled());
    }

    #[test]
    fn toggling_eco_mode_fires_the_matching_bus_event_once_per_transition() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mut app = test_app(Resolution::new(8, 8, 32));
        let enabled_count = Arc::new(AtomicUsize::new(0));
        let disabled_count = Arc::new(AtomicUsize::new(0));

        let enabled_count_handler = Arc::clone(&enabled_count);
        app.buses_mut().eco_mode_enabled.listen(move |_| {
            enabled_count_handler.fetch_add(1, Ordering::SeqCst);
        });
        let disabled_count_handler = Arc::clone(&disabled_count);
        app.buses_mut().eco_mode_disabled.listen(move |_| {
            disabled_count_handler.fetch_add(1, Ordering::SeqCst);
        });

        app.set_eco_mode_enabled(true);
        app.set_eco_mode_enabled(true); // redundant call: should not re-fire
        app.set_eco_mode_enabled(false);

        assert_eq!(enabled_count.load(Ordering::SeqCst), 1);
        assert_eq!(disabled_count.load(Ordering::SeqCst), 1);
    }
}
