// SPDX-License-Identifier: GPL-3.0-only

//! Drives the full capture → filter graph → anti-tear → scaler pipeline
//! through `App`'s public surface, the way `main.rs`/`cli.rs` would.

use vcs_core::anti_tear::{AntiTearConfig, AntiTearer};
use vcs_core::capture::{CaptureBackend, CapturedFrame, FrameSource, PixelFormat, Resolution, VirtualBackend};
use vcs_core::filter::{FilterChain, FilterKind};
use vcs_core::scaler::PassthroughScaler;
use vcs_core::{App, Config};

struct FixedColorSource {
    resolution: Resolution,
    shade: u8,
    emitted: bool,
}

impl FrameSource for FixedColorSource {
    fn next_frame(&mut self) -> Option<CapturedFrame> {
        if self.emitted {
            std::thread::sleep(std::time::Duration::from_millis(1));
            return None;
        }
        self.emitted = true;
        let mut frame = CapturedFrame::blank(self.resolution, PixelFormat::Bgra32);
        for px in frame.pixels.chunks_mut(4) {
            px[0] = self.shade;
            px[1] = self.shade;
            px[2] = self.shade;
            px[3] = 255;
        }
        Some(frame)
    }

    fn resolution_bounds(&self) -> (Resolution, Resolution) {
        (self.resolution, self.resolution)
    }
}

fn run_until_presented(app: &mut App) {
    for _ in 0..10_000 {
        app.run_one_iteration().unwrap();
        if app.last_presented_frame().is_some() {
            return;
        }
    }
    panic!("no frame reached the presented slot within the iteration budget");
}

#[test]
fn a_frame_passes_through_an_enabled_filter_chain_without_changing_size() {
    let resolution = Resolution::new(16, 16, 32);
    let mut backend: Box<dyn CaptureBackend> =
        Box::new(VirtualBackend::new("test", 1, move || FixedColorSource { resolution, shade: 128, emitted: false }));
    backend.initialize().unwrap();

    let anti_tear = AntiTearer::new(resolution, AntiTearConfig::default());
    let scaler = Box::new(PassthroughScaler::new(Some(resolution)));
    let mut app = App::new(backend, Default::default(), anti_tear, scaler);

    let node_index = app.filter_graph_mut().add_default_node(FilterKind::Sharpen);
    app.filter_graph_mut().add_chain(FilterChain::new(resolution, resolution, vec![node_index]));
    app.filter_graph_mut().set_enabled(true);

    run_until_presented(&mut app);

    let (presented_resolution, pixels) = app.last_presented_frame().unwrap();
    assert_eq!(presented_resolution, resolution);
    assert_eq!(pixels.len(), resolution.byte_size());
}

#[test]
fn anti_tear_enabled_end_to_end_reconstructs_a_torn_pair() {
    // Wide enough that the default row-change predicate (window_length=8,
    // matches_required=11) can actually accumulate 11 disagreeing sampling
    // windows across a row; anything narrower would never classify a row as
    // changed at all, silently degenerating this into a no-op passthrough.
    let resolution = Resolution::new(32, 32, 32);

    struct TwoFrameSource {
        resolution: Resolution,
        step: u8,
    }
    impl FrameSource for TwoFrameSource {
        fn next_frame(&mut self) -> Option<CapturedFrame> {
            if self.step >= 2 {
                std::thread::sleep(std::time::Duration::from_millis(1));
                return None;
            }
            let row_bytes = self.resolution.row_bytes();
            let mut frame = CapturedFrame::blank(self.resolution, PixelFormat::Bgra32);
            if self.step == 0 {
                frame.pixels[16 * row_bytes..].fill(200);
            } else {
                frame.pixels.fill(100);
                frame.pixels[16 * row_bytes..].fill(200);
            }
            self.step += 1;
            Some(frame)
        }

        fn resolution_bounds(&self) -> (Resolution, Resolution) {
            (self.resolution, self.resolution)
        }
    }

    let mut backend: Box<dyn CaptureBackend> =
        Box::new(VirtualBackend::new("test", 1, move || TwoFrameSource { resolution, step: 0 }));
    backend.initialize().unwrap();

    let anti_tear = AntiTearer::new(resolution, AntiTearConfig::default());
    let scaler = Box::new(PassthroughScaler::new(Some(resolution)));
    let mut app = App::new(backend, Default::default(), anti_tear, scaler);
    app.set_anti_tear_enabled(true);

    let mut presented_count = 0;
    for _ in 0..20_000 {
        app.run_one_iteration().unwrap();
        if app.last_presented_frame().is_some() {
            presented_count += 1;
            if presented_count >= 2 {
                break;
            }
        }
    }

    let (_, pixels) = app.last_presented_frame().unwrap();
    let row_bytes = resolution.row_bytes();
    assert_eq!(&pixels[..16 * row_bytes], &vec![100u8; 16 * row_bytes][..]);
    assert_eq!(&pixels[16 * row_bytes..], &vec![200u8; 16 * row_bytes][..]);
}

#[test]
fn default_config_round_trips_and_matches_a_fresh_app_state() {
    // Mirrors the disabled-by-default invariants `App::new` and
    // `Config::default` both carry, so wiring a loaded config into a fresh
    // `App` is a no-op for either's defaults.
    let config = Config::default();
    assert!(!config.anti_tear_enabled);
    assert!(!config.eco_mode_enabled);

    let resolution = Resolution::new(4, 4, 32);
    let mut backend: Box<dyn CaptureBackend> =
        Box::new(VirtualBackend::new("test", 1, move || FixedColorSource { resolution, shade: 1, emitted: false }));
    backend.initialize().unwrap();
    let anti_tear = AntiTearer::new(resolution, config.anti_tear);
    let scaler = Box::new(PassthroughScaler::new(Some(resolution)));
    let app = App::new(backend, Default::default(), anti_tear, scaler);

    assert_eq!(app.anti_tear_enabled(), config.anti_tear_enabled);
    assert_eq!(app.eco_mode_enabled(), config.eco_mode_enabled);
}
