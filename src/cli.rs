// SPDX-License-Identifier: GPL-3.0-only

//! Command implementations for the demonstration binary (spec.md §6's CLI
//! surface), grounded on the teacher's `cli.rs` (plain functions returning
//! `Result<(), Box<dyn std::error::Error>>`, invoked from `main.rs`'s
//! subcommand match).
//!
//! There is no real capture hardware to drive here — the vendor-specific
//! SDK wrappers are a spec.md §1 Non-goal — so `run` wires a
//! [`vcs_core::capture::VirtualBackend`] emitting a synthetic test pattern
//! in place of a capture card, which is enough to exercise the full
//! filter/anti-tear/scaler pipeline end to end.

use std::path::PathBuf;

use tracing::{info, warn};

use vcs_core::anti_tear::{AntiTearConfig, AntiTearer};
use vcs_core::app::App;
use vcs_core::capture::{AliasTable, CaptureBackend, CapturedFrame, FrameSource, PixelFormat, Resolution, VirtualBackend};
use vcs_core::scaler::PassthroughScaler;

/// A synthetic test-pattern source: each frame is solid gray, with a
/// sequence number painted into the top-left corner's brightness so
/// successive frames are distinguishable without a real capture device.
struct TestPatternSource {
    resolution: Resolution,
    frame_index: u32,
}

impl FrameSource for TestPatternSource {
    fn next_frame(&mut self) -> Option<CapturedFrame> {
        let mut frame = CapturedFrame::blank(self.resolution, PixelFormat::Bgra32);
        let shade = (self.frame_index % 256) as u8;
        for pixel in frame.pixels.chunks_mut(4) {
            pixel[0] = shade;
            pixel[1] = shade;
            pixel[2] = shade;
            pixel[3] = 255;
        }
        self.frame_index += 1;
        std::thread::sleep(std::time::Duration::from_millis(16));
        Some(frame)
    }

    fn resolution_bounds(&self) -> (Resolution, Resolution) {
        (Resolution::new(1, 1, 32), Resolution::new(7680, 4320, 32))
    }
}

/// Runs the capture → filter → anti-tear → scaler pipeline against the
/// synthetic test source for `frame_count` frames, then exits cleanly.
pub fn run(
    width: u32,
    height: u32,
    anti_tear_enabled: bool,
    eco_mode_enabled: bool,
    frame_count: u32,
    filter_graph_path: Option<PathBuf>,
    aliases_path: Option<PathBuf>,
    video_presets_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    for (flag, path) in [("filter graph", &filter_graph_path), ("aliases", &aliases_path), ("video presets", &video_presets_path)] {
        if let Some(path) = path {
            warn!(?path, "{flag} file loading is outside this crate's scope; ignoring");
        }
    }

    let resolution = Resolution::new(width, height, 32);
    if !resolution.is_valid() {
        return Err(format!("invalid resolution {width}x{height}").into());
    }

    let mut backend: Box<dyn CaptureBackend> =
        Box::new(VirtualBackend::new("test-pattern", 1, move || TestPatternSource { resolution, frame_index: 0 }));
    backend.initialize()?;

    let anti_tear = AntiTearer::new(resolution, AntiTearConfig::default());
    let scaler = Box::new(PassthroughScaler::new(Some(resolution)));
    let mut app = App::new(backend, AliasTable::default(), anti_tear, scaler);
    app.set_anti_tear_enabled(anti_tear_enabled);
    app.set_eco_mode_enabled(eco_mode_enabled);

    let mut frames_presented = 0u32;
    loop {
        if app.exit_requested() {
            return Err("capture backend reported an unrecoverable error".into());
        }

        app.run_one_iteration()?;

        if app.last_presented_frame().is_some() {
            frames_presented += 1;
        }

        if frames_presented >= frame_count {
            break;
        }
    }

    info!(frames_presented, "demonstration run complete");
    Ok(())
}
