// SPDX-License-Identifier: GPL-3.0-only

//! One-tear-per-frame reconstruction strategy, grounded on
//! `anti_tear_one_per_frame_c::process` (`anti_tear_one_per_frame.cpp`).
//!
//! At most one tear is tracked per incoming frame. Once a tear row is
//! found, everything below it is copied into the back buffer and the rest
//! of the reconstruction — the rows above the tear — is deferred to the
//! following call, once they've actually arrived.

use crate::anti_tear::engine::{AntiTearer, BufferTarget, NextAction};
use crate::anti_tear::frame::AntiTearFrame;

pub(crate) fn process(engine: &mut AntiTearer, frame: &AntiTearFrame) {
    let mut non_torn_frame_already_copied = false;

    if engine.next_action == NextAction::CopyRestOfPixelData {
        let latest_tear_row = engine.latest_tear_row.unwrap_or(0);
        engine.copy_rows(BufferTarget::Back, frame, 0, latest_tear_row);
        engine.torn_row_indices.clear();
        engine.swap_buffers();

        engine.next_action = NextAction::ScanForTear;
        non_torn_frame_already_copied = true;
    }

    // Falls through to here unconditionally, matching the original's
    // switch-case fallthrough from copy_rest_of_pixel_data into
    // scan_for_tear.
    let start_row = engine.scan_start_row;
    let end_row = engine.scan_end_row;
    let found = engine.bisect_first_new_row(frame, start_row, end_row);
    engine.latest_tear_row = found;

    match found {
        Some(row) => {
            engine.copy_rows(BufferTarget::Back, frame, row, frame.resolution.h);
            engine.next_action = NextAction::CopyRestOfPixelData;
            engine.torn_row_indices.push(row);
        }
        None if !non_torn_frame_already_copied => {
            engine.copy_rows(BufferTarget::Front, frame, 0, frame.resolution.h);
            engine.torn_row_indices.clear();
        }
        None => {}
    }
}
