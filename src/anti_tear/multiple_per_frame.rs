// SPDX-License-Identifier: GPL-3.0-only

//! Multiple-tears-per-frame reconstruction strategy, grounded on
//! `anti_tear_multiple_per_frame_c::process`
//! (`anti_tear_multiple_per_frame.cpp`).
//!
//! Scans down from the previous tear boundary for the next row that still
//! differs from the front buffer, reconstructing tears one boundary at a
//! time. Once a scan reaches row 0 the frame is complete; the bottom of
//! the frame may have picked up new data in the meantime, so the original
//! re-scans once more from the top, which is why this recurses — capped
//! at one extra pass.

use crate::anti_tear::engine::{AntiTearer, BufferTarget};
use crate::anti_tear::frame::AntiTearFrame;

pub(crate) fn process(engine: &mut AntiTearer, frame: &AntiTearFrame, untorn_frame_already_copied: bool, recursive_count: u32) {
    // `scan_end_row` is the last valid row *index* within the scan range
    // (inclusive, matching how `bisect_first_new_row` treats it); the
    // exclusive bound this strategy's row-range scans and copies against is
    // one past it.
    engine.prev_tear_row = engine.prev_tear_row.min(engine.scan_end_row + 1);

    let start_row = engine.scan_start_row;
    let prev_tear_row = engine.prev_tear_row;
    let first_new_row = engine.find_first_new_row_idx(frame, start_row, prev_tear_row);

    match first_new_row {
        Some(row) => {
            engine.torn_row_indices.push(row);
            engine.copy_rows(BufferTarget::Back, frame, row, prev_tear_row);

            if row == 0 {
                engine.swap_buffers();
                engine.torn_row_indices.clear();
                engine.prev_tear_row = frame.resolution.h;

                if recursive_count < 1 {
                    process(engine, frame, true, recursive_count + 1);
                }
            } else {
                engine.prev_tear_row = row;
            }
        }
        None if !untorn_frame_already_copied => {
            engine.copy_rows(BufferTarget::Front, frame, 0, frame.resolution.h);
            engine.torn_row_indices.clear();
            engine.prev_tear_row = frame.resolution.h;
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anti_tear::engine::{AntiTearConfig, ScanHint};
    use crate::capture::types::Resolution;

    #[test]
    fn reconstructs_two_tears_across_successive_calls() {
        let resolution = Resolution::new(32, 24, 32);
        let config = AntiTearConfig { scan_hint: ScanHint::MultipleTears, ..AntiTearConfig::default() };
        let mut engine = AntiTearer::new(resolution, config);
        engine.front_buffer.fill(1);
        engine.scan_start_row = 0;
        engine.scan_end_row = resolution.h;
        engine.prev_tear_row = resolution.h;

        let row_bytes = resolution.row_bytes();

        // First capture: bottom third arrived (rows 16..24), rest unchanged.
        let mut frame1 = vec![1u8; resolution.byte_size()];
        frame1[16 * row_bytes..].fill(80);
        let frame1 = AntiTearFrame::new(resolution, frame1);
        process(&mut engine, &frame1, false, 0);
        assert_eq!(engine.torn_row_indices, vec![16]);
        assert_eq!(engine.prev_tear_row, 16);

        // Second capture: everything above row 16 also arrived, completing
        // the frame in one pass (no further tear below 16 to rediscover).
        let mut frame2 = vec![200u8; resolution.byte_size()];
        frame2[16 * row_bytes..].fill(80);
        let frame2 = AntiTearFrame::new(resolution, frame2);
        process(&mut engine, &frame2, false, 0);

        assert!(engine.torn_row_indices.is_empty());
        assert_eq!(engine.prev_tear_row, resolution.h);
        assert_eq!(&engine.front_buffer[..16 * row_bytes], &vec![200u8; 16 * row_bytes][..]);
        assert_eq!(&engine.front_buffer[16 * row_bytes..], &vec![80u8; 8 * row_bytes][..]);
    }
}
