// SPDX-License-Identifier: GPL-3.0-only

//! Reconstruction of temporally torn frames (spec.md §4.5), grounded on
//! `anti_tearer_c` and its two strategy collaborators.

mod engine;
mod frame;
mod multiple_per_frame;
mod one_per_frame;

pub use engine::{AntiTearConfig, AntiTearer, ScanDirection, ScanHint};
pub use frame::AntiTearFrame;
