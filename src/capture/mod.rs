// SPDX-License-Identifier: GPL-3.0-only

//! The capture pipeline: backend trait, event queue, coordinator, aliasing,
//! and a software reference backend (spec.md §2, "Capture pipeline").

pub mod alias;
pub mod backend;
pub mod coordinator;
pub mod event_queue;
pub mod types;
pub mod virtual_backend;

pub use alias::{AliasTable, ResolutionAlias};
pub use backend::{CaptureBackend, InputChannel};
pub use coordinator::{CaptureBuses, CaptureCoordinator};
pub use event_queue::{CaptureEvent, EventQueue};
pub use types::{CapturedFrame, PixelFormat, Resolution, VideoMode};
pub use virtual_backend::{FrameSource, VirtualBackend};
