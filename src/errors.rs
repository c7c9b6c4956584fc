// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the capture/anti-tear/filter core.

use std::fmt;

/// Result type alias using [`VcsError`].
pub type VcsResult<T> = Result<T, VcsError>;

/// Top-level error type for the core.
#[derive(Debug, Clone)]
pub enum VcsError {
    /// Capture backend errors.
    Capture(CaptureError),
    /// Anti-tear engine errors.
    AntiTear(AntiTearError),
    /// Filter graph/node errors.
    Filter(FilterError),
    /// Configuration errors.
    Config(ConfigError),
    /// Generic error with message.
    Other(String),
}

/// Capture-backend-facing errors (spec.md §7, "backend transient"/"backend
/// unrecoverable" categories).
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// The backend could not be initialized.
    InitializationFailed(String),
    /// The backend reported a device-level failure it cannot recover from.
    Unrecoverable(String),
    /// A requested resolution falls outside the device's supported range.
    ResolutionOutOfRange { requested: (u32, u32), min: (u32, u32), max: (u32, u32) },
    /// `force_capture_resolution` was rejected because no signal is present.
    NoSignal,
    /// The requested input channel index is invalid for this device.
    InvalidInputChannel(u32),
}

/// Anti-tear engine errors. Most invalid states in the anti-tear engine are
/// precondition violations (handled via `assert!`, per spec.md §7) rather
/// than recoverable errors; this enum covers the few that aren't.
#[derive(Debug, Clone)]
pub enum AntiTearError {
    /// The frame handed to `process()` exceeds the engine's configured
    /// maximum resolution.
    FrameTooLarge { width: u32, height: u32 },
}

/// Filter configuration errors (spec.md §7: "no-op on pixels; log at debug
/// level", recovered locally and never propagated past filter application).
#[derive(Debug, Clone)]
pub enum FilterError {
    /// A crop rectangle falls outside the frame bounds.
    CropOutOfBounds { x: u32, y: u32, w: u32, h: u32, frame_w: u32, frame_h: u32 },
    /// A parameter id is not part of the filter type's schema.
    UnknownParameter { filter_uuid: &'static str, parameter_id: u32 },
    /// A parameter value falls outside its declared [min, max] range.
    ParameterOutOfRange { filter_uuid: &'static str, parameter_id: u32, value: f64, min: f64, max: f64 },
}

/// Configuration/persistence-adjacent errors.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// The on-disk config file could not be read or parsed.
    Load(String),
    /// The config could not be serialized or written to disk.
    Save(String),
}

impl fmt::Display for VcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsError::Capture(e) => write!(f, "capture error: {}", e),
            VcsError::AntiTear(e) => write!(f, "anti-tear error: {}", e),
            VcsError::Filter(e) => write!(f, "filter error: {}", e),
            VcsError::Config(e) => write!(f, "configuration error: {}", e),
            VcsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::InitializationFailed(msg) => write!(f, "initialization failed: {}", msg),
            CaptureError::Unrecoverable(msg) => write!(f, "unrecoverable device error: {}", msg),
            CaptureError::ResolutionOutOfRange { requested, min, max } => write!(
                f,
                "requested resolution {}x{} is outside device range {}x{}..={}x{}",
                requested.0, requested.1, min.0, min.1, max.0, max.1
            ),
            CaptureError::NoSignal => write!(f, "cannot force a resolution while no signal is present"),
            CaptureError::InvalidInputChannel(idx) => write!(f, "invalid input channel index: {}", idx),
        }
    }
}

impl fmt::Display for AntiTearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AntiTearError::FrameTooLarge { width, height } => {
                write!(f, "frame {}x{} exceeds the anti-tear engine's maximum resolution", width, height)
            }
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::CropOutOfBounds { x, y, w, h, frame_w, frame_h } => write!(
                f,
                "crop rectangle ({},{} {}x{}) is out of bounds for a {}x{} frame",
                x, y, w, h, frame_w, frame_h
            ),
            FilterError::UnknownParameter { filter_uuid, parameter_id } => {
                write!(f, "filter '{}' has no parameter {}", filter_uuid, parameter_id)
            }
            FilterError::ParameterOutOfRange { filter_uuid, parameter_id, value, min, max } => write!(
                f,
                "filter '{}' parameter {} value {} is outside [{}, {}]",
                filter_uuid, parameter_id, value, min, max
            ),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "failed to load configuration: {}", msg),
            ConfigError::Save(msg) => write!(f, "failed to save configuration: {}", msg),
        }
    }
}

impl std::error::Error for VcsError {}
impl std::error::Error for CaptureError {}
impl std::error::Error for AntiTearError {}
impl std::error::Error for FilterError {}
impl std::error::Error for ConfigError {}

impl From<CaptureError> for VcsError {
    fn from(err: CaptureError) -> Self {
        VcsError::Capture(err)
    }
}

impl From<AntiTearError> for VcsError {
    fn from(err: AntiTearError) -> Self {
        VcsError::AntiTear(err)
    }
}

impl From<FilterError> for VcsError {
    fn from(err: FilterError) -> Self {
        VcsError::Filter(err)
    }
}

impl From<ConfigError> for VcsError {
    fn from(err: ConfigError) -> Self {
        VcsError::Config(err)
    }
}

impl From<String> for VcsError {
    fn from(msg: String) -> Self {
        VcsError::Other(msg)
    }
}

impl From<&str> for VcsError {
    fn from(msg: &str) -> Self {
        VcsError::Other(msg.to_string())
    }
}
