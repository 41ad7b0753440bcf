// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the filter pipeline and the application around it

use crate::mode::{Mode, Variant};
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by the pipeline core (parameter store, mode controller, engine)
///
/// Out-of-range numbers, even kernel sizes and inverted threshold pairs are not
/// errors: the parameter store corrects them before any reader sees them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Frame is absent or has zero area; the caller skips this tick
    #[error("invalid frame ({width}x{height})")]
    InvalidFrame { width: u32, height: u32 },
    /// Parameter name is not declared for the active application variant
    #[error("parameter '{name}' is not declared for the {variant} variant")]
    InvalidParameterName { name: String, variant: Variant },
    /// Mode belongs to another application variant
    #[error("mode '{mode}' is not available in the {variant} variant")]
    ModeNotInVariant { mode: Mode, variant: Variant },
    /// Pixel buffer length does not match width * height * channels
    #[error("frame buffer size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },
}

impl PipelineError {
    /// Whether the condition only affects the current frame
    ///
    /// Contract violations (undeclared parameters or modes) are not transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidFrame { .. } | PipelineError::FrameSizeMismatch { .. }
        )
    }
}

/// Frame source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// Image file could not be opened or decoded
    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },
    /// Requested synthetic resolution has zero area
    #[error("invalid source resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
}

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Pipeline core errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    /// Frame source errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Terminal and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}
