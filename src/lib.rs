// SPDX-License-Identifier: GPL-3.0-only

//! filtercam - interactive image-transform pipelines for live camera frames
//!
//! The operator picks one of several interchangeable pipelines (pass-through,
//! grayscale, Canny and Sobel edges, Gaussian blur, thresholding, blur then
//! threshold) and tunes its parameters while frames stream through.
//!
//! # Architecture
//!
//! - [`params`]: parameter store with clamping and odd-kernel correction
//! - [`mode`]: application variants, modes and the mode controller
//! - [`pipeline`]: the engine composing elementary operations per mode
//! - [`frame`]: the frame type shared by every stage
//! - [`backends`]: frame loop driver, frame sources and display sinks
//! - [`config`]: startup configuration
//! - [`terminal`]: interactive terminal viewer
//!
//! # Example
//!
//! ```
//! use filtercam::{Frame, Mode, ModeController, ParameterStore, PipelineEngine, Variant};
//!
//! let modes = ModeController::new(Variant::Filters);
//! let store = ParameterStore::new(Variant::Filters);
//! store.set("smoothKernelSize", 8.0).unwrap(); // corrected to 9
//! modes.select_mode(Mode::SmoothThenBinarize).unwrap();
//!
//! let frame = Frame::from_rgb_fn(32, 24, |x, _| [x as u8 * 8, 40, 90]);
//! let out = PipelineEngine::new().run(&frame, &modes, &store).unwrap();
//! assert_eq!(out.frame.width(), 32);
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame;
pub mod mode;
pub mod params;
pub mod pipeline;
pub mod terminal;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, PipelineError};
pub use frame::{Frame, PixelFormat};
pub use mode::{Mode, ModeController, Variant};
pub use params::{ParamId, ParamSnapshot, ParamValue, ParameterStore, ThresholdPolicy};
pub use pipeline::{PipelineEngine, ProcessedFrame};
