// SPDX-License-Identifier: GPL-3.0-only

//! Frame loop driver and its collaborators
//!
//! The driver pulls raw frames from a [`FrameSource`], runs them through the
//! pipeline engine with the live mode and parameters, and hands the result
//! to a [`DisplaySink`]:
//!
//! ```text
//! FrameSource ──raw frame──▶ PipelineEngine ──FrameReport──▶ DisplaySink
//!                               ▲        ▲
//!                     ModeController  ParameterStore
//! ```
//!
//! # Modules
//!
//! - [`frame_loop`]: tick logic, pacing thread and FPS measurement
//! - [`sources`]: synthetic test pattern and still-image sources
//! - [`sinks`]: channel sink for UIs and a logging sink for headless runs

pub mod frame_loop;
pub mod sinks;
pub mod sources;

pub use frame_loop::{FpsCounter, FrameLoop, FrameLoopController, FrameReport, LoopAction};
pub use sinks::{ChannelSink, LogSink};
pub use sources::{StillImageSource, SyntheticSource, open_source};

use crate::frame::Frame;

/// Supplier of raw frames
pub trait FrameSource: Send {
    /// Next frame, or `None` when nothing could be acquired this tick
    fn next_frame(&mut self) -> Option<Frame>;

    /// Human-readable source name for logging
    fn name(&self) -> &str;
}

/// Consumer of processed frames
pub trait DisplaySink: Send {
    /// Take ownership of one processed frame
    ///
    /// Returning [`LoopAction::Stop`] ends the frame loop.
    fn present(&mut self, report: FrameReport) -> LoopAction;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_frame(&mut self) -> Option<Frame> {
        (**self).next_frame()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
