// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline engine: turns one raw frame into one displayable frame
//!
//! The active mode picks a fixed sequence of elementary operations:
//!
//! | Mode                 | Stages                                     |
//! |----------------------|--------------------------------------------|
//! | Color / Original     | pass-through                               |
//! | Grayscale            | grayscale                                  |
//! | GradientEdges        | grayscale → Canny                          |
//! | DirectionalGradient  | grayscale → Sobel X/Y → magnitude          |
//! | Binarize             | grayscale → threshold                      |
//! | Smooth               | Gaussian blur                              |
//! | SmoothThenBinarize   | Gaussian blur (color) → grayscale → threshold |
//!
//! Parameters arrive already corrected by the parameter store; the engine
//! never re-derives them.

pub mod ops;

use crate::errors::PipelineError;
use crate::frame::Frame;
use crate::mode::{Mode, ModeController};
use crate::params::{ParamId, ParamSnapshot, ParamValue, ParameterStore};
use tracing::trace;

/// Output of one engine run together with what produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame {
    pub frame: Frame,
    /// Mode used for the whole frame
    pub mode: Mode,
    /// Parameters the mode used, with their values
    pub params: Vec<(ParamId, ParamValue)>,
}

impl ProcessedFrame {
    /// `Mode: CANNY | Threshold1: 50 | Threshold2: 150`
    pub fn status_line(&self) -> String {
        let mut text = format!("Mode: {}", self.mode.name().to_uppercase());
        for (id, value) in &self.params {
            text.push_str(&format!(" | {}: {}", id.label(), value));
        }
        text
    }
}

/// Stateless per-mode composition of elementary operations
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineEngine;

impl PipelineEngine {
    pub fn new() -> Self {
        Self
    }

    /// Process `frame` with an explicit mode and parameter snapshot
    ///
    /// Fails only for a zero-area frame. The input is never modified.
    pub fn process(
        &self,
        frame: &Frame,
        mode: Mode,
        params: &ParamSnapshot,
    ) -> Result<Frame, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::InvalidFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }

        trace!(%mode, width = frame.width(), height = frame.height(), "Processing frame");

        let output = match mode {
            Mode::Color | Mode::Original => frame.clone(),
            Mode::Grayscale => ops::to_grayscale(frame),
            // Both operators reduce color to luma themselves
            Mode::GradientEdges => ops::canny(
                frame,
                params.gradient_threshold_low(),
                params.gradient_threshold_high(),
            ),
            Mode::DirectionalGradient => ops::sobel_magnitude(
                frame,
                params.directional_kernel_size(),
                params.directional_scale(),
                params.directional_offset(),
            ),
            Mode::Binarize => binarize(frame, params),
            Mode::Smooth => smooth(frame, params),
            Mode::SmoothThenBinarize => binarize(&smooth(frame, params), params),
        };

        Ok(output)
    }

    /// Read the live mode and a parameter snapshot, then process
    ///
    /// Mode and parameters are each read once, so the whole frame is
    /// processed with one consistent configuration.
    pub fn run(
        &self,
        frame: &Frame,
        modes: &ModeController,
        store: &ParameterStore,
    ) -> Result<ProcessedFrame, PipelineError> {
        let mode = modes.active();
        let params = store.snapshot();
        let output = self.process(frame, mode, &params)?;
        Ok(ProcessedFrame {
            frame: output,
            mode,
            params: params.in_effect(mode),
        })
    }
}

/// Grayscale (if needed) then threshold with the active policy
pub fn binarize(frame: &Frame, params: &ParamSnapshot) -> Frame {
    let gray = ops::to_grayscale(frame);
    let data = ops::threshold(
        gray.data(),
        params.binarize_threshold(),
        params.binarize_policy(),
    );
    Frame::new(gray.width(), gray.height(), gray.format(), data).unwrap_or(gray)
}

/// Gaussian blur with the corrected kernel size and spread
pub fn smooth(frame: &Frame, params: &ParamSnapshot) -> Frame {
    ops::gaussian_blur(frame, params.smooth_kernel_size(), params.smooth_spread())
}
