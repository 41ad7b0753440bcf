// SPDX-License-Identifier: GPL-3.0-only

//! Processing modes and the controller holding the active one
//!
//! Each application variant exposes a closed set of four modes. The
//! controller only tracks which one is active; the pipeline engine reads the
//! live value on every frame.

use crate::errors::PipelineError;
use crate::params::ParamId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Application variant, fixing the available modes and parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Color, grayscale, Canny and Sobel views
    #[default]
    Edges,
    /// Original, binarize, blur and blur-then-binarize views
    Filters,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Edges, Variant::Filters];

    /// Modes in button order
    pub fn modes(&self) -> &'static [Mode] {
        match self {
            Variant::Edges => &[
                Mode::Color,
                Mode::Grayscale,
                Mode::GradientEdges,
                Mode::DirectionalGradient,
            ],
            Variant::Filters => &[
                Mode::Original,
                Mode::Binarize,
                Mode::Smooth,
                Mode::SmoothThenBinarize,
            ],
        }
    }

    /// Mode active at startup
    pub fn default_mode(&self) -> Mode {
        match self {
            Variant::Edges => Mode::Color,
            Variant::Filters => Mode::Original,
        }
    }

    /// Parameters declared for this variant, in table order
    pub fn parameters(&self) -> &'static [ParamId] {
        match self {
            Variant::Edges => &[
                ParamId::GradientThresholdLow,
                ParamId::GradientThresholdHigh,
                ParamId::DirectionalKernelSize,
                ParamId::DirectionalScale,
                ParamId::DirectionalOffset,
            ],
            Variant::Filters => &[
                ParamId::BinarizeThreshold,
                ParamId::BinarizePolicy,
                ParamId::SmoothKernelSize,
                ParamId::SmoothSpread,
            ],
        }
    }

    pub fn declares(&self, param: ParamId) -> bool {
        self.parameters().contains(&param)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Edges => "edges",
            Variant::Filters => "filters",
        }
    }

    /// Window title used by the presentation layer
    pub fn title(&self) -> &'static str {
        match self {
            Variant::Edges => "Real-time Edge Detection",
            Variant::Filters => "Real-time Filters",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown variant '{s}' (expected edges or filters)"))
    }
}

/// Image-transform pipeline selected by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Pass-through of the color frame
    #[serde(rename = "color")]
    Color,
    /// Single-channel luminance
    #[serde(rename = "grayscale")]
    Grayscale,
    /// Canny-style gradient and hysteresis edges
    #[serde(rename = "canny")]
    GradientEdges,
    /// Sobel-style combined directional derivatives
    #[serde(rename = "sobel")]
    DirectionalGradient,
    /// Pass-through (filters variant)
    #[serde(rename = "original")]
    Original,
    /// Threshold against the binarize threshold and policy
    #[serde(rename = "binary")]
    Binarize,
    /// Gaussian blur
    #[serde(rename = "blur")]
    Smooth,
    /// Gaussian blur in color, then threshold
    #[serde(rename = "binary_blur")]
    SmoothThenBinarize,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Color,
        Mode::Grayscale,
        Mode::GradientEdges,
        Mode::DirectionalGradient,
        Mode::Original,
        Mode::Binarize,
        Mode::Smooth,
        Mode::SmoothThenBinarize,
    ];

    pub fn variant(&self) -> Variant {
        match self {
            Mode::Color | Mode::Grayscale | Mode::GradientEdges | Mode::DirectionalGradient => {
                Variant::Edges
            }
            Mode::Original | Mode::Binarize | Mode::Smooth | Mode::SmoothThenBinarize => {
                Variant::Filters
            }
        }
    }

    /// Stable key used in configuration files and the CLI
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Color => "color",
            Mode::Grayscale => "grayscale",
            Mode::GradientEdges => "canny",
            Mode::DirectionalGradient => "sobel",
            Mode::Original => "original",
            Mode::Binarize => "binary",
            Mode::Smooth => "blur",
            Mode::SmoothThenBinarize => "binary_blur",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Color => "Color",
            Mode::Grayscale => "Grayscale",
            Mode::GradientEdges => "Canny",
            Mode::DirectionalGradient => "Sobel",
            Mode::Original => "Original",
            Mode::Binarize => "Binarize",
            Mode::Smooth => "Blur",
            Mode::SmoothThenBinarize => "Blur + Binarize",
        }
    }

    /// Operator-facing explanation of what the mode shows
    pub fn description(&self) -> &'static str {
        match self {
            Mode::Color => {
                "Shows the camera feed in its original colors without any processing. \
                 This is the default view, keeping every color and detail as captured."
            }
            Mode::Grayscale => {
                "Converts the feed to grayscale, dropping color and representing each pixel \
                 by its intensity (0-255). Most edge and threshold algorithms start from this \
                 reduced representation."
            }
            Mode::GradientEdges => {
                "Applies the Canny edge detector: gradient estimation, non-maximum suppression \
                 and hysteresis thresholding. Pixels above the high threshold start edges, \
                 pixels above the low threshold extend them. Good at thin edges with little noise."
            }
            Mode::DirectionalGradient => {
                "Applies the Sobel operator in the horizontal (X) and vertical (Y) directions and \
                 combines both magnitudes, revealing edges in every orientation. Simpler and \
                 faster than Canny but more sensitive to noise."
            }
            Mode::Original => {
                "Shows the camera feed without any processing, keeping every color and detail \
                 as captured."
            }
            Mode::Binarize => {
                "Converts to grayscale and applies a threshold. With the binary policy pixels \
                 brighter than the threshold become white (255) and the rest black (0). Useful \
                 for segmentation and object detection."
            }
            Mode::Smooth => {
                "Applies a Gaussian blur, convolving the image with a Gaussian kernel to reduce \
                 noise and fine detail. Kernel size and sigma control the amount of blur."
            }
            Mode::SmoothThenBinarize => {
                "Blurs first and thresholds second. Smoothing before the threshold gives cleaner \
                 borders and less speckle in the binary result."
            }
        }
    }

    /// Parameters that affect this mode's output, in display order
    pub fn parameters(&self) -> &'static [ParamId] {
        match self {
            Mode::Color | Mode::Grayscale | Mode::Original => &[],
            Mode::GradientEdges => &[
                ParamId::GradientThresholdLow,
                ParamId::GradientThresholdHigh,
            ],
            Mode::DirectionalGradient => &[
                ParamId::DirectionalKernelSize,
                ParamId::DirectionalScale,
                ParamId::DirectionalOffset,
            ],
            Mode::Binarize => &[ParamId::BinarizeThreshold, ParamId::BinarizePolicy],
            Mode::Smooth => &[ParamId::SmoothKernelSize, ParamId::SmoothSpread],
            Mode::SmoothThenBinarize => &[
                ParamId::BinarizeThreshold,
                ParamId::BinarizePolicy,
                ParamId::SmoothKernelSize,
                ParamId::SmoothSpread,
            ],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mode '{s}'"))
    }
}

/// Holds the single active mode for one application variant
///
/// Reads and writes go through one lock so a frame never sees a torn value
/// when the controller is shared with a capture thread.
#[derive(Debug)]
pub struct ModeController {
    variant: Variant,
    active: RwLock<Mode>,
}

impl ModeController {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            active: RwLock::new(variant.default_mode()),
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Currently active mode
    pub fn active(&self) -> Mode {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `mode` active; any mode of the variant may follow any other
    pub fn select_mode(&self, mode: Mode) -> Result<(), PipelineError> {
        if mode.variant() != self.variant {
            return Err(PipelineError::ModeNotInVariant {
                mode,
                variant: self.variant,
            });
        }

        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if *active != mode {
            debug!(from = %*active, to = %mode, "Mode changed");
            *active = mode;
        }
        Ok(())
    }

    /// Select by button position (0-based); out-of-range indices are ignored
    pub fn select_index(&self, index: usize) -> Option<Mode> {
        let mode = *self.variant.modes().get(index)?;
        // Always within the variant
        self.select_mode(mode).ok()?;
        Some(mode)
    }
}
