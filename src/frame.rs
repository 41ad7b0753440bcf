// SPDX-License-Identifier: GPL-3.0-only

//! Frame type shared by sources, the pipeline engine and display sinks
//!
//! Frames are tightly packed (no row padding). Color frames store RGB24,
//! intensity frames store one byte per pixel.

use crate::errors::PipelineError;
use image::{GrayImage, RgbImage};
use std::fmt;

/// Pixel layout of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3-channel color, R G B byte order
    Rgb24,
    /// Single-channel 8-bit intensity
    Gray8,
}

impl PixelFormat {
    /// Number of bytes per pixel
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Rgb24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Rgb24 => write!(f, "RGB24"),
            PixelFormat::Gray8 => write!(f, "GRAY8"),
        }
    }
}

/// One rectangular image sample of the video sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap a packed pixel buffer
    ///
    /// Zero-area frames are representable so the engine can reject them
    /// with [`PipelineError::InvalidFrame`]; only the buffer length is checked here.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, PipelineError> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(PipelineError::FrameSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Frame filled with a single value per channel
    pub fn filled(width: u32, height: u32, format: PixelFormat, value: u8) -> Self {
        let len = width as usize * height as usize * format.channels();
        Self {
            width,
            height,
            format,
            data: vec![value; len],
        }
    }

    /// Build a single-channel frame from a per-pixel function
    pub fn from_gray_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            format: PixelFormat::Gray8,
            data,
        }
    }

    /// Build a color frame from a per-pixel function
    pub fn from_rgb_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            format: PixelFormat::Rgb24,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// True when the frame has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn is_color(&self) -> bool {
        self.format == PixelFormat::Rgb24
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * self.format.channels()
    }

    /// Pixel as RGB; intensity frames are expanded to gray
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        match self.format {
            PixelFormat::Rgb24 => {
                let idx = y * self.stride() + x * 3;
                match self.data.get(idx..idx + 3) {
                    Some(px) => (px[0], px[1], px[2]),
                    None => (0, 0, 0),
                }
            }
            PixelFormat::Gray8 => {
                let v = self.data.get(y * self.stride() + x).copied().unwrap_or(0);
                (v, v, v)
            }
        }
    }

    /// Convert into an `image` RGB buffer for presentation or export
    pub fn to_rgb_image(&self) -> RgbImage {
        let data = match self.format {
            PixelFormat::Rgb24 => self.data.clone(),
            PixelFormat::Gray8 => self.data.iter().flat_map(|&v| [v, v, v]).collect(),
        };
        RgbImage::from_raw(self.width, self.height, data)
            .unwrap_or_else(|| RgbImage::new(self.width, self.height))
    }
}

impl From<RgbImage> for Frame {
    fn from(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgb24,
            data: img.into_raw(),
        }
    }
}

impl From<GrayImage> for Frame {
    fn from(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Gray8,
            data: img.into_raw(),
        }
    }
}
