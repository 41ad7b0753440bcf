// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources that need no camera hardware

use super::FrameSource;
use crate::config::SourceConfig;
use crate::errors::SourceError;
use crate::frame::Frame;
use std::path::{Path, PathBuf};
use tracing::info;

/// Animated color test pattern with sensor-like noise
///
/// A diagonal color gradient, a bright square sweeping left to right and a
/// dark disc, so every mode has edges and flat regions to work on.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame_index: u64,
    noise_amplitude: u8,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Result<Self, SourceError> {
        if width == 0 || height == 0 {
            return Err(SourceError::InvalidResolution { width, height });
        }
        Ok(Self {
            width,
            height,
            frame_index: 0,
            noise_amplitude: 12,
        })
    }

    /// Set the peak-to-peak noise amplitude (0 disables noise)
    pub fn with_noise(mut self, amplitude: u8) -> Self {
        self.noise_amplitude = amplitude;
        self
    }

    /// Render frame number `index` without advancing the source
    pub fn render(&self, index: u64) -> Frame {
        let (w, h) = (self.width, self.height);
        let side = (w.min(h) / 4).max(1);
        let travel = w.saturating_sub(side).max(1) as u64;
        let sq_x = ((index * 4) % travel) as u32;
        let sq_y = h / 4;
        let (cx, cy) = (w as f32 * 0.7, h as f32 * 0.65);
        let radius = (w.min(h) as f32 * 0.18).max(1.0);
        let amplitude = self.noise_amplitude as i32;
        let seed = index as u32;

        Frame::from_rgb_fn(w, h, |x, y| {
            let base = [
                (x * 255 / w.max(1)) as u8,
                (y * 255 / h.max(1)) as u8,
                (((x + y) * 255) / (w + h).max(1)) as u8,
            ];

            let in_square = x >= sq_x && x < sq_x + side && y >= sq_y && y < sq_y + side;
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let in_disc = dx * dx + dy * dy <= radius * radius;

            let px = if in_square {
                [240, 240, 230]
            } else if in_disc {
                [20, 30, 60]
            } else {
                base
            };

            if amplitude == 0 {
                return px;
            }
            let n = (noise(x, y, seed) % (amplitude as u32 + 1)) as i32 - amplitude / 2;
            px.map(|c| (c as i32 + n).clamp(0, 255) as u8)
        })
    }
}

/// Cheap deterministic per-pixel hash
fn noise(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(seed.wrapping_mul(2_246_822_519));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^ (h >> 16)
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<Frame> {
        let frame = self.render(self.frame_index);
        self.frame_index += 1;
        Some(frame)
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Repeats one decoded image file as a still video
pub struct StillImageSource {
    path: PathBuf,
    name: String,
    frame: Frame,
}

impl StillImageSource {
    /// Decode the image once; any format the `image` crate reads is accepted
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let img = image::open(path).map_err(|e| SourceError::ImageLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let frame = Frame::from(img.to_rgb8());
        info!(
            path = %path.display(),
            width = frame.width(),
            height = frame.height(),
            "Loaded still image source"
        );
        Ok(Self {
            path: path.to_path_buf(),
            name: format!("image:{}", path.display()),
            frame,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for StillImageSource {
    fn next_frame(&mut self) -> Option<Frame> {
        Some(self.frame.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Open the source a configuration describes
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn FrameSource>, SourceError> {
    match config {
        SourceConfig::Synthetic { width, height } => {
            Ok(Box::new(SyntheticSource::new(*width, *height)?))
        }
        SourceConfig::StillImage { path } => Ok(Box::new(StillImageSource::open(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_resolution_rejected() {
        assert!(matches!(
            SyntheticSource::new(0, 10),
            Err(SourceError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn test_synthetic_frames_are_color_and_sized() {
        let mut source = SyntheticSource::new(64, 48).unwrap();
        let frame = source.next_frame().unwrap();
        assert!(frame.is_color());
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }

    #[test]
    fn test_synthetic_pattern_animates() {
        let source = SyntheticSource::new(64, 48).unwrap().with_noise(0);
        assert_ne!(source.render(0), source.render(5));
        assert_eq!(source.render(3), source.render(3));
    }

    #[test]
    fn test_missing_image_is_reported() {
        let err = StillImageSource::open(Path::new("/nonexistent/frame.png"))
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::ImageLoad { .. }));
    }
}
