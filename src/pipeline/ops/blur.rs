// SPDX-License-Identifier: GPL-3.0-only

//! Separable Gaussian smoothing

use super::border::Border;
use super::convolve::{Plane, saturate_u8, separable};
use crate::frame::Frame;
use crate::params::corrected_kernel;

/// Largest supported kernel size
pub const MAX_KERNEL_SIZE: u32 = 31;

/// Sigma used when the spread parameter is zero
///
/// Grows with the kernel so small kernels blur less.
pub fn auto_sigma(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1D Gaussian of odd length `ksize`
///
/// Even or oversized sizes snap to the odd size the parameter store would
/// have stored.
pub fn gaussian_kernel(ksize: u32, sigma: f32) -> Vec<f32> {
    let ksize = corrected_kernel(ksize as f64, 1, MAX_KERNEL_SIZE as i64);
    let sigma = if sigma > 0.0 { sigma } else { auto_sigma(ksize) };
    let radius = (ksize / 2) as i32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|x| (-((x * x) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }
    kernel
}

/// Blur every channel of the frame with a `ksize`×`ksize` Gaussian
pub fn gaussian_blur(frame: &Frame, ksize: u32, sigma: f32) -> Frame {
    if ksize <= 1 {
        return frame.clone();
    }

    let kernel = gaussian_kernel(ksize, sigma);
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let channels = frame.format().channels();
    let src = frame.data();
    let mut out = vec![0u8; src.len()];

    for c in 0..channels {
        let samples: Vec<u8> = src.iter().skip(c).step_by(channels).copied().collect();
        let plane = Plane::from_u8(w, h, &samples);
        let blurred = separable(&plane, &kernel, &kernel, Border::Reflect101);
        for (i, &v) in blurred.data.iter().enumerate() {
            out[i * channels + c] = saturate_u8(v);
        }
    }

    Frame::new(frame.width(), frame.height(), frame.format(), out)
        .unwrap_or_else(|_| frame.clone())
}
