// SPDX-License-Identifier: GPL-3.0-only

//! Sobel directional derivatives and their Euclidean combination

use super::border::Border;
use super::convolve::{Plane, saturate_u8, separable};
use super::grayscale::intensity_plane;
use crate::frame::{Frame, PixelFormat};
use crate::params::corrected_kernel;

/// Largest supported aperture
pub const MAX_APERTURE: u32 = 7;

/// Binomial smoothing kernel of length `n` (row `n - 1` of Pascal's triangle)
fn binomial(n: usize) -> Vec<f32> {
    let mut row = vec![1.0f32];
    for _ in 1..n {
        let mut next = vec![1.0f32; row.len() + 1];
        for i in 1..row.len() {
            next[i] = row[i - 1] + row[i];
        }
        row = next;
    }
    row
}

/// Smoothing and first-derivative kernels for an odd aperture
///
/// Aperture 1 differentiates with `[-1, 0, 1]` and does not smooth across.
/// Even or oversized apertures snap to the odd size the parameter store
/// would have stored.
pub fn sobel_kernels(ksize: u32) -> (Vec<f32>, Vec<f32>) {
    let ksize = corrected_kernel(ksize as f64, 1, MAX_APERTURE as i64);
    if ksize <= 1 {
        return (vec![1.0], vec![-1.0, 0.0, 1.0]);
    }

    let n = ksize as usize;
    let smooth = binomial(n);
    // Differentiate a shorter binomial: [1 .. 1] * [-1, 1]
    let base = binomial(n - 1);
    let mut deriv = vec![0.0f32; n];
    for (i, &b) in base.iter().enumerate() {
        deriv[i] -= b;
        deriv[i + 1] += b;
    }
    (smooth, deriv)
}

/// Horizontal and vertical derivatives of an intensity plane
pub fn derivatives(plane: &Plane, ksize: u32, border: Border) -> (Plane, Plane) {
    let (smooth, deriv) = sobel_kernels(ksize);
    let dx = separable(plane, &deriv, &smooth, border);
    let dy = separable(plane, &smooth, &deriv, border);
    (dx, dy)
}

/// Combined gradient magnitude of a frame's intensity
///
/// Each derivative is mapped through `scale * d + offset` before the
/// Euclidean combination; the magnitude is rounded and clipped to 0..=255.
/// Color frames are reduced to luma first.
pub fn sobel_magnitude(frame: &Frame, ksize: u32, scale: f32, offset: f32) -> Frame {
    let plane = intensity_plane(frame);
    let (dx, dy) = derivatives(&plane, ksize, Border::Reflect101);

    let data: Vec<u8> = dx
        .data
        .iter()
        .zip(&dy.data)
        .map(|(&gx, &gy)| {
            let gx = scale * gx + offset;
            let gy = scale * gy + offset;
            saturate_u8((gx * gx + gy * gy).sqrt())
        })
        .collect();

    Frame::new(frame.width(), frame.height(), PixelFormat::Gray8, data)
        .unwrap_or_else(|_| Frame::filled(frame.width(), frame.height(), PixelFormat::Gray8, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernels_match_classic_apertures() {
        assert_eq!(sobel_kernels(3), (vec![1.0, 2.0, 1.0], vec![-1.0, 0.0, 1.0]));
        assert_eq!(
            sobel_kernels(5),
            (
                vec![1.0, 4.0, 6.0, 4.0, 1.0],
                vec![-1.0, -2.0, 0.0, 2.0, 1.0]
            )
        );
        assert_eq!(
            sobel_kernels(7).1,
            vec![-1.0, -4.0, -5.0, 0.0, 5.0, 4.0, 1.0]
        );
        assert_eq!(sobel_kernels(1), (vec![1.0], vec![-1.0, 0.0, 1.0]));
    }

    #[test]
    fn flat_image_has_no_gradient() {
        let frame = Frame::filled(8, 8, PixelFormat::Gray8, 90);
        let out = sobel_magnitude(&frame, 3, 1.0, 0.0);
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn offset_applies_to_both_axes() {
        // dx = dy = 0, so magnitude = sqrt(2) * offset
        let frame = Frame::filled(4, 4, PixelFormat::Gray8, 10);
        let out = sobel_magnitude(&frame, 3, 1.0, 10.0);
        assert!(out.data().iter().all(|&v| v == 14));
    }

    #[test]
    fn horizontal_ramp_gives_horizontal_gradient() {
        let frame = Frame::from_gray_fn(9, 5, |x, _| (x * 5) as u8);
        let out = sobel_magnitude(&frame, 3, 1.0, 0.0);
        // interior: 4 * (5 * 2) = 40
        assert_eq!(out.data()[2 * 9 + 4], 40);
    }

    #[test]
    fn scale_multiplies_the_magnitude() {
        let frame = Frame::from_gray_fn(9, 5, |x, _| (x * 5) as u8);
        let once = sobel_magnitude(&frame, 3, 1.0, 0.0);
        let twice = sobel_magnitude(&frame, 3, 2.0, 0.0);
        assert_eq!(twice.data()[2 * 9 + 4], 2 * once.data()[2 * 9 + 4]);
    }

    #[test]
    fn even_and_oversized_apertures_snap_to_odd() {
        assert_eq!(sobel_kernels(4), sobel_kernels(5));
        assert_eq!(sobel_kernels(0), sobel_kernels(1));
        assert_eq!(sobel_kernels(u32::MAX), sobel_kernels(7));
    }

    #[test]
    fn color_input_uses_luma() {
        let color = Frame::from_rgb_fn(9, 5, |x, _| {
            let v = (x * 5) as u8;
            [v, v, v]
        });
        let gray = Frame::from_gray_fn(9, 5, |x, _| (x * 5) as u8);
        assert_eq!(
            sobel_magnitude(&color, 3, 1.0, 0.0),
            sobel_magnitude(&gray, 3, 1.0, 0.0)
        );
    }
}
