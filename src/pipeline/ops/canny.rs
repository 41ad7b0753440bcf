// SPDX-License-Identifier: GPL-3.0-only

//! Canny edge detector
//!
//! 3×3 Sobel gradients with L1 magnitude, non-maximum suppression along four
//! quantised directions, then double thresholding with 8-connected
//! hysteresis. The input is not pre-smoothed.
//!
//! When `low > high` the two thresholds are swapped before use. This is the
//! operator's own behavior; callers pass the operator's values unmodified.

use super::border::Border;
use super::grayscale::intensity_plane;
use super::sobel::derivatives;
use crate::frame::{Frame, PixelFormat};

/// tan(22.5°) in Q15
const TG22: i64 = 13573;

const NOT_EDGE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Binary edge map (255 = edge) of a frame's intensity
///
/// Color frames are reduced to luma first.
pub fn canny(frame: &Frame, low: f32, high: f32) -> Frame {
    let (low, high) = if low > high { (high, low) } else { (low, high) };
    let (w, h) = (frame.width() as usize, frame.height() as usize);

    let plane = intensity_plane(frame);
    let (dx, dy) = derivatives(&plane, 3, Border::Replicate);
    let dx: Vec<i32> = dx.data.iter().map(|&v| v as i32).collect();
    let dy: Vec<i32> = dy.data.iter().map(|&v| v as i32).collect();
    let mag: Vec<i32> = dx.iter().zip(&dy).map(|(a, b)| a.abs() + b.abs()).collect();

    let mag_at = |x: isize, y: isize| -> i32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0
        } else {
            mag[y as usize * w + x as usize]
        }
    };

    let mut marks = vec![NOT_EDGE; w * h];
    let mut stack: Vec<usize> = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let m = mag[idx];
            if m as f32 <= low {
                continue;
            }

            let (xi, yi) = (x as isize, y as isize);
            let gx = dx[idx] as i64;
            let gy = dy[idx] as i64;
            let ax = gx.abs();
            let ay = gy.abs() << 15;
            let tg22x = ax * TG22;

            let is_max = if ay < tg22x {
                // Gradient mostly horizontal: compare left/right
                m > mag_at(xi - 1, yi) && m >= mag_at(xi + 1, yi)
            } else {
                let tg67x = tg22x + (ax << 16);
                if ay > tg67x {
                    m > mag_at(xi, yi - 1) && m >= mag_at(xi, yi + 1)
                } else {
                    let s: isize = if (gx ^ gy) < 0 { -1 } else { 1 };
                    m > mag_at(xi - s, yi - 1) && m > mag_at(xi + s, yi + 1)
                }
            };

            if !is_max {
                continue;
            }
            if m as f32 > high {
                marks[idx] = STRONG;
                stack.push(idx);
            } else {
                marks[idx] = WEAK;
            }
        }
    }

    // Hysteresis: grow strong edges into connected weak candidates
    while let Some(idx) = stack.pop() {
        let (x, y) = ((idx % w) as isize, (idx / w) as isize);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let n = ny as usize * w + nx as usize;
                if marks[n] == WEAK {
                    marks[n] = STRONG;
                    stack.push(n);
                }
            }
        }
    }

    let data: Vec<u8> = marks
        .iter()
        .map(|&m| if m == STRONG { 255 } else { 0 })
        .collect();
    Frame::new(frame.width(), frame.height(), PixelFormat::Gray8, data)
        .unwrap_or_else(|_| Frame::filled(frame.width(), frame.height(), PixelFormat::Gray8, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_edge() -> Frame {
        Frame::from_gray_fn(16, 12, |x, _| if x < 8 { 20 } else { 220 })
    }

    #[test]
    fn flat_image_has_no_edges() {
        let frame = Frame::filled(10, 10, PixelFormat::Gray8, 128);
        let edges = canny(&frame, 50.0, 150.0);
        assert!(edges.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn step_edge_yields_a_single_vertical_line() {
        let edges = canny(&step_edge(), 50.0, 150.0);
        for y in 0..12 {
            let row = &edges.data()[y * 16..(y + 1) * 16];
            let count = row.iter().filter(|&&v| v == 255).count();
            assert_eq!(count, 1, "row {y}: {row:?}");
            assert!(row[7] == 255 || row[8] == 255);
        }
    }

    #[test]
    fn output_is_binary() {
        let frame = Frame::from_gray_fn(20, 20, |x, y| ((x * 31 + y * 17) % 256) as u8);
        let edges = canny(&frame, 30.0, 90.0);
        assert!(edges.data().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn inverted_thresholds_behave_as_swapped() {
        let frame = Frame::from_gray_fn(20, 20, |x, y| ((x * x + y * 7) % 256) as u8);
        assert_eq!(canny(&frame, 150.0, 50.0), canny(&frame, 50.0, 150.0));
    }

    #[test]
    fn threshold_above_gradient_suppresses_edges() {
        // Step of 200 gives L1 magnitude 800
        let edges = canny(&step_edge(), 900.0, 1000.0);
        assert!(edges.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn color_input_matches_its_luma() {
        let color = Frame::from_rgb_fn(16, 12, |x, _| if x < 8 { [20; 3] } else { [220; 3] });
        assert_eq!(canny(&color, 50.0, 150.0), canny(&step_edge(), 50.0, 150.0));
    }
}
