// SPDX-License-Identifier: GPL-3.0-only

//! Color to intensity reduction

use super::convolve::Plane;
use crate::frame::{Frame, PixelFormat};

// BT.601 luma weights in 14-bit fixed point (sum = 1 << 14)
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Luma of one RGB pixel
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let sum = r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT + (1 << (SHIFT - 1));
    (sum >> SHIFT) as u8
}

/// Single-channel copy of the frame; intensity frames are returned unchanged
pub fn to_grayscale(frame: &Frame) -> Frame {
    match frame.format() {
        PixelFormat::Gray8 => frame.clone(),
        PixelFormat::Rgb24 => {
            let data: Vec<u8> = frame
                .data()
                .chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect();
            Frame::new(frame.width(), frame.height(), PixelFormat::Gray8, data)
                .unwrap_or_else(|_| Frame::filled(frame.width(), frame.height(), PixelFormat::Gray8, 0))
        }
    }
}

/// Float intensity plane of any frame; color pixels are reduced to luma
pub fn intensity_plane(frame: &Frame) -> Plane {
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    match frame.format() {
        PixelFormat::Gray8 => Plane::from_u8(w, h, frame.data()),
        PixelFormat::Rgb24 => Plane {
            width: w,
            height: h,
            data: frame
                .data()
                .chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]) as f32)
                .collect(),
        },
    }
}
