// SPDX-License-Identifier: GPL-3.0-only

//! Separable correlation on single-channel float planes

use super::border::{Border, map_index};

/// Single-channel image of `f32` samples
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl Plane {
    pub fn from_u8(width: usize, height: usize, data: &[u8]) -> Self {
        Self {
            width,
            height,
            data: data.iter().map(|&v| v as f32).collect(),
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

/// Correlate rows with `kx`, then columns with `ky`
///
/// Both kernels must have odd length; they are centred on the output pixel,
/// so `out(x) = sum_i k[i] * in(x + i - r)`.
pub fn separable(plane: &Plane, kx: &[f32], ky: &[f32], border: Border) -> Plane {
    let horizontal = correlate_rows(plane, kx, border);
    correlate_cols(&horizontal, ky, border)
}

fn correlate_rows(plane: &Plane, kernel: &[f32], border: Border) -> Plane {
    let (w, h) = (plane.width, plane.height);
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![0.0f32; w * h];

    for y in 0..h {
        let row = &plane.data[y * w..(y + 1) * w];
        let out_row = &mut out[y * w..(y + 1) * w];
        for (x, out_px) in out_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (i, &kv) in kernel.iter().enumerate() {
                let idx = map_index(x as isize + i as isize - radius, w, border);
                acc += row[idx] * kv;
            }
            *out_px = acc;
        }
    }

    Plane {
        width: w,
        height: h,
        data: out,
    }
}

fn correlate_cols(plane: &Plane, kernel: &[f32], border: Border) -> Plane {
    let (w, h) = (plane.width, plane.height);
    let radius = (kernel.len() / 2) as isize;
    let mut out = vec![0.0f32; w * h];

    for y in 0..h {
        for (i, &kv) in kernel.iter().enumerate() {
            let src_y = map_index(y as isize + i as isize - radius, h, border);
            let src = &plane.data[src_y * w..(src_y + 1) * w];
            let dst = &mut out[y * w..(y + 1) * w];
            for (d, &s) in dst.iter_mut().zip(src) {
                *d += s * kv;
            }
        }
    }

    Plane {
        width: w,
        height: h,
        data: out,
    }
}

/// Round and saturate a float sample into the displayable range
#[inline]
pub fn saturate_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
