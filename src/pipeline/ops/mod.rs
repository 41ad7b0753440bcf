// SPDX-License-Identifier: GPL-3.0-only

//! Elementary image operations
//!
//! Each operator is a deterministic pure function of its inputs and keeps the
//! frame's width and height. The pipeline engine composes them per mode.

pub mod border;
pub mod canny;
pub mod convolve;
pub mod grayscale;
pub mod sobel;
pub mod threshold;

mod blur;

pub use blur::{auto_sigma, gaussian_blur, gaussian_kernel};
pub use canny::canny;
pub use grayscale::{intensity_plane, luma, to_grayscale};
pub use sobel::{sobel_kernels, sobel_magnitude};
pub use threshold::{threshold, threshold_pixel};
