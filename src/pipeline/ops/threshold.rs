// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-level thresholding of intensity frames

use crate::params::ThresholdPolicy;

/// Value assigned to "on" pixels by the binary policies
pub const MAX_VALUE: u8 = 255;

/// Apply one threshold policy to a single pixel
#[inline]
pub fn threshold_pixel(v: u8, threshold: u8, policy: ThresholdPolicy) -> u8 {
    let above = v > threshold;
    match policy {
        ThresholdPolicy::Binary => {
            if above {
                MAX_VALUE
            } else {
                0
            }
        }
        ThresholdPolicy::BinaryInv => {
            if above {
                0
            } else {
                MAX_VALUE
            }
        }
        ThresholdPolicy::Truncate => {
            if above {
                threshold
            } else {
                v
            }
        }
        ThresholdPolicy::ToZero => {
            if above {
                v
            } else {
                0
            }
        }
        ThresholdPolicy::ToZeroInv => {
            if above {
                0
            } else {
                v
            }
        }
    }
}

/// Threshold a packed single-channel buffer
pub fn threshold(gray: &[u8], threshold: u8, policy: ThresholdPolicy) -> Vec<u8> {
    gray.iter()
        .map(|&v| threshold_pixel(v, threshold, policy))
        .collect()
}
