// SPDX-License-Identifier: GPL-3.0-only

//! Out-of-image index mapping for neighbourhood operators

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Repeat the edge pixel: `aaa|abcd|ddd`
    Replicate,
    /// Mirror without repeating the edge pixel: `dcb|abcd|cba`
    Reflect101,
}

/// Map a possibly out-of-range index into `0..len`
///
/// `len` must be non-zero.
pub fn map_index(i: isize, len: usize, border: Border) -> usize {
    debug_assert!(len > 0, "map_index on empty axis");
    match border {
        Border::Replicate => i.clamp(0, len as isize - 1) as usize,
        Border::Reflect101 => {
            if len == 1 {
                return 0;
            }
            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len { r } else { 2 * len - 2 - r }
        }
    }
}
