// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Frame loop timing
pub mod timing {
    use super::Duration;

    /// Default pause between frame loop ticks
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(10);

    /// Upper bound accepted from configuration
    pub const MAX_FRAME_INTERVAL: Duration = Duration::from_millis(1000);

    /// Terminal input poll timeout (~60 redraws per second)
    pub const UI_POLL_INTERVAL: Duration = Duration::from_millis(16);
}

/// Synthetic source defaults
pub mod synthetic {
    /// Default synthetic frame width
    pub const DEFAULT_WIDTH: u32 = 320;

    /// Default synthetic frame height
    pub const DEFAULT_HEIGHT: u32 = 240;
}

/// Display channel and logging
pub mod display {
    /// Frames buffered between the frame loop and the terminal UI
    pub const CHANNEL_CAPACITY: usize = 4;

    /// Headless runs log one status line per this many frames
    pub const LOG_EVERY_FRAMES: u64 = 30;
}

/// Supported still image file extensions
pub mod file_formats {
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Configuration file location under the user config directory
pub const CONFIG_DIR_NAME: &str = "filtercam";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_case_insensitive() {
        assert!(file_formats::is_image_extension("PNG"));
        assert!(file_formats::is_image_extension("jpeg"));
        assert!(!file_formats::is_image_extension("mp4"));
    }

    #[test]
    fn test_default_interval_within_bounds() {
        assert!(timing::DEFAULT_FRAME_INTERVAL <= timing::MAX_FRAME_INTERVAL);
    }
}
