// SPDX-License-Identifier: GPL-3.0-only

//! Startup configuration
//!
//! Read once at startup from JSON. Parameter values in the file go through
//! the parameter store's setters, so they are corrected exactly like operator
//! input. Nothing is ever written back.

use crate::constants::{self, file_formats, synthetic, timing};
use crate::errors::{AppError, AppResult};
use crate::mode::{Mode, ModeController, Variant};
use crate::params::{ParameterStore, ThresholdPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where raw frames come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Generated test pattern
    Synthetic { width: u32, height: u32 },
    /// A single image file shown repeatedly
    StillImage { path: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Synthetic {
            width: synthetic::DEFAULT_WIDTH,
            height: synthetic::DEFAULT_HEIGHT,
        }
    }
}

/// Startup value of one parameter
///
/// Numbers go through the setters like operator input. The threshold policy
/// may also be given by name, e.g. `"binarizePolicy": "TOZERO"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamInput {
    Number(f64),
    Policy(ThresholdPolicy),
}

impl ParamInput {
    /// Raw numeric form handed to the parameter store
    pub fn raw(&self) -> f64 {
        match self {
            ParamInput::Number(v) => *v,
            ParamInput::Policy(policy) => policy.index() as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application variant (edges or filters)
    pub variant: Variant,
    /// Mode active at startup; defaults to the variant's default mode
    pub initial_mode: Option<Mode>,
    /// Pause between frame loop ticks in milliseconds
    pub frame_interval_ms: u64,
    /// Frame source
    pub source: SourceConfig,
    /// Startup parameter values keyed by parameter name
    pub parameters: BTreeMap<String, ParamInput>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            initial_mode: None,
            frame_interval_ms: timing::DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            source: SourceConfig::default(),
            parameters: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Default location: `<config dir>/filtercam/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(constants::CONFIG_DIR_NAME)
                .join(constants::CONFIG_FILE_NAME)
        })
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No configuration file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), variant = %config.variant, "Loaded configuration");
        Ok(config)
    }

    pub fn from_json(text: &str) -> AppResult<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks that do not depend on the parameter table
    pub fn validate(&self) -> AppResult<()> {
        if let Some(mode) = self.initial_mode
            && mode.variant() != self.variant
        {
            return Err(AppError::Config(format!(
                "initial mode '{}' does not belong to the {} variant",
                mode, self.variant
            )));
        }

        match &self.source {
            SourceConfig::Synthetic { width, height } if *width == 0 || *height == 0 => {
                return Err(AppError::Config(format!(
                    "synthetic source resolution {width}x{height} has zero area"
                )));
            }
            SourceConfig::StillImage { path } => {
                let supported = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(file_formats::is_image_extension);
                if !supported {
                    warn!(path = %path.display(), "Unrecognised image extension");
                }
            }
            SourceConfig::Synthetic { .. } => {}
        }

        Ok(())
    }

    /// Tick interval, capped at the maximum accepted interval
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms).min(timing::MAX_FRAME_INTERVAL)
    }

    /// Build the mode controller and parameter store this configuration describes
    ///
    /// Unknown parameter names are contract violations and fail startup.
    pub fn build_state(&self) -> AppResult<(ModeController, ParameterStore)> {
        let modes = ModeController::new(self.variant);
        if let Some(mode) = self.initial_mode {
            modes.select_mode(mode)?;
        }

        let store = ParameterStore::new(self.variant);
        for (name, input) in &self.parameters {
            let raw = input.raw();
            let value = store.set(name, raw)?;
            debug!(param = %name, raw, %value, "Applied configured parameter");
        }

        Ok((modes, store))
    }
}
