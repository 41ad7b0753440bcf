// SPDX-License-Identifier: GPL-3.0-only

//! Parameter store: the single source of truth for tunable pipeline values
//!
//! Every write is corrected before it becomes visible: values are clamped to
//! their declared range, integer parameters are floored, and kernel sizes are
//! forced odd. Out-of-range input is never an error.
//!
//! The parameter table (identifiers, ranges, defaults) is stable and meant to
//! be bound directly by configuration files and UI controls.

use crate::errors::PipelineError;
use crate::mode::{Mode, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Pixel comparison rule used by binarization
///
/// Serialized under the same names [`ThresholdPolicy::name`] displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ThresholdPolicy {
    /// `v > t` → 255, else 0
    #[default]
    #[serde(rename = "BINARY")]
    Binary,
    /// `v > t` → 0, else 255
    #[serde(rename = "BINARY_INV")]
    BinaryInv,
    /// `v > t` → t, else v
    #[serde(rename = "TRUNC")]
    Truncate,
    /// `v > t` → v, else 0
    #[serde(rename = "TOZERO")]
    ToZero,
    /// `v > t` → 0, else v
    #[serde(rename = "TOZERO_INV")]
    ToZeroInv,
}

impl ThresholdPolicy {
    pub const ALL: [ThresholdPolicy; 5] = [
        ThresholdPolicy::Binary,
        ThresholdPolicy::BinaryInv,
        ThresholdPolicy::Truncate,
        ThresholdPolicy::ToZero,
        ThresholdPolicy::ToZeroInv,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ThresholdPolicy::Binary => "BINARY",
            ThresholdPolicy::BinaryInv => "BINARY_INV",
            ThresholdPolicy::Truncate => "TRUNC",
            ThresholdPolicy::ToZero => "TOZERO",
            ThresholdPolicy::ToZeroInv => "TOZERO_INV",
        }
    }

    /// Position in [`ThresholdPolicy::ALL`], which is also its stored numeric value
    pub fn index(&self) -> usize {
        match self {
            ThresholdPolicy::Binary => 0,
            ThresholdPolicy::BinaryInv => 1,
            ThresholdPolicy::Truncate => 2,
            ThresholdPolicy::ToZero => 3,
            ThresholdPolicy::ToZeroInv => 4,
        }
    }

    /// Policy for an already corrected index; out-of-range falls back to Binary
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Next policy, wrapping around
    pub fn next(&self) -> Self {
        Self::from_index((self.index() + 1) % Self::ALL.len())
    }
}

impl fmt::Display for ThresholdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a tunable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamId {
    GradientThresholdLow,
    GradientThresholdHigh,
    DirectionalKernelSize,
    DirectionalScale,
    DirectionalOffset,
    BinarizeThreshold,
    BinarizePolicy,
    SmoothKernelSize,
    SmoothSpread,
}

impl ParamId {
    pub const COUNT: usize = 9;

    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::GradientThresholdLow,
        ParamId::GradientThresholdHigh,
        ParamId::DirectionalKernelSize,
        ParamId::DirectionalScale,
        ParamId::DirectionalOffset,
        ParamId::BinarizeThreshold,
        ParamId::BinarizePolicy,
        ParamId::SmoothKernelSize,
        ParamId::SmoothSpread,
    ];

    fn slot(&self) -> usize {
        *self as usize
    }

    /// Stable identifier used by configuration and UI bindings
    pub fn name(&self) -> &'static str {
        match self {
            ParamId::GradientThresholdLow => "gradientThresholdLow",
            ParamId::GradientThresholdHigh => "gradientThresholdHigh",
            ParamId::DirectionalKernelSize => "directionalKernelSize",
            ParamId::DirectionalScale => "directionalScale",
            ParamId::DirectionalOffset => "directionalOffset",
            ParamId::BinarizeThreshold => "binarizeThreshold",
            ParamId::BinarizePolicy => "binarizePolicy",
            ParamId::SmoothKernelSize => "smoothKernelSize",
            ParamId::SmoothSpread => "smoothSpread",
        }
    }

    /// Short label shown next to the value in the status line
    pub fn label(&self) -> &'static str {
        match self {
            ParamId::GradientThresholdLow => "Threshold1",
            ParamId::GradientThresholdHigh => "Threshold2",
            ParamId::DirectionalKernelSize | ParamId::SmoothKernelSize => "Kernel",
            ParamId::DirectionalScale => "Scale",
            ParamId::DirectionalOffset => "Delta",
            ParamId::BinarizeThreshold => "Threshold",
            ParamId::BinarizePolicy => "Type",
            ParamId::SmoothSpread => "Sigma",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ParamId::GradientThresholdLow => {
                "Lower hysteresis threshold: gradients above it extend edges connected to strong ones"
            }
            ParamId::GradientThresholdHigh => {
                "Upper hysteresis threshold: gradients above it always start an edge"
            }
            ParamId::DirectionalKernelSize => "Sobel aperture (odd, 1-7); larger is smoother",
            ParamId::DirectionalScale => "Multiplier applied to each directional derivative",
            ParamId::DirectionalOffset => "Value added to each directional derivative",
            ParamId::BinarizeThreshold => "Intensity compared against each pixel",
            ParamId::BinarizePolicy => "What happens to pixels above and below the threshold",
            ParamId::SmoothKernelSize => "Gaussian kernel size (odd, 1-31); larger blurs more",
            ParamId::SmoothSpread => "Gaussian sigma; 0 derives it from the kernel size",
        }
    }

    /// Declared range, kind and default
    pub fn spec(&self) -> ParamSpec {
        use ParamKind::*;
        let (min, max, default, kind) = match self {
            ParamId::GradientThresholdLow => (0.0, 255.0, 50.0, Integer { odd: false }),
            ParamId::GradientThresholdHigh => (0.0, 255.0, 150.0, Integer { odd: false }),
            ParamId::DirectionalKernelSize => (1.0, 7.0, 3.0, Integer { odd: true }),
            ParamId::DirectionalScale => (0.1, 5.0, 1.0, Real),
            ParamId::DirectionalOffset => (0.0, 100.0, 0.0, Integer { odd: false }),
            ParamId::BinarizeThreshold => (0.0, 255.0, 127.0, Integer { odd: false }),
            ParamId::BinarizePolicy => (0.0, 4.0, 0.0, Choice),
            ParamId::SmoothKernelSize => (1.0, 31.0, 5.0, Integer { odd: true }),
            ParamId::SmoothSpread => (0.0, 10.0, 0.0, Real),
        };
        ParamSpec {
            id: *self,
            min,
            max,
            default,
            kind,
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamId::ALL.into_iter().find(|p| p.name() == s).ok_or(())
    }
}

/// How raw input is corrected for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Floored to an integer, optionally forced odd
    Integer { odd: bool },
    /// Continuous value
    Real,
    /// Index into [`ThresholdPolicy::ALL`]
    Choice,
}

/// Row of the parameter table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub id: ParamId,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Apply the range clamp and, for kernels, the odd correction
    ///
    /// Returns `None` for NaN, which has no meaningful correction.
    pub fn correct(&self, raw: f64) -> Option<f64> {
        if raw.is_nan() {
            return None;
        }
        let corrected = match self.kind {
            ParamKind::Integer { odd: true } => {
                corrected_kernel(raw, self.min as i64, self.max as i64) as f64
            }
            ParamKind::Integer { odd: false } | ParamKind::Choice => {
                clamp_to_range(raw.floor(), self.min, self.max)
            }
            ParamKind::Real => clamp_to_range(raw, self.min, self.max),
        };
        Some(corrected)
    }

    /// Increment used by keyboard controls
    pub fn step(&self) -> f64 {
        match self.kind {
            ParamKind::Integer { odd: true } => 2.0,
            ParamKind::Integer { odd: false } | ParamKind::Choice => 1.0,
            ParamKind::Real => 0.1,
        }
    }

    pub fn is_odd_kernel(&self) -> bool {
        matches!(self.kind, ParamKind::Integer { odd: true })
    }

    fn to_value(&self, stored: f64) -> ParamValue {
        match self.kind {
            ParamKind::Integer { .. } => ParamValue::Integer(stored as i64),
            ParamKind::Real => ParamValue::Real(stored),
            ParamKind::Choice => ParamValue::Policy(ThresholdPolicy::from_index(stored as usize)),
        }
    }
}

/// Clamp into `[min, max]`; infinities land on the matching bound
pub fn clamp_to_range(value: f64, min: f64, max: f64) -> f64 {
    value.clamp(min, max)
}

/// Odd kernel correction
///
/// Floor to an integer; if even add one; clamp to `max`, then to `min`.
/// With odd bounds the result is always odd and the correction is idempotent.
pub fn corrected_kernel(raw: f64, min: i64, max: i64) -> u32 {
    // `as` saturates for out-of-range floats
    let mut v = raw.floor() as i64;
    if v.rem_euclid(2) == 0 {
        v = v.saturating_add(1);
    }
    if v > max {
        v = max;
    }
    if v < min {
        v = min;
    }
    v.max(0) as u32
}

/// Typed parameter value as seen by readers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Real(f64),
    Policy(ThresholdPolicy),
}

impl ParamValue {
    /// Numeric form (policies map to their index)
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Integer(v) => *v as f64,
            ParamValue::Real(v) => *v,
            ParamValue::Policy(p) => p.index() as f64,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{v}"),
            ParamValue::Real(v) => write!(f, "{v:.2}"),
            ParamValue::Policy(p) => write!(f, "{p}"),
        }
    }
}

/// Self-consistent copy of every parameter, read by the pipeline engine
///
/// Only [`ParameterStore::snapshot`] and [`Default`] produce one, so every
/// value a reader sees has already been corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    gradient_threshold_low: f32,
    gradient_threshold_high: f32,
    directional_kernel_size: u32,
    directional_scale: f32,
    directional_offset: f32,
    binarize_threshold: u8,
    binarize_policy: ThresholdPolicy,
    smooth_kernel_size: u32,
    smooth_spread: f32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        let mut values = [0.0; ParamId::COUNT];
        for id in ParamId::ALL {
            values[id.slot()] = id.spec().default;
        }
        Self::from_slots(&values)
    }
}

impl ParamSnapshot {
    fn from_slots(values: &[f64; ParamId::COUNT]) -> Self {
        let get = |id: ParamId| values[id.slot()];
        Self {
            gradient_threshold_low: get(ParamId::GradientThresholdLow) as f32,
            gradient_threshold_high: get(ParamId::GradientThresholdHigh) as f32,
            directional_kernel_size: get(ParamId::DirectionalKernelSize) as u32,
            directional_scale: get(ParamId::DirectionalScale) as f32,
            directional_offset: get(ParamId::DirectionalOffset) as f32,
            binarize_threshold: get(ParamId::BinarizeThreshold) as u8,
            binarize_policy: ThresholdPolicy::from_index(get(ParamId::BinarizePolicy) as usize),
            smooth_kernel_size: get(ParamId::SmoothKernelSize) as u32,
            smooth_spread: get(ParamId::SmoothSpread) as f32,
        }
    }

    pub fn gradient_threshold_low(&self) -> f32 {
        self.gradient_threshold_low
    }

    pub fn gradient_threshold_high(&self) -> f32 {
        self.gradient_threshold_high
    }

    /// Odd Sobel aperture in 1..=7
    pub fn directional_kernel_size(&self) -> u32 {
        self.directional_kernel_size
    }

    pub fn directional_scale(&self) -> f32 {
        self.directional_scale
    }

    pub fn directional_offset(&self) -> f32 {
        self.directional_offset
    }

    pub fn binarize_threshold(&self) -> u8 {
        self.binarize_threshold
    }

    pub fn binarize_policy(&self) -> ThresholdPolicy {
        self.binarize_policy
    }

    /// Odd Gaussian kernel size in 1..=31
    pub fn smooth_kernel_size(&self) -> u32 {
        self.smooth_kernel_size
    }

    /// Gaussian sigma; 0 means derive it from the kernel size
    pub fn smooth_spread(&self) -> f32 {
        self.smooth_spread
    }

    pub fn value(&self, id: ParamId) -> ParamValue {
        match id {
            ParamId::GradientThresholdLow => {
                ParamValue::Integer(self.gradient_threshold_low as i64)
            }
            ParamId::GradientThresholdHigh => {
                ParamValue::Integer(self.gradient_threshold_high as i64)
            }
            ParamId::DirectionalKernelSize => {
                ParamValue::Integer(self.directional_kernel_size as i64)
            }
            ParamId::DirectionalScale => ParamValue::Real(self.directional_scale as f64),
            ParamId::DirectionalOffset => ParamValue::Integer(self.directional_offset as i64),
            ParamId::BinarizeThreshold => ParamValue::Integer(self.binarize_threshold as i64),
            ParamId::BinarizePolicy => ParamValue::Policy(self.binarize_policy),
            ParamId::SmoothKernelSize => ParamValue::Integer(self.smooth_kernel_size as i64),
            ParamId::SmoothSpread => ParamValue::Real(self.smooth_spread as f64),
        }
    }

    /// Parameters the mode uses, with the values in effect
    pub fn in_effect(&self, mode: Mode) -> Vec<(ParamId, ParamValue)> {
        mode.parameters()
            .iter()
            .map(|&id| (id, self.value(id)))
            .collect()
    }
}

/// Holds the current value of each parameter declared by a variant
///
/// All access goes through one mutex, so a reader never observes a value
/// halfway through its correction.
#[derive(Debug)]
pub struct ParameterStore {
    variant: Variant,
    values: Mutex<[f64; ParamId::COUNT]>,
}

impl ParameterStore {
    /// Store initialised with the documented defaults
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            values: Mutex::new(Self::defaults()),
        }
    }

    fn defaults() -> [f64; ParamId::COUNT] {
        let mut values = [0.0; ParamId::COUNT];
        for id in ParamId::ALL {
            values[id.slot()] = id.spec().default;
        }
        values
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Resolve a parameter name against the variant's declared table
    pub fn resolve(&self, name: &str) -> Result<ParamId, PipelineError> {
        name.parse::<ParamId>()
            .ok()
            .filter(|id| self.variant.declares(*id))
            .ok_or_else(|| PipelineError::InvalidParameterName {
                name: name.to_string(),
                variant: self.variant,
            })
    }

    fn check_declared(&self, id: ParamId) -> Result<(), PipelineError> {
        if self.variant.declares(id) {
            Ok(())
        } else {
            Err(PipelineError::InvalidParameterName {
                name: id.name().to_string(),
                variant: self.variant,
            })
        }
    }

    /// Store `raw` after correction; returns the value now visible to readers
    pub fn set(&self, name: &str, raw: f64) -> Result<ParamValue, PipelineError> {
        let id = self.resolve(name)?;
        self.set_param(id, raw)
    }

    /// Current corrected value
    pub fn get(&self, name: &str) -> Result<ParamValue, PipelineError> {
        let id = self.resolve(name)?;
        self.get_param(id)
    }

    pub fn set_param(&self, id: ParamId, raw: f64) -> Result<ParamValue, PipelineError> {
        self.check_declared(id)?;
        let spec = id.spec();

        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        match spec.correct(raw) {
            Some(corrected) => {
                if corrected != raw {
                    debug!(param = %id, raw, corrected, "Parameter corrected");
                }
                values[id.slot()] = corrected;
            }
            None => {
                warn!(param = %id, "Ignoring NaN parameter value");
            }
        }
        Ok(spec.to_value(values[id.slot()]))
    }

    pub fn get_param(&self, id: ParamId) -> Result<ParamValue, PipelineError> {
        self.check_declared(id)?;
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(id.spec().to_value(values[id.slot()]))
    }

    /// Move a parameter by `steps` keyboard increments
    pub fn step(&self, id: ParamId, steps: i32) -> Result<ParamValue, PipelineError> {
        self.check_declared(id)?;
        let spec = id.spec();
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let raw = values[id.slot()] + spec.step() * steps as f64;
        // Step cannot produce NaN from a finite stored value
        if let Some(corrected) = spec.correct(raw) {
            values[id.slot()] = (corrected * 1e6).round() / 1e6;
        }
        Ok(spec.to_value(values[id.slot()]))
    }

    pub fn set_policy(&self, policy: ThresholdPolicy) -> Result<(), PipelineError> {
        self.set_param(ParamId::BinarizePolicy, policy.index() as f64)
            .map(|_| ())
    }

    /// Advance the threshold policy to the next one, wrapping around
    pub fn cycle_policy(&self) -> Result<ThresholdPolicy, PipelineError> {
        let next = self.snapshot().binarize_policy.next();
        self.set_policy(next)?;
        Ok(next)
    }

    /// Copy of every value taken under a single lock acquisition
    pub fn snapshot(&self) -> ParamSnapshot {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        ParamSnapshot::from_slots(&values)
    }

    /// Restore documented defaults
    pub fn reset(&self) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        *values = Self::defaults();
        debug!(variant = %self.variant, "Parameters reset to defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_serializes_under_display_name() {
        for policy in ThresholdPolicy::ALL {
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{}\"", policy.name()));
            assert_eq!(serde_json::from_str::<ThresholdPolicy>(&json).unwrap(), policy);
        }
    }

    #[test]
    fn test_kernel_correction_examples() {
        assert_eq!(corrected_kernel(7.0, 1, 7), 7);
        assert_eq!(corrected_kernel(30.0, 1, 31), 31);
        assert_eq!(corrected_kernel(8.0, 1, 7), 7);
        assert_eq!(corrected_kernel(0.0, 1, 7), 1);
        assert_eq!(corrected_kernel(-4.0, 1, 7), 1);
        assert_eq!(corrected_kernel(4.9, 1, 7), 5);
        assert_eq!(corrected_kernel(f64::INFINITY, 1, 31), 31);
        assert_eq!(corrected_kernel(f64::NEG_INFINITY, 1, 31), 1);
    }

    #[test]
    fn test_integer_parameters_are_floored() {
        let spec = ParamId::BinarizeThreshold.spec();
        assert_eq!(spec.correct(127.9), Some(127.0));
        assert_eq!(spec.correct(-0.5), Some(0.0));
        assert_eq!(spec.correct(f64::NAN), None);
    }

    #[test]
    fn test_real_parameters_keep_fraction() {
        let spec = ParamId::DirectionalScale.spec();
        assert_eq!(spec.correct(2.35), Some(2.35));
        assert_eq!(spec.correct(0.0), Some(0.1));
    }

    #[test]
    fn test_default_snapshot_matches_table() {
        let snapshot = ParamSnapshot::default();
        assert_eq!(snapshot.gradient_threshold_low, 50.0);
        assert_eq!(snapshot.gradient_threshold_high, 150.0);
        assert_eq!(snapshot.directional_kernel_size, 3);
        assert_eq!(snapshot.directional_scale, 1.0);
        assert_eq!(snapshot.directional_offset, 0.0);
        assert_eq!(snapshot.binarize_threshold, 127);
        assert_eq!(snapshot.binarize_policy, ThresholdPolicy::Binary);
        assert_eq!(snapshot.smooth_kernel_size, 5);
        assert_eq!(snapshot.smooth_spread, 0.0);
    }

    #[test]
    fn test_step_moves_kernels_by_two() {
        let store = ParameterStore::new(Variant::Filters);
        assert_eq!(
            store.step(ParamId::SmoothKernelSize, -1),
            Ok(ParamValue::Integer(3))
        );
        assert_eq!(
            store.step(ParamId::SmoothKernelSize, -5),
            Ok(ParamValue::Integer(1))
        );
        assert_eq!(
            store.step(ParamId::SmoothSpread, 3),
            Ok(ParamValue::Real(0.3))
        );
    }

    #[test]
    fn test_cycle_policy_wraps() {
        let store = ParameterStore::new(Variant::Filters);
        store.set_policy(ThresholdPolicy::ToZeroInv).unwrap();
        assert_eq!(store.cycle_policy(), Ok(ThresholdPolicy::Binary));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ParamValue::Real(1.0).to_string(), "1.00");
        assert_eq!(ParamValue::Integer(5).to_string(), "5");
        assert_eq!(
            ParamValue::Policy(ThresholdPolicy::ToZeroInv).to_string(),
            "TOZERO_INV"
        );
    }
}
