//! Configuration for the preprocessing pipeline.
//!
//! This module provides [`PipelineConfig`] which groups the parameters of
//! every stage: [`WindowParams`] for segmentation, [`FilterParams`] for the
//! Butterworth filter and the neighbor count for imputation. All of them are
//! serde-serializable so an experiment can keep its settings in a JSON file.
//!
//! # Example
//!
//! ```
//! use sensor_preprocess::{FilterType, PipelineConfig};
//!
//! // Defaults: 500-sample windows, hop 250, 5th order lowpass at 0.1
//! let config = PipelineConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let short = PipelineConfig::default()
//!     .with_window(64, 32)
//!     .with_filter(4, 0.2, FilterType::Lowpass);
//! assert_eq!(short.window.size, 64);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, Result};

/// Taper function attached to each window.
///
/// Coefficients are symmetric (the last sample mirrors the first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowFunction {
    /// Rectangular window, all ones.
    Boxcar,
    /// Hann window.
    #[default]
    Hann,
    /// Hamming window.
    Hamming,
    /// Blackman window.
    Blackman,
    /// Tukey window with a taper ratio of 0.5.
    Tukey,
}

/// Butterworth response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
}

impl FilterType {
    /// Whether this response needs a `[low, high]` frequency pair.
    #[must_use]
    pub const fn is_band(self) -> bool {
        matches!(self, Self::Bandpass | Self::Bandstop)
    }
}

/// Critical frequency, normalized so that 1.0 is the Nyquist frequency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriticalFrequency {
    /// Cutoff for lowpass and highpass filters.
    Single(f64),
    /// Ascending `[low, high]` edges for bandpass and bandstop filters.
    Band([f64; 2]),
}

impl From<f64> for CriticalFrequency {
    fn from(wn: f64) -> Self {
        Self::Single(wn)
    }
}

impl From<[f64; 2]> for CriticalFrequency {
    fn from(band: [f64; 2]) -> Self {
        Self::Band(band)
    }
}

/// Sliding window parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowParams {
    /// Window size in samples.
    pub size: usize,

    /// Hop length in samples: distance between consecutive window starts.
    /// Consecutive windows share `size - hop` samples.
    pub hop: usize,

    /// Taper function carried by every window.
    pub function: WindowFunction,

    /// Label windows by their center sample (`true`) or right edge (`false`).
    pub center: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            size: 500,
            hop: 250,
            function: WindowFunction::Hann,
            center: true,
        }
    }
}

impl WindowParams {
    /// Create window parameters with the default taper and centered labels.
    #[must_use]
    pub fn new(size: usize, hop: usize) -> Self {
        Self {
            size,
            hop,
            ..Self::default()
        }
    }

    /// Set the taper function.
    #[must_use]
    pub const fn with_function(mut self, function: WindowFunction) -> Self {
        self.function = function;
        self
    }

    /// Set label alignment.
    #[must_use]
    pub const fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Validate the window parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the size is zero or the hop length is
    /// outside `(0, size]`.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(PreprocessError::invalid_parameter(
                "window size must be positive",
            ));
        }
        if self.hop == 0 || self.hop > self.size {
            return Err(PreprocessError::invalid_parameter(format!(
                "hop length must be in (0, {}], got {}",
                self.size, self.hop
            )));
        }
        Ok(())
    }
}

/// Butterworth filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Filter order.
    pub order: usize,

    /// Critical frequency or frequency pair.
    pub wn: CriticalFrequency,

    /// Response type.
    pub filter_type: FilterType,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            order: 5,
            wn: CriticalFrequency::Single(0.1),
            filter_type: FilterType::Lowpass,
        }
    }
}

impl FilterParams {
    /// Create filter parameters.
    #[must_use]
    pub fn new(order: usize, wn: impl Into<CriticalFrequency>, filter_type: FilterType) -> Self {
        Self {
            order,
            wn: wn.into(),
            filter_type,
        }
    }

    /// Validate the filter parameters.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the order is zero, a frequency is
    /// outside `(0, 1)`, a band is not ascending, or the frequency shape
    /// does not match the filter type.
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 {
            return Err(PreprocessError::invalid_parameter(
                "filter order must be positive",
            ));
        }

        let in_range = |w: f64| w > 0.0 && w < 1.0;
        match (self.wn, self.filter_type.is_band()) {
            (CriticalFrequency::Single(w), false) => {
                if !in_range(w) {
                    return Err(PreprocessError::invalid_parameter(format!(
                        "critical frequency must be in (0, 1), got {w}"
                    )));
                }
            }
            (CriticalFrequency::Band([low, high]), true) => {
                if !in_range(low) || !in_range(high) {
                    return Err(PreprocessError::invalid_parameter(format!(
                        "band edges must be in (0, 1), got [{low}, {high}]"
                    )));
                }
                if low >= high {
                    return Err(PreprocessError::invalid_parameter(format!(
                        "band edges must be ascending, got [{low}, {high}]"
                    )));
                }
            }
            (CriticalFrequency::Single(_), true) => {
                return Err(PreprocessError::invalid_parameter(format!(
                    "{:?} filter needs a [low, high] frequency pair",
                    self.filter_type
                )));
            }
            (CriticalFrequency::Band(_), false) => {
                return Err(PreprocessError::invalid_parameter(format!(
                    "{:?} filter needs a single critical frequency",
                    self.filter_type
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the whole preprocessing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Segmentation parameters.
    pub window: WindowParams,

    /// Per-window filter parameters.
    pub filter: FilterParams,

    /// Neighbor count for tensor imputation.
    #[serde(default = "default_neighbors")]
    pub n_neighbors: usize,
}

const fn default_neighbors() -> usize {
    crate::impute::DEFAULT_NEIGHBORS
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: WindowParams::default(),
            filter: FilterParams::default(),
            n_neighbors: default_neighbors(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every stage, imputation included.
    ///
    /// Each stage also checks its own parameters when it runs, so windowing
    /// and filtering never fail on an imputation setting.
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidParameter` found.
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.filter.validate()?;
        crate::impute::KnnImputer::from_config(self)?;
        Ok(())
    }

    /// Set window size and hop length.
    #[must_use]
    pub fn with_window(mut self, size: usize, hop: usize) -> Self {
        self.window.size = size;
        self.window.hop = hop;
        self
    }

    /// Set the taper function.
    #[must_use]
    pub const fn with_window_function(mut self, function: WindowFunction) -> Self {
        self.window.function = function;
        self
    }

    /// Set label alignment.
    #[must_use]
    pub const fn with_center(mut self, center: bool) -> Self {
        self.window.center = center;
        self
    }

    /// Set order, critical frequency and type of the filter.
    #[must_use]
    pub fn with_filter(
        mut self,
        order: usize,
        wn: impl Into<CriticalFrequency>,
        filter_type: FilterType,
    ) -> Self {
        self.filter = FilterParams::new(order, wn, filter_type);
        self
    }

    /// Set the imputation neighbor count.
    #[must_use]
    pub const fn with_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.size, 500);
        assert_eq!(config.window.hop, 250);
        assert_eq!(config.window.function, WindowFunction::Hann);
        assert!(config.window.center);
        assert_eq!(config.filter.order, 5);
        assert_eq!(config.filter.wn, CriticalFrequency::Single(0.1));
        assert_eq!(config.n_neighbors, 5);
    }

    #[test]
    fn test_window_validation() {
        assert!(WindowParams::new(4, 2).validate().is_ok());
        assert!(WindowParams::new(4, 4).validate().is_ok());
        assert!(WindowParams::new(4, 0).validate().is_err());
        assert!(WindowParams::new(4, 5).validate().is_err());
        assert!(WindowParams::new(0, 0).validate().is_err());
    }

    #[test]
    fn test_filter_validation() {
        assert!(FilterParams::new(5, 0.1, FilterType::Lowpass).validate().is_ok());
        assert!(FilterParams::new(3, [0.1, 0.4], FilterType::Bandpass)
            .validate()
            .is_ok());

        assert!(FilterParams::new(0, 0.1, FilterType::Lowpass).validate().is_err());
        assert!(FilterParams::new(5, 1.0, FilterType::Highpass).validate().is_err());
        assert!(FilterParams::new(5, 0.0, FilterType::Lowpass).validate().is_err());
        assert!(FilterParams::new(5, [0.4, 0.1], FilterType::Bandstop)
            .validate()
            .is_err());
        assert!(FilterParams::new(5, 0.1, FilterType::Bandpass).validate().is_err());
        assert!(FilterParams::new(5, [0.1, 0.4], FilterType::Lowpass)
            .validate()
            .is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_window(64, 16)
            .with_window_function(WindowFunction::Tukey)
            .with_center(false)
            .with_filter(4, [0.05, 0.3], FilterType::Bandpass)
            .with_neighbors(3);
        assert!(config.validate().is_ok());
        assert_eq!(config.window.hop, 16);
        assert_eq!(config.window.function, WindowFunction::Tukey);
        assert_eq!(config.filter.wn, CriticalFrequency::Band([0.05, 0.3]));
        assert_eq!(config.n_neighbors, 3);

        assert!(PipelineConfig::new().with_neighbors(0).validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let json = r#"{
            "window": {"size": 100, "hop": 50, "function": "hamming", "center": false},
            "filter": {"order": 3, "wn": [0.1, 0.3], "filter_type": "bandstop"}
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.window.function, WindowFunction::Hamming);
        assert_eq!(config.filter.filter_type, FilterType::Bandstop);
        assert_eq!(config.filter.wn, CriticalFrequency::Band([0.1, 0.3]));
        assert_eq!(config.n_neighbors, 5);

        let back: PipelineConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(back, config);
    }
}
