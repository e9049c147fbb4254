//! Nearest-neighbor imputation of missing values in sensor tensors.
//!
//! A [`SensorTensor`] is an `instances x timesteps x channels` array stored
//! row-major. For imputation every instance is flattened into one row of
//! `timesteps * channels` features. A missing feature is filled from the
//! `k` nearest rows that have it, nearest by NaN-aware Euclidean distance:
//!
//! ```text
//! d(a, b) = sqrt(F / present * sum((a_i - b_i)^2 for i present in both))
//! ```
//!
//! A donor at distance `d` weighs `1 / d^2` when `d` is an exact multiple of
//! the channel count and nothing otherwise. Distances and donor values always
//! come from the input, never from values imputed earlier in the same call.

use crate::config::PipelineConfig;
use crate::error::{PreprocessError, Result};

/// Neighbors consulted per missing value.
pub const DEFAULT_NEIGHBORS: usize = 5;

/// A dense 3-dimensional array that may contain `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorTensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl SensorTensor {
    /// Wrap row-major data with the given shape.
    ///
    /// Any number of dimensions is accepted here; imputation requires 3.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the shape does not cover the data exactly.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(PreprocessError::invalid_shape(format!(
                "shape {shape:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build an `instances x timesteps x channels` tensor from nested rows.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the nesting is ragged.
    pub fn from_nested(instances: &[Vec<Vec<f64>>]) -> Result<Self> {
        let timesteps = instances.first().map_or(0, Vec::len);
        let channels = instances
            .first()
            .and_then(|i| i.first())
            .map_or(0, Vec::len);
        let mut data = Vec::with_capacity(instances.len() * timesteps * channels);
        for (i, inst) in instances.iter().enumerate() {
            if inst.len() != timesteps || inst.iter().any(|s| s.len() != channels) {
                return Err(PreprocessError::invalid_shape(format!(
                    "instance {i} is not {timesteps} x {channels}"
                )));
            }
            data.extend(inst.iter().flatten());
        }
        Self::new(vec![instances.len(), timesteps, channels], data)
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Row-major values.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Value at a 3-dimensional index.
    #[must_use]
    pub fn get(&self, instance: usize, timestep: usize, channel: usize) -> Option<f64> {
        let [_, t, c] = self.dims3().ok()?;
        if timestep >= t || channel >= c {
            return None;
        }
        self.data.get((instance * t + timestep) * c + channel).copied()
    }

    /// Number of `NaN` entries.
    #[must_use]
    pub fn count_missing(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }

    fn dims3(&self) -> Result<[usize; 3]> {
        match self.shape[..] {
            [n, t, c] => Ok([n, t, c]),
            _ => Err(PreprocessError::invalid_shape(format!(
                "expected an instances x timesteps x channels tensor, got shape {:?}",
                self.shape
            ))),
        }
    }
}

/// KNN imputer with channel-periodic inverse-square weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnnImputer {
    n_neighbors: usize,
}

impl Default for KnnImputer {
    fn default() -> Self {
        Self {
            n_neighbors: DEFAULT_NEIGHBORS,
        }
    }
}

impl KnnImputer {
    /// Create an imputer consulting `n_neighbors` donors per missing value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `n_neighbors` is zero.
    pub fn new(n_neighbors: usize) -> Result<Self> {
        if n_neighbors == 0 {
            return Err(PreprocessError::invalid_parameter(
                "n_neighbors must be at least 1",
            ));
        }
        Ok(Self { n_neighbors })
    }

    /// Create an imputer from the `n_neighbors` setting of a pipeline
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `n_neighbors` is zero.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(config.n_neighbors)
    }

    #[must_use]
    pub const fn n_neighbors(&self) -> usize {
        self.n_neighbors
    }

    /// Fill every `NaN` of a 3-dimensional tensor.
    ///
    /// Cases the weighting leaves open are resolved as follows:
    /// - donors at distance 0 dominate: their plain mean is used;
    /// - if every selected weight is 0, the plain mean of the selected
    ///   donors is used;
    /// - if no donor shares a present feature with the row, the mean of the
    ///   feature over all rows is used;
    /// - a feature missing in every row is filled with 0.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` unless the tensor has exactly 3 dimensions.
    pub fn impute(&self, tensor: &SensorTensor) -> Result<SensorTensor> {
        let [n, t, c] = tensor.dims3()?;
        let width = t * c;
        let missing = tensor.count_missing();
        if missing == 0 || width == 0 {
            return Ok(tensor.clone());
        }

        let rows: Vec<&[f64]> = tensor.data.chunks(width).collect();
        let mut out = tensor.data.clone();

        let feature_means: Vec<Option<f64>> = (0..width)
            .map(|f| {
                let present: Vec<f64> = rows.iter().map(|r| r[f]).filter(|v| !v.is_nan()).collect();
                (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64)
            })
            .collect();
        let empty = feature_means.iter().filter(|m| m.is_none()).count();
        if empty > 0 {
            tracing::warn!(features = empty, "features missing in every instance, filling with 0");
        }

        for (r, row) in rows.iter().enumerate() {
            if !row.iter().any(|v| v.is_nan()) {
                continue;
            }
            let distances: Vec<f64> = rows.iter().map(|other| nan_euclidean(row, other)).collect();

            for f in (0..width).filter(|&f| row[f].is_nan()) {
                let value = match feature_means[f] {
                    None => 0.0,
                    Some(mean) => self
                        .donor_average(&rows, &distances, f, c)
                        .unwrap_or(mean),
                };
                out[r * width + f] = value;
            }
        }

        tracing::debug!(
            instances = n,
            features = width,
            imputed = missing,
            neighbors = self.n_neighbors,
            "imputed missing values"
        );
        SensorTensor::new(tensor.shape.clone(), out)
    }

    /// Weighted value of feature `f` over the nearest donors, or `None` when
    /// no donor has a defined distance.
    fn donor_average(&self, rows: &[&[f64]], distances: &[f64], f: usize, channels: usize) -> Option<f64> {
        let mut donors: Vec<(usize, f64)> = rows
            .iter()
            .enumerate()
            .filter(|(j, other)| !other[f].is_nan() && !distances[*j].is_nan())
            .map(|(j, _)| (j, distances[j]))
            .collect();
        if donors.is_empty() {
            return None;
        }
        // Stable: equal distances keep row order
        donors.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        donors.truncate(self.n_neighbors);

        let mean_of = |set: &[(usize, f64)]| {
            set.iter().map(|&(j, _)| rows[j][f]).sum::<f64>() / set.len() as f64
        };

        let exact: Vec<(usize, f64)> = donors.iter().copied().filter(|&(_, d)| d == 0.0).collect();
        if !exact.is_empty() {
            return Some(mean_of(&exact));
        }

        let weights: Vec<f64> = donors
            .iter()
            .map(|&(_, d)| channel_weight(d, channels))
            .collect();
        let total: f64 = weights.iter().sum();
        if total > 0.0 {
            let weighted: f64 = donors
                .iter()
                .zip(&weights)
                .map(|(&(j, _), w)| rows[j][f] * w)
                .sum();
            Some(weighted / total)
        } else {
            Some(mean_of(&donors))
        }
    }
}

/// `1 / d^2` when `d` is a multiple of the channel count, else 0.
fn channel_weight(distance: f64, channels: usize) -> f64 {
    if distance % channels as f64 == 0.0 {
        1.0 / (distance * distance)
    } else {
        0.0
    }
}

/// Euclidean distance over the coordinates present in both rows, scaled up
/// to the full width. `NaN` when no coordinate is shared.
fn nan_euclidean(a: &[f64], b: &[f64]) -> f64 {
    let mut present = 0usize;
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        if !x.is_nan() && !y.is_nan() {
            present += 1;
            sum += (x - y) * (x - y);
        }
    }
    if present == 0 {
        return f64::NAN;
    }
    (a.len() as f64 / present as f64 * sum).sqrt()
}

/// Fill missing values with [`DEFAULT_NEIGHBORS`] neighbors.
///
/// # Errors
///
/// Returns `InvalidShape` unless the tensor has exactly 3 dimensions.
///
/// # Example
///
/// ```
/// use sensor_preprocess::{impute_nan, SensorTensor};
///
/// let tensor = SensorTensor::new(vec![3, 2, 1], vec![1.0, 2.0, 1.0, 4.0, 1.0, f64::NAN])?;
/// let filled = impute_nan(&tensor)?;
/// assert_eq!(filled.get(2, 1, 0), Some(3.0));
/// # Ok::<(), sensor_preprocess::PreprocessError>(())
/// ```
pub fn impute_nan(tensor: &SensorTensor) -> Result<SensorTensor> {
    KnnImputer::default().impute(tensor)
}

/// Fill missing values with the neighbor count of `config`.
///
/// # Errors
///
/// Returns `InvalidParameter` if `config.n_neighbors` is zero, and
/// `InvalidShape` unless the tensor has exactly 3 dimensions.
pub fn impute_with(tensor: &SensorTensor, config: &PipelineConfig) -> Result<SensorTensor> {
    KnnImputer::from_config(config)?.impute(tensor)
}
