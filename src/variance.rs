//! Explained-variance analysis of feature matrices.
//!
//! This module computes how variance is distributed across the columns of a
//! flattened feature matrix, and how many leading columns are needed to reach
//! a given fraction of the total.

use nalgebra::DMatrix;

use crate::error::{PreprocessError, Result};

/// Variance distribution of a feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainedVariance {
    /// Population variance of each column.
    pub variances: Vec<f64>,

    /// Share of the total variance per column.
    pub ratio: Vec<f64>,

    /// Running sum of `ratio`.
    pub cumulative: Vec<f64>,

    /// Smallest number of leading columns whose cumulative ratio reaches the
    /// requested fraction.
    pub n_components: usize,
}

/// Analyze the variance distribution across the columns of `x`.
///
/// # Arguments
///
/// * `x` - Feature matrix, one row per instance
/// * `alpha` - Fraction of the total variance to reach, in `(0, 1]`
///
/// If no prefix reaches `alpha` (rounding can keep the cumulative ratio just
/// below 1), every column is counted rather than reporting a single
/// component as a first-match search over the ratios would. A matrix with
/// zero total variance gets all-zero ratios.
///
/// # Errors
///
/// Returns `InvalidParameter` if `alpha` is outside `(0, 1]`.
pub fn explained_variance(x: &DMatrix<f64>, alpha: f64) -> Result<ExplainedVariance> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(PreprocessError::invalid_parameter(format!(
            "alpha must be in (0, 1], got {alpha}"
        )));
    }

    let n = x.nrows();
    let variances: Vec<f64> = x
        .column_iter()
        .map(|col| {
            if n == 0 {
                return 0.0;
            }
            let mean = col.sum() / n as f64;
            col.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64
        })
        .collect();

    let total: f64 = variances.iter().sum();
    let ratio: Vec<f64> = if total > 0.0 {
        variances.iter().map(|v| v / total).collect()
    } else {
        vec![0.0; variances.len()]
    };

    let cumulative: Vec<f64> = ratio
        .iter()
        .scan(0.0, |acc, r| {
            *acc += r;
            Some(*acc)
        })
        .collect();

    let n_components = cumulative
        .iter()
        .position(|&c| c >= alpha)
        .map_or(variances.len(), |i| i + 1);

    tracing::debug!(columns = variances.len(), n_components, alpha, "explained variance");

    Ok(ExplainedVariance {
        variances,
        ratio,
        cumulative,
        n_components,
    })
}
