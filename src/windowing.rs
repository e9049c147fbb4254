//! Sliding window segmentation.
//!
//! [`sliding_window`] cuts a [`SensorTable`] into fixed-length, possibly
//! overlapping windows. Windows follow rolling-window bounds: candidate
//! positions `i = 0, hop, 2*hop, ...` label a window that ends right after
//! `i` (or `(size - 1) / 2` samples after it when centered). Only complete
//! windows are kept.
//!
//! The taper function is carried as metadata and is not applied to the
//! samples; [`Window::tapered`] applies it on request.

use std::f64::consts::PI;

use crate::config::{WindowFunction, WindowParams};
use crate::error::Result;
use crate::table::SensorTable;

/// One complete segment of a recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Row of the first sample in the source table.
    pub start: usize,

    /// Row this window is labeled with: its center when centered,
    /// otherwise its last sample.
    pub label: usize,

    /// Taper function associated with the window.
    pub function: WindowFunction,

    /// The samples, `size` rows by the source's columns.
    pub data: SensorTable,
}

impl Window {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.n_rows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// One past the last source row.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len()
    }

    /// Copy of the samples multiplied by the taper coefficients.
    #[must_use]
    pub fn tapered(&self) -> SensorTable {
        let taper = window_coefficients(self.len(), self.function);
        self.data
            .map_columns(|col| col.iter().zip(&taper).map(|(v, w)| v * w).collect())
    }

    /// Same window with its samples replaced by `data`.
    #[must_use]
    pub fn with_data(&self, data: SensorTable) -> Self {
        Self {
            start: self.start,
            label: self.label,
            function: self.function,
            data,
        }
    }
}

/// Generate symmetric window function coefficients.
#[must_use]
pub fn window_coefficients(n: usize, function: WindowFunction) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    let denom = (n - 1) as f64;
    let cosine_sum = |a: &[f64]| -> Vec<f64> {
        (0..n)
            .map(|i| {
                let phase = 2.0 * PI * i as f64 / denom;
                a.iter()
                    .enumerate()
                    .map(|(k, &ak)| {
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * ak * (k as f64 * phase).cos()
                    })
                    .sum()
            })
            .collect()
    };

    match function {
        WindowFunction::Boxcar => vec![1.0; n],
        WindowFunction::Hann => cosine_sum(&[0.5, 0.5]),
        WindowFunction::Hamming => cosine_sum(&[0.54, 0.46]),
        WindowFunction::Blackman => cosine_sum(&[0.42, 0.5, 0.08]),
        WindowFunction::Tukey => {
            let alpha = 0.5; // Taper ratio
            (0..n)
                .map(|i| {
                    let t = i as f64 / denom;
                    if t < alpha / 2.0 {
                        0.5 * (1.0 + (2.0 * PI * t / alpha - PI).cos())
                    } else if t > 1.0 - alpha / 2.0 {
                        0.5 * (1.0 + (2.0 * PI * (t - 1.0) / alpha + PI).cos())
                    } else {
                        1.0
                    }
                })
                .collect()
        }
    }
}

/// Split a table into complete, overlapping windows.
///
/// A window is kept only if it lies fully inside the table and its first
/// column has `size` non-missing samples. Windows come out in increasing
/// start order.
///
/// # Errors
///
/// Returns `InvalidParameter` if the size is zero or the hop length is not
/// in `(0, size]`.
///
/// # Example
///
/// ```
/// use sensor_preprocess::{sliding_window, SensorTable, WindowParams};
///
/// let table = SensorTable::from_columns(vec![("x", (0..10).map(f64::from).collect())])?;
/// let windows = sliding_window(&table, &WindowParams::new(4, 2))?;
///
/// let starts: Vec<usize> = windows.iter().map(|w| w.start).collect();
/// assert_eq!(starts, vec![0, 2, 4, 6]);
/// # Ok::<(), sensor_preprocess::PreprocessError>(())
/// ```
pub fn sliding_window(table: &SensorTable, params: &WindowParams) -> Result<Vec<Window>> {
    params.validate()?;

    let n = table.n_rows();
    let size = params.size;
    let offset = if params.center { (size - 1) / 2 } else { 0 };

    let mut windows = Vec::new();
    for (counter, label) in (0..n).step_by(params.hop).enumerate() {
        let end = label + 1 + offset;
        if end < size || end > n {
            continue;
        }
        let start = end - size;

        let valid = table
            .column_at(0)
            .map_or(0, |c| c[start..end].iter().filter(|v| !v.is_nan()).count());
        if valid < size {
            tracing::debug!(window = counter, valid, "dropping incomplete window");
            continue;
        }

        tracing::debug!(window = counter, start, samples = valid, "window");
        windows.push(Window {
            start,
            label,
            function: params.function,
            data: table.slice_rows(start..end),
        });
    }

    tracing::info!(windows = windows.len(), rows = n, size, hop = params.hop, "segmented recording");
    Ok(windows)
}
