//! Zero-phase Butterworth filtering of signals, tables and windows.
//!
//! The filter is designed once per call from [`FilterParams`] and applied to
//! every column independently with forward-backward filtering, so the output
//! keeps the exact shape of the input and has no phase shift.

use crate::config::FilterParams;
use crate::error::Result;
use crate::math::butterworth::butter;
use crate::table::SensorTable;
use crate::windowing::Window;

/// Filter one channel.
///
/// # Errors
///
/// Returns `InvalidParameter` if the filter parameters are invalid.
///
/// # Example
///
/// ```
/// use sensor_preprocess::{apply_filter, FilterParams, FilterType};
///
/// let params = FilterParams::new(5, 0.1, FilterType::Lowpass);
/// let filtered = apply_filter(&[0.0; 32], &params)?;
/// assert_eq!(filtered, vec![0.0; 32]);
/// # Ok::<(), sensor_preprocess::PreprocessError>(())
/// ```
pub fn apply_filter(signal: &[f64], params: &FilterParams) -> Result<Vec<f64>> {
    let sos = butter(params)?;
    sos.filtfilt(signal)
}

/// Filter every column of a table.
///
/// # Errors
///
/// Returns `InvalidParameter` if the filter parameters are invalid.
pub fn filter_table(table: &SensorTable, params: &FilterParams) -> Result<SensorTable> {
    let sos = butter(params)?;
    table.try_map_columns(|col| sos.filtfilt(col))
}

/// Filter every column of every window, keeping window metadata and order.
///
/// # Errors
///
/// Returns `InvalidParameter` if the filter parameters are invalid. The
/// parameters are checked before any window is touched.
pub fn filter_instances(windows: &[Window], params: &FilterParams) -> Result<Vec<Window>> {
    let sos = butter(params)?;
    let filtered = windows
        .iter()
        .map(|w| -> Result<Window> {
            Ok(w.with_data(w.data.try_map_columns(|col| sos.filtfilt(col))?))
        })
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(instances = filtered.len(), "filtered instances");
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterType, WindowParams};
    use crate::error::PreprocessError;
    use crate::windowing::sliding_window;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn noisy_table(n: usize) -> SensorTable {
        SensorTable::from_columns(vec![
            (
                "acc_x",
                (0..n)
                    .map(|i| {
                        let t = i as f64;
                        (2.0 * PI * 0.01 * t).sin() + 0.3 * (2.0 * PI * 0.45 * t).sin()
                    })
                    .collect(),
            ),
            ("acc_y", vec![1.0; n]),
            ("acc_z", vec![0.0; n]),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_preserves_shape() {
        let table = noisy_table(120);
        let params = FilterParams::new(5, 0.1, FilterType::Lowpass);
        let out = filter_table(&table, &params).unwrap();
        assert_eq!(out.shape(), table.shape());
        assert_eq!(out.names(), table.names());
    }

    #[test]
    fn test_columns_filtered_independently() {
        let table = noisy_table(120);
        let params = FilterParams::new(5, 0.1, FilterType::Lowpass);
        let out = filter_table(&table, &params).unwrap();

        for &v in out.column("acc_y").unwrap() {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-9);
        }
        assert!(out.column("acc_z").unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_lowpass_removes_high_frequency() {
        let table = noisy_table(600);
        let params = FilterParams::new(5, 0.1, FilterType::Lowpass);
        let out = filter_table(&table, &params).unwrap();
        let x = out.column("acc_x").unwrap();
        for (i, &v) in x.iter().enumerate().take(450).skip(150) {
            let slow = (2.0 * PI * 0.01 * i as f64).sin();
            assert_abs_diff_eq!(v, slow, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_filter_instances_keeps_metadata() {
        let table = noisy_table(100);
        let windows = sliding_window(&table, &WindowParams::new(20, 10)).unwrap();
        let params = FilterParams::new(3, [0.05, 0.3], FilterType::Bandpass);
        let filtered = filter_instances(&windows, &params).unwrap();

        assert_eq!(filtered.len(), windows.len());
        for (f, w) in filtered.iter().zip(&windows) {
            assert_eq!(f.start, w.start);
            assert_eq!(f.label, w.label);
            assert_eq!(f.data.shape(), w.data.shape());
        }
    }

    #[test]
    fn test_invalid_parameters_fail_eagerly() {
        let params = FilterParams::new(5, 0.1, FilterType::Bandpass);
        assert!(matches!(
            apply_filter(&[1.0, 2.0], &params),
            Err(PreprocessError::InvalidParameter(_))
        ));
        assert!(matches!(
            filter_instances(&[], &params),
            Err(PreprocessError::InvalidParameter(_))
        ));
    }
}
