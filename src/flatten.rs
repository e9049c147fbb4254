//! Flattening windows into feature rows.
//!
//! Each window becomes one row. Values are serialized row-major: all columns
//! of sample 0, then all columns of sample 1, and so on, so feature
//! `t * M + m` is column `m` at sample `t`.

use nalgebra::DMatrix;

use crate::error::{PreprocessError, Result};
use crate::windowing::Window;

/// Stack windows into a `(windows, size * columns)` matrix.
///
/// Row order follows window order. An empty slice gives a 0 x 0 matrix.
///
/// # Errors
///
/// Returns `InvalidShape` if the windows do not all have the same shape.
pub fn flatten_instances(windows: &[Window]) -> Result<DMatrix<f64>> {
    let Some(first) = windows.first() else {
        return Ok(DMatrix::zeros(0, 0));
    };
    let shape = first.data.shape();
    let width = shape.0 * shape.1;

    let mut values = Vec::with_capacity(windows.len() * width);
    for (i, w) in windows.iter().enumerate() {
        if w.data.shape() != shape {
            return Err(PreprocessError::invalid_shape(format!(
                "window {i} has shape {:?}, expected {shape:?}",
                w.data.shape()
            )));
        }
        values.extend(w.data.to_row_major());
    }
    Ok(DMatrix::from_row_slice(windows.len(), width, &values))
}

/// Names of the flattened features, `"{column}_{t}"` in serialization order.
#[must_use]
pub fn flattened_names<S: AsRef<str>>(columns: &[S], size: usize) -> Vec<String> {
    (0..size)
        .flat_map(|t| columns.iter().map(move |c| format!("{}_{t}", c.as_ref())))
        .collect()
}
