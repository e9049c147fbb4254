//! End-to-end preprocessing: windowing, filtering, flattening and labeling.

use nalgebra::DMatrix;

use crate::config::PipelineConfig;
use crate::error::{PreprocessError, Result};
use crate::filtering::filter_instances;
use crate::flatten::{flatten_instances, flattened_names};
use crate::labels::LabeledDataset;
use crate::table::SensorTable;
use crate::windowing::sliding_window;

/// Turn one recording into feature rows, one per window.
///
/// The result always has `window.size * columns` columns, even when the
/// recording is too short for a single window.
///
/// # Errors
///
/// Returns `InvalidParameter` if the window or filter parameters are
/// invalid. The imputation setting is not consulted.
///
/// # Example
///
/// ```
/// use sensor_preprocess::{preprocess_recording, PipelineConfig, SensorTable};
///
/// let table = SensorTable::from_columns(vec![
///     ("acc_x", vec![0.5; 40]),
///     ("acc_y", vec![-0.5; 40]),
/// ])?;
/// let config = PipelineConfig::new().with_window(10, 5);
/// let rows = preprocess_recording(&table, &config)?;
/// assert_eq!(rows.ncols(), 20);
/// # Ok::<(), sensor_preprocess::PreprocessError>(())
/// ```
pub fn preprocess_recording(table: &SensorTable, config: &PipelineConfig) -> Result<DMatrix<f64>> {
    config.window.validate()?;
    config.filter.validate()?;
    let windows = sliding_window(table, &config.window)?;
    let filtered = filter_instances(&windows, &config.filter)?;
    if filtered.is_empty() {
        return Ok(DMatrix::zeros(0, config.window.size * table.n_cols()));
    }
    flatten_instances(&filtered)
}

/// Preprocess labeled recordings into one dataset.
///
/// Every window inherits the label of its recording. Rows keep recording
/// order, then window order.
///
/// # Errors
///
/// Returns `InvalidParameter` if the window or filter parameters are
/// invalid, and `SchemaMismatch` if the recordings do not share the same
/// columns.
pub fn build_labeled_dataset<L: Ord + Clone>(
    recordings: &[(L, SensorTable)],
    config: &PipelineConfig,
) -> Result<LabeledDataset<L>> {
    config.window.validate()?;
    config.filter.validate()?;
    let Some((_, reference)) = recordings.first() else {
        return LabeledDataset::new(DMatrix::zeros(0, 0), &[], &[] as &[&str]);
    };
    let names = reference.names();
    let width = config.window.size * names.len();

    let mut values = Vec::new();
    let mut labels = Vec::new();
    for (i, (label, table)) in recordings.iter().enumerate() {
        if table.names() != names {
            return Err(PreprocessError::schema_mismatch(format!(
                "recording {i} has columns {:?}, expected {names:?}",
                table.names()
            )));
        }
        let rows = preprocess_recording(table, config)?;
        tracing::debug!(recording = i, windows = rows.nrows(), "preprocessed recording");
        for row in rows.row_iter() {
            values.extend(row.iter().copied());
            labels.push(label.clone());
        }
    }

    let features = DMatrix::from_row_slice(labels.len(), width, &values);
    let dataset = LabeledDataset::new(
        features,
        &labels,
        &flattened_names(names, config.window.size),
    )?;
    tracing::info!(
        recordings = recordings.len(),
        instances = dataset.len(),
        classes = dataset.n_classes(),
        "built labeled dataset"
    );
    Ok(dataset)
}
