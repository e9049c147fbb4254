//! Label encoding and labeled datasets.
//!
//! Raw labels (letters, words, anything ordered) are replaced by their rank
//! in the sorted set of distinct labels, so the mapping depends only on the
//! label values and never on the order they appear in.

use nalgebra::DMatrix;

use crate::error::{PreprocessError, Result};

/// Column names used when none are given: a three-axis accelerometer.
pub const DEFAULT_COLUMNS: [&str; 3] = ["acc_x", "acc_y", "acc_z"];

/// Dense integer codes for a list of labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoding<T> {
    /// Distinct labels in sorted order; `classes[code]` is the raw label.
    pub classes: Vec<T>,
    /// One code per input label.
    pub codes: Vec<usize>,
}

impl<T: Ord> LabelEncoding<T> {
    /// Code of a raw label, if it was seen.
    pub fn code_of(&self, label: &T) -> Option<usize> {
        self.classes.binary_search(label).ok()
    }

    /// Raw label of a code.
    pub fn label_of(&self, code: usize) -> Option<&T> {
        self.classes.get(code)
    }
}

/// Replace each label with its 0-based rank among the sorted distinct
/// labels.
///
/// # Example
///
/// ```
/// use sensor_preprocess::encode_labels;
///
/// let enc = encode_labels(&["b", "a", "a", "c"]);
/// assert_eq!(enc.codes, vec![1, 0, 0, 2]);
/// assert_eq!(enc.classes, vec!["a", "b", "c"]);
/// ```
pub fn encode_labels<T: Ord + Clone>(labels: &[T]) -> LabelEncoding<T> {
    let mut classes = labels.to_vec();
    classes.sort();
    classes.dedup();
    let codes = labels
        .iter()
        .map(|l| classes.binary_search(l).unwrap_or_default())
        .collect();
    LabelEncoding { classes, codes }
}

/// Feature rows with named columns and an encoded target column `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset<T> {
    /// One name per feature column.
    pub columns: Vec<String>,
    /// Feature matrix, one row per instance.
    pub features: DMatrix<f64>,
    /// Encoded label of every row.
    pub y: Vec<usize>,
    /// Sorted distinct raw labels; `classes[y[i]]` is row `i`'s label.
    pub classes: Vec<T>,
}

impl<T: Ord + Clone> LabeledDataset<T> {
    /// Attach names and encoded labels to a feature matrix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if there is not one label per row, and
    /// `SchemaMismatch` if there is not one name per column.
    pub fn new<S: AsRef<str>>(features: DMatrix<f64>, labels: &[T], columns: &[S]) -> Result<Self> {
        if labels.len() != features.nrows() {
            return Err(PreprocessError::invalid_shape(format!(
                "{} labels for {} rows",
                labels.len(),
                features.nrows()
            )));
        }
        if columns.len() != features.ncols() {
            return Err(PreprocessError::schema_mismatch(format!(
                "{} column names for {} columns",
                columns.len(),
                features.ncols()
            )));
        }
        let encoding = encode_labels(labels);
        Ok(Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            features,
            y: encoding.codes,
            classes: encoding.classes,
        })
    }

    /// Attach labels to a three-column accelerometer matrix.
    ///
    /// # Errors
    ///
    /// Same as [`LabeledDataset::new`] with [`DEFAULT_COLUMNS`].
    pub fn with_default_columns(features: DMatrix<f64>, labels: &[T]) -> Result<Self> {
        Self::new(features, labels, &DEFAULT_COLUMNS)
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Feature rows as plain vectors, e.g. for serialization.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.features
            .row_iter()
            .map(|r| r.iter().copied().collect())
            .collect()
    }
}
