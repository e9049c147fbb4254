//! Named-column sensor tables.
//!
//! A [`SensorTable`] holds one recording: equal-length `f64` columns in
//! chronological order, missing samples stored as `NaN`. Every operation
//! returns a new table and keeps row order.

use std::ops::Range;

use crate::error::{PreprocessError, Result};

/// A multi-axis time series with named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SensorTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl SensorTable {
    /// Build a table from column names and column data.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the name and column counts differ or the
    /// columns have unequal lengths.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(PreprocessError::invalid_shape(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            if let Some((i, col)) = columns
                .iter()
                .enumerate()
                .find(|(_, c)| c.len() != first.len())
            {
                return Err(PreprocessError::invalid_shape(format!(
                    "column {:?} has {} rows, expected {}",
                    names[i],
                    col.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { names, columns })
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the columns have unequal lengths.
    pub fn from_columns<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self> {
        let (names, data): (Vec<String>, Vec<Vec<f64>>) =
            columns.into_iter().map(|(n, c)| (n.into(), c)).unzip();
        Self::new(names, data)
    }

    /// Build a table from row-major samples.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if a row does not have one value per name.
    pub fn from_rows<S: Into<String>>(names: Vec<S>, rows: &[Vec<f64>]) -> Result<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns = vec![Vec::with_capacity(rows.len()); names.len()];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != names.len() {
                return Err(PreprocessError::invalid_shape(format!(
                    "row {r} has {} values, expected {}",
                    row.len(),
                    names.len()
                )));
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.push(v);
            }
        }
        Ok(Self { names, columns })
    }

    /// Number of samples.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Column by position.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<&[f64]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    /// First column with the given name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|i| self.column_at(i))
    }

    /// Value at `(row, column)`.
    #[must_use]
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.columns.get(col).and_then(|c| c.get(row)).copied()
    }

    /// Copy of the rows in `range`, clamped to the table length.
    #[must_use]
    pub fn slice_rows(&self, range: Range<usize>) -> Self {
        let n = self.n_rows();
        let start = range.start.min(n);
        let end = range.end.min(n).max(start);
        Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[start..end].to_vec()).collect(),
        }
    }

    /// Keep only the first `n` rows.
    #[must_use]
    pub fn truncated(&self, n: usize) -> Self {
        self.slice_rows(0..n)
    }

    /// Replace every column with `f(column)`, keeping names.
    ///
    /// `f` must return a column of the same length.
    #[must_use]
    pub fn map_columns<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        let columns: Vec<Vec<f64>> = self.columns.iter().map(|c| f(c)).collect();
        debug_assert!(columns.iter().all(|c| c.len() == self.n_rows()));
        Self {
            names: self.names.clone(),
            columns,
        }
    }

    /// Fallible variant of [`SensorTable::map_columns`].
    ///
    /// # Errors
    ///
    /// Propagates the first error from `f`, and returns `InvalidShape` if
    /// `f` changes a column's length.
    pub fn try_map_columns<F>(&self, mut f: F) -> Result<Self>
    where
        F: FnMut(&[f64]) -> Result<Vec<f64>>,
    {
        let n = self.n_rows();
        let mut columns = Vec::with_capacity(self.n_cols());
        for (name, col) in self.names.iter().zip(&self.columns) {
            let mapped = f(col)?;
            if mapped.len() != n {
                return Err(PreprocessError::invalid_shape(format!(
                    "column {name:?} changed length from {n} to {}",
                    mapped.len()
                )));
            }
            columns.push(mapped);
        }
        Ok(Self {
            names: self.names.clone(),
            columns,
        })
    }

    /// Prefix every column name, e.g. `"acc_"` turns `x` into `acc_x`.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            names: self.names.iter().map(|n| format!("{prefix}{n}")).collect(),
            columns: self.columns.clone(),
        }
    }

    /// Append the columns of `other` to the right.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShape` if the row counts differ.
    pub fn concat_columns(&self, other: &Self) -> Result<Self> {
        if self.n_cols() > 0 && other.n_cols() > 0 && self.n_rows() != other.n_rows() {
            return Err(PreprocessError::invalid_shape(format!(
                "cannot concatenate tables with {} and {} rows",
                self.n_rows(),
                other.n_rows()
            )));
        }
        let mut names = self.names.clone();
        names.extend(other.names.iter().cloned());
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Ok(Self { names, columns })
    }

    /// Select columns by name, in the requested order.
    ///
    /// A name shared by several columns selects all of them, left to right.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if a name matches no column.
    pub fn select<S: AsRef<str>>(&self, order: &[S]) -> Result<Self> {
        let mut names = Vec::with_capacity(order.len());
        let mut columns = Vec::with_capacity(order.len());
        for wanted in order {
            let wanted = wanted.as_ref();
            let before = names.len();
            for (name, col) in self.names.iter().zip(&self.columns) {
                if name == wanted {
                    names.push(name.clone());
                    columns.push(col.clone());
                }
            }
            if names.len() == before {
                return Err(PreprocessError::schema_mismatch(format!(
                    "column {wanted:?} not found in {:?}",
                    self.names
                )));
            }
        }
        Ok(Self { names, columns })
    }

    /// Rename columns: every column called `from[i]` becomes `to[i]`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the two lists differ in length.
    pub fn rename<S: AsRef<str>, T: AsRef<str>>(&self, from: &[S], to: &[T]) -> Result<Self> {
        if from.len() != to.len() {
            return Err(PreprocessError::schema_mismatch(format!(
                "{} columns to rename but {} new names",
                from.len(),
                to.len()
            )));
        }
        let names = self
            .names
            .iter()
            .map(|name| {
                from.iter()
                    .position(|f| f.as_ref() == name)
                    .map_or_else(|| name.clone(), |i| to[i].as_ref().to_string())
            })
            .collect();
        Ok(Self {
            names,
            columns: self.columns.clone(),
        })
    }

    /// Row-major copy of the values: sample 0 all columns, sample 1 ...
    #[must_use]
    pub fn to_row_major(&self) -> Vec<f64> {
        let (rows, cols) = self.shape();
        let mut out = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            out.extend(self.columns.iter().map(|c| c[r]));
        }
        out
    }
}

/// Join two sensor tables side by side, then keep `order` and rename it.
///
/// The longer table is silently cut to the shorter one's length before
/// joining, so recordings of slightly different duration can be paired.
/// The selected columns are renamed positionally: the columns picked by
/// `order[i]` are named `names[i]`, even when a name is repeated in `order`
/// or appears in both tables.
///
/// # Errors
///
/// Returns `SchemaMismatch` if a name in `order` is absent from both tables
/// or if `order` and `names` differ in length.
///
/// # Example
///
/// ```
/// use sensor_preprocess::{rebase, SensorTable};
///
/// let acc = SensorTable::from_columns(vec![("x", vec![1.0; 5]), ("y", vec![2.0; 5])])?;
/// let gyro = SensorTable::from_columns(vec![("gx", vec![3.0; 7])])?;
///
/// let joined = rebase(&acc, &gyro, &["gx", "x"], &["gyro_x", "acc_x"])?;
/// assert_eq!(joined.shape(), (5, 2));
/// assert_eq!(joined.names(), &["gyro_x", "acc_x"]);
/// # Ok::<(), sensor_preprocess::PreprocessError>(())
/// ```
pub fn rebase<S: AsRef<str>, T: AsRef<str>>(
    first: &SensorTable,
    second: &SensorTable,
    order: &[S],
    names: &[T],
) -> Result<SensorTable> {
    if order.len() != names.len() {
        return Err(PreprocessError::schema_mismatch(format!(
            "{} columns selected but {} new names",
            order.len(),
            names.len()
        )));
    }

    let rows = first.n_rows().min(second.n_rows());
    if first.n_rows() != second.n_rows() {
        tracing::warn!(
            first = first.n_rows(),
            second = second.n_rows(),
            kept = rows,
            "truncating sensor tables of different length"
        );
    }

    let joined = first.truncated(rows).concat_columns(&second.truncated(rows))?;
    let mut out_names = Vec::with_capacity(order.len());
    let mut out_columns = Vec::with_capacity(order.len());
    for (wanted, new_name) in order.iter().zip(names) {
        let picked = joined.select(&[wanted.as_ref()])?;
        for column in picked.columns {
            out_names.push(new_name.as_ref().to_string());
            out_columns.push(column);
        }
    }
    SensorTable::new(out_names, out_columns)
}
