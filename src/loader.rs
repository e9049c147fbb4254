//! Loading raw recordings from a labeled directory tree.
//!
//! Recordings are CSV files with a header row, stored as
//! `<root>/<label>/accel/*.csv` and `<root>/<label>/gyro/*.csv`, where the
//! label is the Greek letter matching the first letter of the original file
//! name.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};

use crate::error::{PreprocessError, Result};
use crate::table::SensorTable;

/// English initials and the Greek label each one is filed under.
pub const GREEK_LABELS: [(char, char); 24] = [
    ('a', 'α'),
    ('b', 'β'),
    ('c', 'γ'),
    ('d', 'δ'),
    ('e', 'ε'),
    ('z', 'ζ'),
    ('h', 'η'),
    ('q', 'θ'),
    ('i', 'ι'),
    ('k', 'κ'),
    ('l', 'λ'),
    ('m', 'μ'),
    ('n', 'ν'),
    ('j', 'ξ'),
    ('o', 'ο'),
    ('p', 'π'),
    ('r', 'ρ'),
    ('s', 'σ'),
    ('t', 'τ'),
    ('u', 'υ'),
    ('f', 'φ'),
    ('x', 'χ'),
    ('y', 'ψ'),
    ('w', 'ω'),
];

/// Greek label for an English letter.
#[must_use]
pub fn greek_label(letter: char) -> Option<char> {
    GREEK_LABELS
        .iter()
        .find(|(en, _)| *en == letter)
        .map(|&(_, gr)| gr)
}

/// Greek label for a raw recording, from the first letter of its file name.
#[must_use]
pub fn label_for_file(path: impl AsRef<Path>) -> Option<char> {
    let name = path.as_ref().file_name()?.to_str()?;
    greek_label(name.chars().next()?)
}

/// Which sensor produced a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

impl SensorKind {
    /// Infer the sensor from a path.
    ///
    /// Paths mentioning `Accelerometer`, or inside an `accel` directory, are
    /// accelerometer recordings; everything else is a gyroscope recording.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let accel = path.to_string_lossy().contains("Accelerometer")
            || path.components().any(|c| c.as_os_str() == "accel");
        if accel {
            Self::Accelerometer
        } else {
            Self::Gyroscope
        }
    }

    /// Directory name used for this sensor in the labeled tree.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Accelerometer => "accel",
            Self::Gyroscope => "gyro",
        }
    }
}

/// A recording found in the labeled tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordingEntry {
    pub label: String,
    pub kind: SensorKind,
    pub path: PathBuf,
}

impl RecordingEntry {
    /// Read the recording.
    ///
    /// # Errors
    ///
    /// See [`load_recording`].
    pub fn load(&self) -> Result<SensorTable> {
        load_recording(&self.path)
    }
}

/// Read a CSV recording into a table, one column per header field.
///
/// Empty cells become `NaN`. Row numbers in errors are 1-based and count
/// data rows only.
///
/// # Errors
///
/// Returns `Io` if the file cannot be opened, `Csv` for malformed CSV, and
/// `Parse` for a cell that is not a number.
pub fn load_recording(path: impl AsRef<Path>) -> Result<SensorTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PreprocessError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let names: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        for ((cell, column), name) in record.iter().zip(columns.iter_mut()).zip(&names) {
            let value = if cell.is_empty() {
                f64::NAN
            } else {
                cell.parse::<f64>()
                    .map_err(|_| PreprocessError::parse(row_idx + 1, name.as_str(), cell))?
            };
            column.push(value);
        }
    }

    let table = SensorTable::new(names, columns)?;
    tracing::debug!(path = %path.display(), rows = table.n_rows(), cols = table.n_cols(), "loaded recording");
    Ok(table)
}

/// List every recording under `<root>/<label>/{accel,gyro}/`, sorted by
/// label, sensor and path.
///
/// Other directories and loose files are ignored.
///
/// # Errors
///
/// Returns `Io` if a directory cannot be read.
pub fn discover_recordings(root: impl AsRef<Path>) -> Result<Vec<RecordingEntry>> {
    let root = root.as_ref();
    let mut entries = Vec::new();

    for label_dir in read_dir_paths(root)? {
        if !label_dir.is_dir() {
            continue;
        }
        let Some(label) = label_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        for kind in [SensorKind::Accelerometer, SensorKind::Gyroscope] {
            let sensor_dir = label_dir.join(kind.dir_name());
            if !sensor_dir.is_dir() {
                continue;
            }
            for path in read_dir_paths(&sensor_dir)? {
                if path.is_file() {
                    entries.push(RecordingEntry {
                        label: label.to_string(),
                        kind,
                        path,
                    });
                }
            }
        }
    }

    entries.sort();
    tracing::info!(root = %root.display(), recordings = entries.len(), "discovered recordings");
    Ok(entries)
}

fn read_dir_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::read_dir(dir)
        .and_then(|rd| rd.map(|e| e.map(|e| e.path())).collect())
        .map_err(|e| PreprocessError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_greek_labels() {
        assert_eq!(greek_label('a'), Some('α'));
        assert_eq!(greek_label('q'), Some('θ'));
        assert_eq!(greek_label('j'), Some('ξ'));
        assert_eq!(greek_label('w'), Some('ω'));
        assert_eq!(greek_label('g'), None);
        assert_eq!(greek_label('v'), None);

        let mut greek: Vec<char> = GREEK_LABELS.iter().map(|&(_, g)| g).collect();
        greek.sort_unstable();
        greek.dedup();
        assert_eq!(greek.len(), 24);
    }

    #[test]
    fn test_label_for_file() {
        assert_eq!(label_for_file("/home/Public/beta_Accelerometer.csv"), Some('β'));
        assert_eq!(label_for_file("x_gyro.csv"), Some('χ'));
        assert_eq!(label_for_file("vertical.csv"), None);
    }

    #[test]
    fn test_sensor_kind() {
        assert_eq!(
            SensorKind::from_path("raw/a_Accelerometer.csv"),
            SensorKind::Accelerometer
        );
        assert_eq!(
            SensorKind::from_path("data/α/accel/a1.csv"),
            SensorKind::Accelerometer
        );
        assert_eq!(
            SensorKind::from_path("data/α/gyro/a1.csv"),
            SensorKind::Gyroscope
        );
        assert_eq!(SensorKind::from_path("a_Gyroscope.csv"), SensorKind::Gyroscope);
    }

    #[test]
    fn test_load_recording() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.csv");
        write(&path, "acc_x,acc_y,acc_z\n1.0,2.0,3.0\n4.5, ,-6\n");

        let table = load_recording(&path).unwrap();
        assert_eq!(table.names(), &["acc_x", "acc_y", "acc_z"]);
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(table.value(1, 0), Some(4.5));
        assert!(table.value(1, 1).unwrap().is_nan());
        assert_eq!(table.value(1, 2), Some(-6.0));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            load_recording(&missing),
            Err(PreprocessError::Io { .. })
        ));

        let bad = dir.path().join("bad.csv");
        write(&bad, "x,y\n1,2\n3,oops\n");
        match load_recording(&bad) {
            Err(PreprocessError::Parse { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "y");
                assert_eq!(value, "oops");
            }
            other => panic!("expected parse error, got {other:?}"),
        }

        let ragged = dir.path().join("ragged.csv");
        write(&ragged, "x,y\n1,2\n3\n");
        assert!(matches!(load_recording(&ragged), Err(PreprocessError::Csv(_))));
    }

    #[test]
    fn test_discover_recordings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("β/gyro/b2.csv"), "g_x\n1\n");
        write(&root.join("β/accel/b1.csv"), "acc_x\n1\n");
        write(&root.join("α/accel/a2.csv"), "acc_x\n1\n");
        write(&root.join("α/accel/a1.csv"), "acc_x\n1\n");
        write(&root.join("α/notes/readme.txt"), "ignored");
        write(&root.join("loose.csv"), "ignored");

        let found = discover_recordings(root).unwrap();
        let summary: Vec<(String, SensorKind, String)> = found
            .iter()
            .map(|e| {
                (
                    e.label.clone(),
                    e.kind,
                    e.path.file_name().unwrap().to_string_lossy().into_owned(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("α".to_string(), SensorKind::Accelerometer, "a1.csv".to_string()),
                ("α".to_string(), SensorKind::Accelerometer, "a2.csv".to_string()),
                ("β".to_string(), SensorKind::Accelerometer, "b1.csv".to_string()),
                ("β".to_string(), SensorKind::Gyroscope, "b2.csv".to_string()),
            ]
        );

        let table = found[0].load().unwrap();
        assert_eq!(table.shape(), (1, 1));
    }

    #[test]
    fn test_discover_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            discover_recordings(dir.path().join("nope")),
            Err(PreprocessError::Io { .. })
        ));
    }
}
