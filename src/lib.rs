//! Sensor Preprocessing Library
//!
//! Turns raw wearable accelerometer/gyroscope recordings into labeled
//! feature matrices for handwriting recognition.
//!
//! The pipeline segments each recording into overlapping windows, filters
//! every window with a zero-phase Butterworth filter, flattens each window
//! into one feature row and encodes the labels. Recordings with gaps can be
//! completed beforehand with nearest-neighbor imputation.
//!
//! # Features
//!
//! - **Windowing**: fixed-size, overlapping segments with pandas-style bounds
//! - **Filtering**: Butterworth design as second-order sections, forward-backward
//! - **Imputation**: KNN over instances with channel-periodic weighting
//! - **Loading**: CSV recordings from a Greek-labeled directory tree
//!
//! # Quick Start
//!
//! ```
//! use sensor_preprocess::{build_labeled_dataset, FilterType, PipelineConfig, SensorTable};
//!
//! let recording = |level: f64| {
//!     SensorTable::from_columns(vec![
//!         ("acc_x", vec![level; 64]),
//!         ("acc_y", (0..64).map(|i| (i as f64 * 0.1).sin()).collect()),
//!         ("acc_z", vec![9.81; 64]),
//!     ])
//! };
//!
//! let config = PipelineConfig::new()
//!     .with_window(16, 8)
//!     .with_filter(4, 0.2, FilterType::Lowpass);
//!
//! let dataset = build_labeled_dataset(
//!     &[('β', recording(1.0)?), ('α', recording(-1.0)?)],
//!     &config,
//! )?;
//!
//! assert_eq!(dataset.columns[0], "acc_x_0");
//! assert_eq!(dataset.n_classes(), 2);
//! # Ok::<(), sensor_preprocess::PreprocessError>(())
//! ```
//!
//! # Stages
//!
//! | Stage | Function | Output |
//! |-------|----------|--------|
//! | Segment | [`sliding_window`] | `Vec<Window>` |
//! | Filter | [`filter_instances`] | `Vec<Window>` |
//! | Flatten | [`flatten_instances`] | `(windows, size * columns)` matrix |
//! | Label | [`encode_labels`] | codes and sorted classes |
//!
//! # Configuration
//!
//! Every stage reads its parameters from [`PipelineConfig`], which
//! deserializes from JSON:
//!
//! ```
//! use sensor_preprocess::{FilterType, PipelineConfig, WindowFunction};
//!
//! let config: PipelineConfig = serde_json::from_str(
//!     r#"{
//!         "window": {"size": 200, "hop": 100, "function": "hamming", "center": true},
//!         "filter": {"order": 4, "wn": [0.05, 0.3], "filter_type": "bandpass"}
//!     }"#,
//! ).unwrap();
//!
//! assert_eq!(config.window.function, WindowFunction::Hamming);
//! assert_eq!(config.filter.filter_type, FilterType::Bandpass);
//! assert_eq!(config.n_neighbors, 5);
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod error;
pub mod filtering;
pub mod flatten;
pub mod impute;
pub mod labels;
pub mod loader;
pub mod math;
pub mod pipeline;
pub mod table;
pub mod variance;
pub mod windowing;

// Re-exports for convenient access
pub use config::{CriticalFrequency, FilterParams, FilterType, PipelineConfig, WindowFunction, WindowParams};
pub use error::{PreprocessError, Result};
pub use filtering::{apply_filter, filter_instances, filter_table};
pub use flatten::{flatten_instances, flattened_names};
pub use impute::{impute_nan, impute_with, KnnImputer, SensorTensor, DEFAULT_NEIGHBORS};
pub use labels::{encode_labels, LabelEncoding, LabeledDataset, DEFAULT_COLUMNS};
pub use loader::{
    discover_recordings, greek_label, label_for_file, load_recording, RecordingEntry, SensorKind,
};
pub use math::{butter, SosFilter};
pub use pipeline::{build_labeled_dataset, preprocess_recording};
pub use table::{rebase, SensorTable};
pub use variance::{explained_variance, ExplainedVariance};
pub use windowing::{sliding_window, window_coefficients, Window};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
