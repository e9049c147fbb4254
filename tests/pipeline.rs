//! End-to-end tests for the preprocessing pipeline.
//!
//! These tests drive the public API the way an experiment does: load or build
//! recordings, pair accelerometer and gyroscope streams, segment, filter,
//! flatten and label.

use approx::assert_abs_diff_eq;
use sensor_preprocess::{
    apply_filter, butter, build_labeled_dataset, discover_recordings, encode_labels,
    explained_variance, filter_instances, flatten_instances, impute_nan, label_for_file,
    load_recording, rebase, sliding_window, FilterParams, FilterType, PipelineConfig,
    PreprocessError, SensorKind, SensorTable, SensorTensor, WindowParams,
};
use std::f64::consts::PI;
use std::fs;

// =============================================================================
// SIGNAL GENERATORS
// =============================================================================

/// Accelerometer stroke: slow motion plus high-frequency jitter.
fn generate_accel(n: usize, freq: f64, jitter: f64) -> SensorTable {
    let axis = |phase: f64| -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                (2.0 * PI * freq * t + phase).sin() + jitter * (2.0 * PI * 0.45 * t).sin()
            })
            .collect()
    };
    SensorTable::from_columns(vec![
        ("x", axis(0.0)),
        ("y", axis(PI / 3.0)),
        ("z", vec![9.81; n]),
    ])
    .unwrap()
}

/// Gyroscope stream with its own column names.
fn generate_gyro(n: usize) -> SensorTable {
    SensorTable::from_columns(vec![
        ("gx", (0..n).map(|i| (i as f64 * 0.03).cos()).collect()),
        ("gy", vec![0.0; n]),
        ("gz", vec![0.1; n]),
    ])
    .unwrap()
}

fn ramp(n: usize) -> SensorTable {
    SensorTable::from_columns(vec![("v", (0..n).map(|i| i as f64).collect())]).unwrap()
}

// =============================================================================
// WINDOWING
// =============================================================================

#[test]
fn test_windows_of_ten_rows() {
    let windows = sliding_window(&ramp(10), &WindowParams::new(4, 2)).unwrap();
    let starts: Vec<usize> = windows.iter().map(|w| w.start).collect();
    assert_eq!(starts, vec![0, 2, 4, 6]);
    assert!(windows.iter().all(|w| w.len() == 4));

    for w in &windows {
        let values = w.data.column("v").unwrap();
        assert_eq!(values[0], w.start as f64);
    }
}

#[test]
fn test_three_rows_give_no_windows() {
    let windows = sliding_window(&ramp(3), &WindowParams::new(4, 2)).unwrap();
    assert!(windows.is_empty());
}

// =============================================================================
// FILTERING
// =============================================================================

#[test]
fn test_zero_signal_stays_zero() {
    let params = FilterParams::new(5, 0.1, FilterType::Lowpass);
    let out = apply_filter(&[0.0; 200], &params).unwrap();
    assert!(out.iter().all(|&v| v == 0.0));
}

#[test]
fn test_constant_through_lowpass() {
    let params = FilterParams::new(5, 0.1, FilterType::Lowpass);
    let out = apply_filter(&[3.5; 200], &params).unwrap();
    for v in out {
        assert_abs_diff_eq!(v, 3.5, epsilon = 1e-9);
    }
}

#[test]
fn test_second_order_half_band_coefficients() {
    let sos = butter(&FilterParams::new(2, 0.5, FilterType::Lowpass)).unwrap();
    let section = &sos.sections()[0];
    let b = [0.292_893_218_8, 0.585_786_437_6, 0.292_893_218_8];
    let a = [1.0, 0.0, 0.171_572_875_3];
    for i in 0..3 {
        assert_abs_diff_eq!(section.b[i], b[i], epsilon = 1e-9);
        assert_abs_diff_eq!(section.a[i], a[i], epsilon = 1e-9);
    }
}

#[test]
fn test_filter_reduces_jitter_per_window() {
    let table = generate_accel(400, 0.005, 0.5);
    let windows = sliding_window(&table, &WindowParams::new(100, 50)).unwrap();
    let filtered =
        filter_instances(&windows, &FilterParams::new(4, 0.1, FilterType::Lowpass)).unwrap();

    let energy = |v: &[f64]| -> f64 {
        v.windows(2).map(|p| (p[1] - p[0]).powi(2)).sum::<f64>()
    };
    for (raw, clean) in windows.iter().zip(&filtered) {
        let before = energy(raw.data.column("x").unwrap());
        let after = energy(clean.data.column("x").unwrap());
        assert!(after < before * 0.1, "jitter not removed: {after} vs {before}");
    }
}

// =============================================================================
// FLATTENING AND LABELS
// =============================================================================

#[test]
fn test_flatten_dimensions() {
    let windows = sliding_window(&generate_accel(300, 0.01, 0.0), &WindowParams::new(50, 25)).unwrap();
    let flat = flatten_instances(&windows).unwrap();
    assert_eq!(flat.shape(), (windows.len(), 150));
}

#[test]
fn test_label_ranks() {
    assert_eq!(encode_labels(&["b", "a", "a", "c"]).codes, vec![1, 0, 0, 2]);
}

// =============================================================================
// REBASE
// =============================================================================

#[test]
fn test_rebase_truncates_to_shorter() {
    let acc = generate_accel(5, 0.01, 0.0);
    let gyro = generate_gyro(7);

    let joined = rebase(
        &acc,
        &gyro,
        &["x", "y", "z", "gx", "gy", "gz"],
        &["acc_x", "acc_y", "acc_z", "gyro_x", "gyro_y", "gyro_z"],
    )
    .unwrap();

    assert_eq!(joined.shape(), (5, 6));
    assert_eq!(joined.names()[3], "gyro_x");
    assert_eq!(joined.column("gyro_z").unwrap(), &[0.1; 5]);
}

#[test]
fn test_rebase_unknown_column() {
    let err = rebase(&generate_accel(5, 0.01, 0.0), &generate_gyro(5), &["w"], &["acc_w"]);
    assert!(matches!(err, Err(PreprocessError::SchemaMismatch(_))));
}

// =============================================================================
// IMPUTATION
// =============================================================================

#[test]
fn test_complete_tensor_untouched() {
    let data: Vec<f64> = (0..24).map(f64::from).collect();
    let tensor = SensorTensor::new(vec![4, 2, 3], data).unwrap();
    assert_eq!(impute_nan(&tensor).unwrap(), tensor);
}

#[test]
fn test_two_dimensional_input_rejected() {
    let tensor = SensorTensor::new(vec![4, 6], vec![0.0; 24]).unwrap();
    assert!(matches!(
        impute_nan(&tensor),
        Err(PreprocessError::InvalidShape(_))
    ));
}

// =============================================================================
// FULL PIPELINE
// =============================================================================

#[test]
fn test_dataset_from_directory_tree() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    for (file, freq) in [("a_1.csv", 0.01), ("b_1.csv", 0.02), ("b_2.csv", 0.03)] {
        let label = label_for_file(file).unwrap().to_string();
        let path = root.join(&label).join("accel").join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let mut csv = String::from("acc_x,acc_y,acc_z\n");
        for i in 0..120 {
            let v = (2.0 * PI * freq * f64::from(i)).sin();
            csv.push_str(&format!("{v},{},{}\n", -v, 9.81));
        }
        fs::write(&path, csv).unwrap();
    }

    let entries = discover_recordings(root).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.kind == SensorKind::Accelerometer));

    let recordings: Vec<(String, SensorTable)> = entries
        .iter()
        .map(|e| (e.label.clone(), load_recording(&e.path).unwrap()))
        .collect();

    let config = PipelineConfig::new()
        .with_window(40, 20)
        .with_filter(4, 0.2, FilterType::Lowpass);
    let dataset = build_labeled_dataset(&recordings, &config).unwrap();

    assert_eq!(dataset.classes, vec!["α".to_string(), "β".to_string()]);
    assert_eq!(dataset.features.ncols(), 120);
    assert_eq!(dataset.columns[119], "acc_z_39");

    let per_recording = dataset.len() / 3;
    assert!(per_recording > 0);
    assert!(dataset.y[..per_recording].iter().all(|&c| c == 0));
    assert!(dataset.y[per_recording..].iter().all(|&c| c == 1));

    // Variance lives in the moving axes, not gravity
    let ev = explained_variance(&dataset.features, 0.95).unwrap();
    assert!(ev.n_components <= dataset.features.ncols());
    assert_abs_diff_eq!(ev.ratio[2], 0.0, epsilon = 1e-12);
}
