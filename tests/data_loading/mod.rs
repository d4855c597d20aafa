//! Reading data files from disk and handing them to a fit.

use std::fs;

use modelfit_rs::data::load_dataset;
use modelfit_rs::fit::{fit, FitOptions};
use modelfit_rs::models::{FlmpModel, ProductModel, SingleChannelModel};
use modelfit_rs::{FitError, Model};

use crate::test_helpers::{scratch_dir, AV_DATA};

#[test]
fn load_av_file() {
    let dir = scratch_dir("load-av");
    let path = dir.join("av.json");
    fs::write(&path, AV_DATA).unwrap();

    let dataset = load_dataset(&path).unwrap();
    assert_eq!(dataset.parameters.len(), 3);
    assert_eq!(dataset.parameter("bias").unwrap().values, vec![0.5]);
    assert_eq!(dataset.composite.values.len(), 25);
    assert_eq!(dataset.composite.abbreviation, "AV");

    // both two-factor models find their parameters in the same file
    assert_eq!(dataset.select(FlmpModel.signature()).unwrap().len(), 2);
    assert_eq!(dataset.select(SingleChannelModel.signature()).unwrap().len(), 3);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn loaded_file_fits() {
    let dir = scratch_dir("load-fit");
    let path = dir.join("av.json");
    fs::write(&path, AV_DATA).unwrap();

    let dataset = load_dataset(&path).unwrap();
    let result = fit(&SingleChannelModel, &dataset, FitOptions::default()).unwrap();
    let bias = result.parameter("bias").unwrap().as_scalar().unwrap();
    assert!((0.0..=1.0).contains(&bias));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_file_is_io_error() {
    let dir = scratch_dir("load-missing");
    let err = load_dataset(dir.join("absent.json")).unwrap_err();
    assert!(matches!(err, FitError::Io(_)));
    assert_eq!(err.exit_code(), 7);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn out_of_range_file_is_validation_error() {
    let dir = scratch_dir("load-range");
    let path = dir.join("bad.json");
    fs::write(
        &path,
        r#"[{"name": "a_params", "data": [0.2, 1.2]}, {"name": "composite", "data": [0.1, 0.2]}]"#,
    )
    .unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, FitError::Validation(_)));
    assert_eq!(err.exit_code(), 2);
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn model_without_matching_records_is_rejected() {
    let dir = scratch_dir("load-unmatched");
    let path = dir.join("av.json");
    fs::write(&path, AV_DATA).unwrap();

    let dataset = load_dataset(&path).unwrap();
    let err = fit(&ProductModel, &dataset, FitOptions::default()).unwrap_err();
    assert!(matches!(err, FitError::Validation(_)));
    assert!(err.to_string().contains("parameter1"));
    fs::remove_dir_all(dir).unwrap();
}
