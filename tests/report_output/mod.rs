//! Reports, graphs and the automatic-mode pipeline.

use std::fs;

use modelfit_rs::app::fit_from_args;
use modelfit_rs::cli::FitArgs;
use modelfit_rs::data::parse_dataset;
use modelfit_rs::fit::{fit, FitOptions};
use modelfit_rs::models::{FlmpModel, SingleChannelModel};
use modelfit_rs::report::{render_ascii_graph, write_fit_report, GraphData, ResultTable};
use modelfit_rs::settings::{GraphSettings, Settings};
use modelfit_rs::FitError;

use crate::test_helpers::{scratch_dir, AV_DATA};

fn fit_args(dir: &std::path::Path) -> FitArgs {
    FitArgs {
        data: Some("av.json".to_string()),
        output: Some("result.txt".to_string()),
        graph: Some("graph.json".to_string()),
        data_dir: dir.join("data"),
        results_dir: dir.join("results"),
        width: 50,
        height: 15,
        ..FitArgs::default()
    }
}

fn write_data(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("data")).unwrap();
    fs::write(dir.join("data").join("av.json"), AV_DATA).unwrap();
}

#[test]
fn report_sections() {
    let dataset = parse_dataset(AV_DATA).unwrap();
    let result = fit(&SingleChannelModel, &dataset, FitOptions::default()).unwrap();

    let mut out = Vec::new();
    write_fit_report(&mut out, &dataset, &result, 4, true).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Model Fitting Result"));
    assert!(text.contains("model: scModel"));
    assert!(text.contains("Optimal Parameters"));
    assert!(text.contains("Auditory ["));
    assert!(text.contains("Bias "));
    assert!(text.contains(&format!("RMSD = {}", modelfit_rs::parameters::round_to(result.rmsd, 4))));
}

#[test]
fn result_table_matches_layout() {
    let dataset = parse_dataset(AV_DATA).unwrap();
    let result = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();
    let table = ResultTable::from_fit(&dataset, &result, 3).unwrap();

    assert_eq!(table.column_labels().len(), 6);
    assert_eq!(table.row_labels()[4], "V5");
    // row 1, column 2 is (A3, V2)
    assert_eq!(
        table.cell(1, 2),
        Some(modelfit_rs::parameters::round_to(result.prediction[7], 3))
    );
}

#[test]
fn graph_uses_second_parameter_for_legend_fallback() {
    let dataset = parse_dataset(AV_DATA).unwrap();
    let result = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();

    let settings = GraphSettings {
        legend_label: String::new(),
        x_label: "Auditory".to_string(),
        ..GraphSettings::default()
    };
    let graph = GraphData::build(&FlmpModel, &dataset, &result, &settings).unwrap();

    assert_eq!(graph.title, "Fuzzy Logical Model of Perception");
    assert_eq!(graph.legend_title, "Visual");
    assert_eq!(graph.ticks, vec!["A1", "A2", "A3", "A4", "A5"]);
    assert_eq!(graph.levels.len(), 5);
    assert_eq!(graph.levels[1].label, "V2 = 0.44");
    assert_eq!(graph.levels[0].observed, vec![0.02, 0.02, 0.07, 0.53, 0.76]);
    assert_eq!(graph.first.predicted, result.parameters[0].as_slice());

    let text = render_ascii_graph(&graph, 50, 15);
    assert!(text.contains("  5 V5 = 0.97"));
}

#[test]
fn automatic_mode_writes_result_and_graph() {
    let dir = scratch_dir("auto-mode");
    write_data(&dir);

    let mut args = fit_args(&dir);
    args.model = Some("1".to_string());
    let run = fit_from_args(&args).unwrap();

    let text = fs::read_to_string(&run.result_path).unwrap();
    assert!(text.starts_with("Model: Fuzzy Logical Model of Perception (flmpModel)"));
    assert!(text.contains("Observed Data"));
    assert!(text.contains("Model Fitting Result"));
    assert!(!text.contains("Evaluation 1\n"));
    assert!(text.contains("x=[A1, A5]"));

    let graph: GraphData =
        serde_json::from_str(&fs::read_to_string(&run.graph_path).unwrap()).unwrap();
    assert_eq!(graph.levels.len(), 5);
    assert_eq!(graph.legend_title, "Legend");
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn verbose_mode_reports_each_evaluation() {
    let dir = scratch_dir("auto-verbose");
    write_data(&dir);

    let mut args = fit_args(&dir);
    args.model = Some("scModel".to_string());
    args.verbose = true;
    args.max_iterations = Some(30);
    let run = fit_from_args(&args).unwrap();

    let text = fs::read_to_string(&run.result_path).unwrap();
    assert_eq!(text.matches("Evaluation ").count(), run.result.evaluations);
    assert!(text.contains("status: MaxEvaluationsReached") || run.result.converged());
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn settings_file_is_overridden_by_flags() {
    let dir = scratch_dir("auto-settings");
    write_data(&dir);

    let mut settings = Settings::default();
    settings.data.model_number = 2;
    settings.general.rounding = 2;
    settings.data.data_filename = Some("missing.json".to_string());
    let settings_path = dir.join("settings.json");
    settings.save(&settings_path).unwrap();

    let mut args = fit_args(&dir);
    args.settings = Some(settings_path);
    let run = fit_from_args(&args).unwrap();

    assert_eq!(run.result.model_name, "scModel");
    assert_eq!(run.settings.general.rounding, 2);
    assert_eq!(run.settings.data.data_filename.as_deref(), Some("av.json"));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn bad_model_index_is_reported() {
    let dir = scratch_dir("auto-index");
    write_data(&dir);

    let mut args = fit_args(&dir);
    args.model = Some("42".to_string());
    let err = fit_from_args(&args).unwrap_err();
    assert!(matches!(err, FitError::IndexOutOfRange { index: 42, .. }));
    assert_eq!(err.exit_code(), 5);
    assert!(!dir.join("results").join("result.txt").exists());
    fs::remove_dir_all(dir).unwrap();
}
