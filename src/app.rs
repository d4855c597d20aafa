//! Top-level application orchestration.
//!
//! `src/main.rs` only maps the outcome to an exit code; this module:
//! - parses CLI arguments and installs the log subscriber
//! - resolves settings (file, then flag overrides, then dated defaults)
//! - loads the data file and runs the fit
//! - writes the result file (report plus text graph) and the graph JSON

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::cli::{Cli, Command, FitArgs};
use crate::data::load_dataset;
use crate::error::{FitError, Result};
use crate::fit::{fit, Evaluation, FitDriver, FitResult};
use crate::models::{find_model, get_model, list_models};
use crate::report::{render_ascii_graph, write_fit_report, GraphData, ResultTable, VerboseReporter};
use crate::settings::Settings;

/// Entry point for the `modelfit` binary.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Models => handle_models(),
        Command::Fit(args) => handle_fit(args),
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| FitError::Settings(format!("invalid log level '{}': {}", level, e)))?,
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second install (tests) keeps the first subscriber.
    let _ = Registry::default().with(filter).with(fmt_layer).try_init();
    Ok(())
}

fn handle_models() -> Result<()> {
    for model in list_models() {
        let parameters: Vec<&str> = model.signature.iter().map(|p| p.name).collect();
        println!(
            "{:>2}  {:<14} {} ({})",
            model.index,
            model.name,
            model.display_name,
            parameters.join(", ")
        );
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<()> {
    let run = fit_from_args(&args)?;
    println!(
        "{}: RMSD = {} ({})",
        run.result.model_name, run.result.rmsd, run.result.status
    );
    println!("Results written to {}", run.result_path.display());
    println!("Graph written to {}", run.graph_path.display());
    Ok(())
}

/// Output of one automatic-mode fit.
#[derive(Debug)]
pub struct FitRun {
    pub settings: Settings,
    pub result: FitResult,
    pub result_path: PathBuf,
    pub graph_path: PathBuf,
}

/// Resolve settings from `args`, fit and write the result and graph files.
pub fn fit_from_args(args: &FitArgs) -> Result<FitRun> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    apply_overrides(&mut settings, args)?;
    settings.validate()?;
    settings.fill_defaults_today()?;

    let (result_path, graph_path) = output_paths(&settings, &args.results_dir)?;
    let result = fit_to_files(
        &settings,
        &args.data_dir,
        &result_path,
        &graph_path,
        (args.width, args.height),
    )?;

    Ok(FitRun {
        settings,
        result,
        result_path,
        graph_path,
    })
}

/// Flags win over the settings file.
pub fn apply_overrides(settings: &mut Settings, args: &FitArgs) -> Result<()> {
    if let Some(data) = &args.data {
        settings.data.data_filename = Some(data.clone());
    }
    if let Some(model) = &args.model {
        settings.data.model_number = resolve_model(model)?;
    }
    if let Some(output) = &args.output {
        settings.data.result_filename = Some(output.clone());
    }
    if let Some(graph) = &args.graph {
        settings.graph.graph_filename = Some(graph.clone());
    }
    if args.verbose {
        settings.general.verbose = true;
    }
    if let Some(rounding) = args.rounding {
        settings.general.rounding = rounding;
    }
    if args.max_iterations.is_some() {
        settings.solver.max_iterations = args.max_iterations;
    }
    Ok(())
}

/// Registry index for `selector`, given either as an index or a model name.
///
/// An index is passed through unchecked; [`get_model`] reports it when the
/// fit starts.
fn resolve_model(selector: &str) -> Result<usize> {
    if let Ok(index) = selector.parse::<usize>() {
        return Ok(index);
    }
    find_model(selector)
        .map(|(index, _)| index)
        .ok_or_else(|| FitError::Settings(format!("unknown model '{}'", selector)))
}

fn output_paths(settings: &Settings, results_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let result = settings
        .data
        .result_filename
        .as_deref()
        .ok_or_else(|| FitError::Settings("data.result_filename is not set".to_string()))?;
    let graph = settings
        .graph
        .graph_filename
        .as_deref()
        .ok_or_else(|| FitError::Settings("graph.graph_filename is not set".to_string()))?;
    Ok((results_dir.join(result), results_dir.join(graph)))
}

/// Fit the model named by `settings` to its data file under `data_dir`.
///
/// The result file receives the observed table, per-evaluation tables when
/// verbose, the fit report and a text graph. The graph JSON goes to
/// `graph_path`.
pub fn fit_to_files(
    settings: &Settings,
    data_dir: &Path,
    result_path: &Path,
    graph_path: &Path,
    graph_size: (usize, usize),
) -> Result<FitResult> {
    let model = get_model(settings.data.model_number)?;
    let data_path = data_dir.join(settings.data_filename()?);
    let dataset = load_dataset(&data_path)?;
    let stimuli = dataset.select(model.signature())?;
    let rounding = settings.general.rounding;

    for path in [result_path, graph_path] {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
    }

    let mut out = BufWriter::new(File::create(result_path)?);
    writeln!(out, "Model: {} ({})", model.display_name(), model.name())?;
    writeln!(out, "Data: {}", data_path.display())?;
    writeln!(out)?;
    writeln!(out, "Observed Data")?;
    writeln!(out)?;
    ResultTable::observed(&dataset, &stimuli, rounding)?.write_to(&mut out)?;
    writeln!(out)?;

    let options = settings.to_fit_options();
    let (result, mut out) = if settings.general.verbose {
        let reporter = VerboseReporter::new(out, stimuli.clone(), rounding);
        let observer = |evaluation: &Evaluation<'_>| reporter.observe(evaluation);
        let result = FitDriver::new(model, &dataset, options)?
            .with_observer(&observer)
            .run();
        (result, reporter.into_inner())
    } else {
        (fit(model, &dataset, options), out)
    };
    let result = result?;

    write_fit_report(&mut out, &dataset, &result, rounding, settings.general.verbose)?;

    let graph = GraphData::build(model, &dataset, &result, &settings.graph)?;
    writeln!(out)?;
    write!(out, "{}", render_ascii_graph(&graph, graph_size.0, graph_size.1))?;
    out.flush()?;
    graph.write_json(graph_path)?;

    info!(
        result = %result_path.display(),
        graph = %graph_path.display(),
        "wrote fit output"
    );
    Ok(result)
}
