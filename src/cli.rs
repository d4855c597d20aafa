//! Command-line parsing for the `modelfit` binary.
//!
//! Parsing lives here and dispatch in [`crate::app`]; neither touches the
//! fitting code directly.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "modelfit",
    version,
    about = "Fit perceptual models (FLMP, Single-Channel) to proportion data"
)]
pub struct Cli {
    /// Log level filter (error, warn, info, debug, trace). `RUST_LOG` wins when set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available models with their registry index and parameters.
    Models,
    /// Fit a model to a data file and write the report and graph.
    Fit(FitArgs),
}

/// Options for `modelfit fit`. Every flag overrides the settings file.
#[derive(Debug, Parser, Clone, Default)]
pub struct FitArgs {
    /// Settings file (JSON).
    #[arg(short = 's', long)]
    pub settings: Option<PathBuf>,

    /// Data file name, resolved against `--data-dir`.
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Model to fit, by registry index or name (see `modelfit models`).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Result file name, resolved against `--results-dir`.
    #[arg(short = 'o', long)]
    pub output: Option<String>,

    /// Graph file name (JSON), resolved against `--results-dir`.
    #[arg(short = 'g', long)]
    pub graph: Option<String>,

    /// Write the table of every residual evaluation to the result file.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Digits after the decimal point in the report.
    #[arg(long)]
    pub rounding: Option<u32>,

    /// Cap on residual evaluations.
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Directory holding data files.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory receiving result and graph files.
    #[arg(long, default_value = "results")]
    pub results_dir: PathBuf,

    /// Text graph width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Text graph height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}
