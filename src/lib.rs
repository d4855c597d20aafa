//! # modelfit-rs
//!
//! `modelfit-rs` fits perceptual-identification models to proportion data
//! with a bounded Levenberg-Marquardt solver.
//!
//! The library provides:
//! - Built-in models: the Fuzzy Logical Model of Perception (FLMP), the
//!   Single-Channel Model and a product example, behind a fixed registry
//! - A parameter codec that packs named scalar and vector parameters into
//!   one flat optimization vector and back
//! - A Levenberg-Marquardt solver with [0, 1] bounds on every parameter
//! - Result tables, fit reports and graphs for presenting a fit
//!
//! ## Basic Usage
//!
//! ```
//! use modelfit_rs::data::{CompositeObservation, Dataset, StimulusParameter};
//! use modelfit_rs::fit::{fit, FitOptions};
//! use modelfit_rs::models::FlmpModel;
//!
//! let dataset = Dataset::new(
//!     vec![
//!         StimulusParameter::new("a_params", "Auditory", "A", vec![0.1, 0.5, 0.9]),
//!         StimulusParameter::new("v_params", "Visual", "V", vec![0.2, 0.8]),
//!     ],
//!     CompositeObservation::new(vec![0.03, 0.2, 0.69, 0.31, 0.8, 0.97]),
//! );
//!
//! let result = fit(&FlmpModel, &dataset, FitOptions::default()).unwrap();
//! assert!(result.rmsd < 0.05);
//! ```

pub mod error;

// Parameter codec and bounds
pub mod parameters;

// Observed data and the data file loader
pub mod data;

pub mod model;
pub mod models;

// Solver
pub mod lm;
pub mod problem;
pub mod utils;

pub mod fit;
pub mod report;
pub mod settings;

// Binary support
pub mod app;
pub mod cli;

// Re-exports for convenience
pub use error::{FitError, Result};
pub use fit::{fit, FitDriver, FitOptions, FitResult};
pub use lm::LevenbergMarquardt;
pub use model::{Model, ModelOutput};
pub use models::{get_model, list_models};
pub use problem::Problem;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
