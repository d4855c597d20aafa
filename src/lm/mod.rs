//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides a bounded Levenberg-Marquardt solver for nonlinear
//! least-squares problems. Box constraints are handled by a change of
//! variables (see [`bounded`]), so the core iteration in [`algorithm`] is
//! unconstrained.

pub mod algorithm;
pub mod bounded;
pub mod config;
pub mod convergence;
pub mod step;
pub mod trust_region;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use bounded::BoundedProblem;
pub use config::LmConfig;
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
pub use step::{LmStep, StepResult};
pub use trust_region::TrustRegion;
