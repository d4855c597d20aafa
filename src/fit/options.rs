//! Options for a single fit.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::lm::LmConfig;

/// User-facing fit options.
///
/// `max_iterations` is a hard cap on residual evaluations. It takes
/// precedence over `solver.max_evaluations`; leaving both unset uses the
/// solver's own iteration limit only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    pub max_iterations: Option<usize>,
    pub solver: LmConfig,
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_solver(mut self, solver: LmConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Reject option combinations the solver cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == Some(0) || self.solver.max_evaluations == Some(0) {
            return Err(FitError::Validation(
                "maxIterations must allow at least one evaluation".to_string(),
            ));
        }
        let solver = &self.solver;
        for (name, value) in [("ftol", solver.ftol), ("xtol", solver.xtol), ("gtol", solver.gtol)] {
            if !value.is_finite() || value < 0.0 {
                return Err(FitError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(solver.min_lambda > 0.0 && solver.min_lambda <= solver.max_lambda) {
            return Err(FitError::Validation(format!(
                "damping range [{}, {}] is invalid",
                solver.min_lambda, solver.max_lambda
            )));
        }
        Ok(())
    }

    /// The solver configuration with the evaluation cap applied.
    pub fn solver_config(&self) -> LmConfig {
        LmConfig {
            max_evaluations: self.max_iterations.or(self.solver.max_evaluations),
            ..self.solver.clone()
        }
    }
}
