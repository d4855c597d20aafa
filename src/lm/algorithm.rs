//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core iteration for nonlinear least-squares
//! optimization: a forward-difference Jacobian, a gain-ratio trust region
//! for the damping parameter, and hard budgets on accepted steps and
//! residual evaluations.

use ndarray::Array1;
use std::fmt;
use tracing::trace;

use crate::error::{FitError, Result};
use crate::problem::Problem;

use super::config::LmConfig;
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};
use super::step::LmStep;
use super::trust_region::TrustRegion;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted steps
    pub iterations: usize,

    /// Number of residual evaluations
    pub func_evals: usize,

    /// Why the solver stopped
    pub status: ConvergenceStatus,

    /// Whether a convergence tolerance was met
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of accepted steps.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the maximum number of residual evaluations.
    pub fn with_max_evaluations(mut self, max_evaluations: Option<usize>) -> Self {
        self.config.max_evaluations = max_evaluations;
        self
    }

    /// Set the tolerance for relative change in cost.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for gradient norm.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the factor by which to increase lambda.
    pub fn with_lambda_up_factor(mut self, factor: f64) -> Self {
        self.config.lambda_up_factor = factor;
        self
    }

    /// Set the factor by which to decrease lambda.
    pub fn with_lambda_down_factor(mut self, factor: f64) -> Self {
        self.config.lambda_down_factor = factor;
        self
    }

    /// Set the minimum value for lambda.
    pub fn with_min_lambda(mut self, min_lambda: f64) -> Self {
        self.config.min_lambda = min_lambda;
        self
    }

    /// Set the maximum value for lambda.
    pub fn with_max_lambda(mut self, max_lambda: f64) -> Self {
        self.config.max_lambda = max_lambda;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// Budgets and damping saturation end the run with a non-converged
    /// [`ConvergenceStatus`]; only a failing residual evaluation or an
    /// unsolvable system at maximum damping is an error.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Returns
    ///
    /// * `Result<LmResult>` - The result of the optimization
    pub fn minimize<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
    ) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(FitError::ShapeMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }

        let config = &self.config;
        let criteria = ConvergenceCriteria::new(config.xtol, config.ftol, config.gtol);
        let mut region = TrustRegion::from_config(config);

        let mut params = initial_params;
        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;
        let mut iterations = 0;

        let jacobian_evals = if problem.has_custom_jacobian() { 0 } else { n_params };

        let status = 'solve: loop {
            if iterations >= config.max_iterations {
                break ConvergenceStatus::MaxIterationsReached;
            }
            // A Jacobian is only worth computing if a trial step can follow it.
            if !config.can_afford(func_evals, jacobian_evals + 1) {
                break ConvergenceStatus::MaxEvaluationsReached;
            }

            func_evals += jacobian_evals;
            let jacobian = problem.jacobian(&params, &residuals)?;

            let gradient = jacobian.t().dot(&residuals);
            if criteria.gradient_converged(&gradient) {
                break ConvergenceStatus::GradientConvergence;
            }
            let j_t_j = jacobian.t().dot(&jacobian);

            let (step, new_residuals, new_cost) = loop {
                let Some(step) = LmStep::calculate_step(&j_t_j, &gradient, region.lambda) else {
                    if region.is_saturated() {
                        return Err(FitError::LinearAlgebra(format!(
                            "damped normal equations are not positive definite at lambda = {:e}",
                            region.lambda
                        )));
                    }
                    region.increase();
                    continue;
                };

                if config.evaluations_exhausted(func_evals) {
                    break 'solve ConvergenceStatus::MaxEvaluationsReached;
                }
                let trial = &params + &step.step;
                let trial_residuals = problem.eval(&trial)?;
                func_evals += 1;
                let trial_cost = sum_of_squares(&trial_residuals);

                let gain_ratio = TrustRegion::gain_ratio(cost, trial_cost, step.predicted_reduction);
                let saturated = region.is_saturated();
                if region.update_lambda(gain_ratio) {
                    break (step.step, trial_residuals, trial_cost);
                }
                let status =
                    criteria.check_rejected(&params, &step.step, cost, step.predicted_reduction);
                if status.is_terminated() {
                    break 'solve status;
                }
                if saturated {
                    break 'solve ConvergenceStatus::DampingSaturated;
                }
            };

            let status = criteria.check_step(&params, &step, cost, new_cost);

            params = params + &step;
            residuals = new_residuals;
            cost = new_cost;
            iterations += 1;

            trace!(iteration = iterations, cost, lambda = region.lambda, "accepted step");

            if status.is_terminated() {
                break status;
            }
        };

        Ok(LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success: status.is_converged(),
            message: status.description().to_string(),
            status,
        })
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r.powi(2)).sum()
}
