//! Problem definition trait.
//!
//! This module defines the `Problem` trait, which represents a nonlinear
//! least squares problem to be solved with the Levenberg-Marquardt algorithm.

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A trait representing a nonlinear least squares problem.
///
/// This trait defines the interface for problems that can be solved using
/// the Levenberg-Marquardt algorithm.
pub trait Problem {
    /// Evaluate the residuals at the given parameters.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values at which to evaluate the residuals
    ///
    /// # Returns
    ///
    /// * A vector of residuals, or an error if the evaluation fails
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>>;

    /// Get the number of parameters in the problem.
    fn parameter_count(&self) -> usize;

    /// Get the number of residuals in the problem.
    fn residual_count(&self) -> usize;

    /// Evaluate the Jacobian matrix at `params`, where the residuals are
    /// already known to be `residuals`.
    ///
    /// The Jacobian is the matrix of partial derivatives of the residuals with respect
    /// to the parameters.
    ///
    /// # Default Implementation
    ///
    /// Forward finite differences, costing one residual evaluation per parameter.
    fn jacobian(&self, params: &Array1<f64>, residuals: &Array1<f64>) -> Result<Array2<f64>>
    where
        Self: Sized,
    {
        crate::utils::finite_difference::jacobian_at(self, params, residuals, None)
    }

    /// Check if this problem provides a custom Jacobian implementation.
    ///
    /// The solver uses this to decide whether a Jacobian costs residual
    /// evaluations.
    fn has_custom_jacobian(&self) -> bool {
        false
    }
}
