//! Step calculation for the Levenberg-Marquardt algorithm.
//!
//! This module provides functionality for computing the Levenberg-Marquardt step,
//! which blends the Gauss-Newton and gradient descent steps.

use ndarray::{Array1, Array2};

use crate::utils::matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};

/// Result of a Levenberg-Marquardt step calculation.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// The calculated step vector
    pub step: Array1<f64>,

    /// The predicted reduction in cost function value
    pub predicted_reduction: f64,

    /// The damping parameter used to calculate the step
    pub lambda: f64,
}

/// Handles step calculation for the Levenberg-Marquardt algorithm.
pub struct LmStep;

impl LmStep {
    /// Calculates the Levenberg-Marquardt step.
    ///
    /// Solves `(JᵀJ + λI) δ = -Jᵀr` by Cholesky factorisation.
    ///
    /// # Arguments
    ///
    /// * `j_t_j` - The JᵀJ matrix at the current position
    /// * `gradient` - The Jᵀr vector at the current position
    /// * `lambda` - The damping parameter
    ///
    /// # Returns
    ///
    /// * The step, or `None` if the damped system is not positive definite
    pub fn calculate_step(
        j_t_j: &Array2<f64>,
        gradient: &Array1<f64>,
        lambda: f64,
    ) -> Option<StepResult> {
        let mut augmented = j_t_j.clone();
        augmented.diag_mut().mapv_inplace(|d| d + lambda);

        let cholesky = ndarray_to_nalgebra(&augmented).cholesky()?;
        let rhs = -ndarray_vec_to_nalgebra(gradient);
        let step = nalgebra_vec_to_ndarray(&cholesky.solve(&rhs));

        if step.iter().any(|s| !s.is_finite()) {
            return None;
        }

        let predicted_reduction = Self::predicted_reduction(j_t_j, gradient, &step);

        Some(StepResult {
            step,
            predicted_reduction,
            lambda,
        })
    }

    /// Calculates the reduction in cost predicted by the linear model.
    ///
    /// With cost `‖r‖²`, the model `‖r + Jδ‖²` predicts a reduction of
    /// `-2δ·Jᵀr - δᵀJᵀJδ`.
    pub fn predicted_reduction(j_t_j: &Array2<f64>, gradient: &Array1<f64>, step: &Array1<f64>) -> f64 {
        -2.0 * step.dot(gradient) - step.dot(&j_t_j.dot(step))
    }
}
