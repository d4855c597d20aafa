//! Box-constrained minimization.
//!
//! [`BoundedProblem`] presents a problem over a box as an unconstrained one
//! in internal coordinates, using [`BoundsTransform`] on every component.
//! Every parameter vector the wrapped problem sees lies inside the box.

use ndarray::Array1;

use crate::error::{FitError, Result};
use crate::parameters::{Bounds, BoundsTransform};
use crate::problem::Problem;

use super::algorithm::{LevenbergMarquardt, LmResult};

/// Fraction of a box's width kept between a starting value and either limit.
///
/// The sine transform has zero slope at the limits, so a start exactly on a
/// bound would never move.
pub const START_MARGIN: f64 = 1e-6;

/// A problem seen through per-parameter sine transforms.
pub struct BoundedProblem<'a, P: Problem> {
    inner: &'a P,
    transforms: Vec<BoundsTransform>,
}

impl<'a, P: Problem> BoundedProblem<'a, P> {
    /// Wrap `inner`, with one bound per parameter.
    pub fn new(inner: &'a P, bounds: &[Bounds]) -> Result<Self> {
        if bounds.len() != inner.parameter_count() {
            return Err(FitError::ShapeMismatch(format!(
                "Expected {} bounds, got {}",
                inner.parameter_count(),
                bounds.len()
            )));
        }
        Ok(Self {
            inner,
            transforms: bounds.iter().copied().map(BoundsTransform::new).collect(),
        })
    }

    /// Map internal coordinates to the box.
    pub fn to_external(&self, internal: &Array1<f64>) -> Array1<f64> {
        internal
            .iter()
            .zip(&self.transforms)
            .map(|(&u, transform)| transform.to_external(u))
            .collect()
    }

    /// Map box coordinates to internal ones; values outside the box are rejected.
    pub fn to_internal(&self, external: &Array1<f64>) -> Result<Array1<f64>> {
        external
            .iter()
            .zip(&self.transforms)
            .enumerate()
            .map(|(i, (&x, transform))| {
                transform
                    .to_internal(x)
                    .map_err(|e| FitError::Validation(format!("parameter {}: {}", i, e)))
            })
            .collect()
    }

    /// Validate a starting point and move on-bound values
    /// [`START_MARGIN`] inside the box.
    pub fn strictly_feasible(&self, external: &Array1<f64>) -> Result<Array1<f64>> {
        self.to_internal(external)?;
        Ok(external
            .iter()
            .zip(&self.transforms)
            .map(|(&x, transform)| transform.bounds().strictly_inside(x, START_MARGIN))
            .collect())
    }
}

impl<P: Problem> Problem for BoundedProblem<'_, P> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.inner.eval(&self.to_external(params))
    }

    fn parameter_count(&self) -> usize {
        self.inner.parameter_count()
    }

    fn residual_count(&self) -> usize {
        self.inner.residual_count()
    }
}

impl LevenbergMarquardt {
    /// Minimize `problem` with every parameter held inside its bounds.
    ///
    /// The initial guess must lie inside the box; values on a limit start
    /// [`START_MARGIN`] inside it. The returned parameters are in external
    /// (bounded) coordinates.
    pub fn minimize_bounded<P: Problem>(
        &self,
        problem: &P,
        initial_params: Array1<f64>,
        bounds: &[Bounds],
    ) -> Result<LmResult> {
        if initial_params.len() != problem.parameter_count() {
            return Err(FitError::ShapeMismatch(format!(
                "Expected {} parameters, got {}",
                problem.parameter_count(),
                initial_params.len()
            )));
        }
        let bounded = BoundedProblem::new(problem, bounds)?;
        let start = bounded.strictly_feasible(&initial_params)?;
        let internal = bounded.to_internal(&start)?;

        let mut result = self.minimize(&bounded, internal)?;
        result.params = bounded.to_external(&result.params);
        Ok(result)
    }
}
