//! Residual evaluation.
//!
//! The [`ResidualEvaluator`] turns a flat optimization vector into residuals
//! against the observed vector: unflatten, call the model, flatten the
//! model's echoed parameters and prediction, subtract.

use std::cell::Cell;
use std::fmt;

use ndarray::Array1;
use tracing::debug;

use crate::error::{FitError, Result};
use crate::model::{Model, ModelOutput};
use crate::parameters::{unflatten, ParameterIndex, ParameterValue};
use crate::problem::Problem;

/// One residual evaluation, as seen by an observer.
#[derive(Debug)]
pub struct Evaluation<'a> {
    /// 1-based evaluation count.
    pub call: usize,
    pub parameters: &'a [ParameterValue],
    pub prediction: &'a [f64],
    pub residuals: &'a Array1<f64>,
    pub rmsd: f64,
}

/// Callback invoked after every successful evaluation.
pub type Observer<'a> = &'a dyn Fn(&Evaluation<'_>);

/// Model output together with its residuals.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub output: ModelOutput,
    pub residuals: Array1<f64>,
    pub rmsd: f64,
}

/// Residual function for one fit.
pub struct ResidualEvaluator<'a> {
    model: &'a dyn Model,
    index: ParameterIndex,
    observed: Array1<f64>,
    observer: Option<Observer<'a>>,
    calls: Cell<usize>,
}

impl fmt::Debug for ResidualEvaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResidualEvaluator")
            .field("model", &self.model.name())
            .field("index", &self.index)
            .field("observed", &self.observed)
            .field("calls", &self.calls.get())
            .finish()
    }
}

impl<'a> ResidualEvaluator<'a> {
    pub fn new(model: &'a dyn Model, index: ParameterIndex, observed: Array1<f64>) -> Self {
        Self {
            model,
            index,
            observed,
            observer: None,
            calls: Cell::new(0),
        }
    }

    /// Attach a callback that sees every evaluation.
    pub fn with_observer(mut self, observer: Observer<'a>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn model(&self) -> &'a dyn Model {
        self.model
    }

    pub fn index(&self) -> &ParameterIndex {
        &self.index
    }

    pub fn observed(&self) -> &Array1<f64> {
        &self.observed
    }

    /// Number of evaluations so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Evaluate the model at `flat` and compare with the observed vector.
    pub fn evaluate(&self, flat: &Array1<f64>) -> Result<Evaluated> {
        let call = self.calls.get() + 1;
        self.calls.set(call);

        let parameters = unflatten(flat, &self.index)?;
        let output = self.model.evaluate(&parameters)?;
        let residuals = residuals(&self.observed, &output.comparison_vector())?;

        if let Some(position) = residuals.iter().position(|r| !r.is_finite()) {
            return Err(FitError::ModelInvocation {
                model: self.model.name().to_string(),
                message: format!("non-finite residual at position {}", position),
            });
        }

        let rmsd = rmsd(&residuals);
        debug!(model = self.model.name(), call, rmsd, "evaluated residuals");

        if let Some(observer) = self.observer {
            observer(&Evaluation {
                call,
                parameters: &output.parameters,
                prediction: &output.prediction,
                residuals: &residuals,
                rmsd,
            });
        }

        Ok(Evaluated {
            output,
            residuals,
            rmsd,
        })
    }
}

impl Problem for ResidualEvaluator<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.evaluate(params).map(|evaluated| evaluated.residuals)
    }

    fn parameter_count(&self) -> usize {
        self.index.total_len()
    }

    fn residual_count(&self) -> usize {
        self.observed.len()
    }
}

/// Elementwise `observed - comparison`.
pub fn residuals(observed: &Array1<f64>, comparison: &[f64]) -> Result<Array1<f64>> {
    if observed.len() != comparison.len() {
        return Err(FitError::ShapeMismatch(format!(
            "model output has {} values but the observed vector has {}",
            comparison.len(),
            observed.len()
        )));
    }
    Ok(observed
        .iter()
        .zip(comparison)
        .map(|(o, c)| o - c)
        .collect())
}

/// Root-mean-square of the residuals; zero for an empty vector.
pub fn rmsd(residuals: &Array1<f64>) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt()
}
