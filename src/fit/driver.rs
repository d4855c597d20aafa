//! The fit driver.
//!
//! A [`FitDriver`] owns one fit from start to finish:
//!
//! ```text
//! Initialized --run--> Fitting --> Converged
//!                              \-> Failed
//! ```
//!
//! Construction validates the data and builds the initial flat vector and
//! the observed vector. [`FitDriver::run`] hands the residual evaluator to
//! the bounded solver and unpacks its answer.

use ndarray::Array1;
use serde::Serialize;
use tracing::{info, warn};

use crate::data::Dataset;
use crate::error::{FitError, Result};
use crate::lm::{ConvergenceStatus, LevenbergMarquardt};
use crate::model::Model;
use crate::parameters::{flatten, unflatten, Bounds, FormalParameter, ParameterIndex, ParameterValue};

use super::evaluator::{residuals, rmsd, Observer, ResidualEvaluator};
use super::options::FitOptions;

/// Lifecycle of a [`FitDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitState {
    Initialized,
    Fitting,
    Converged,
    Failed,
}

/// Optimized parameters and diagnostics of a finished fit.
#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    pub model_name: &'static str,
    pub signature: &'static [FormalParameter],
    /// Optimized parameters in model-call form.
    pub parameters: Vec<ParameterValue>,
    /// Composite prediction at the optimum.
    pub prediction: Vec<f64>,
    /// `observed - predicted` at the optimum, over the full observed vector.
    pub residuals: Vec<f64>,
    pub rmsd: f64,
    pub status: ConvergenceStatus,
    pub iterations: usize,
    pub evaluations: usize,
    pub message: String,
}

impl FitResult {
    /// True when a tolerance, rather than a budget, ended the fit.
    pub fn converged(&self) -> bool {
        self.status.is_converged()
    }

    /// Look up an optimized parameter by formal name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.signature
            .iter()
            .position(|formal| formal.name == name)
            .and_then(|i| self.parameters.get(i))
    }

    /// Formal names paired with optimized values.
    pub fn named_parameters(&self) -> impl Iterator<Item = (&'static str, &ParameterValue)> {
        self.signature.iter().map(|f| f.name).zip(&self.parameters)
    }
}

/// Runs one bounded least-squares fit of a model to a dataset.
pub struct FitDriver<'a> {
    model: &'a dyn Model,
    initial: Array1<f64>,
    index: ParameterIndex,
    observed: Array1<f64>,
    options: FitOptions,
    observer: Option<Observer<'a>>,
    state: FitState,
}

impl<'a> FitDriver<'a> {
    /// Validate `dataset` against `model` and prepare the fit.
    ///
    /// The free parameters are the stimulus parameters named by the model's
    /// signature; their observed values are both the starting point and the
    /// leading part of the observed vector, followed by the composite.
    pub fn new(model: &'a dyn Model, dataset: &Dataset, options: FitOptions) -> Result<Self> {
        options.validate()?;
        let selected = dataset.select(model.signature())?;

        let groups: Vec<ParameterValue> = selected.iter().map(|p| p.to_parameter_value()).collect();
        let (initial, index) = flatten(&groups);

        let observed: Array1<f64> = initial
            .iter()
            .chain(&dataset.composite.values)
            .copied()
            .collect();

        Ok(Self {
            model,
            initial,
            index,
            observed,
            options,
            observer: None,
            state: FitState::Initialized,
        })
    }

    /// Attach a per-evaluation callback.
    pub fn with_observer(mut self, observer: Observer<'a>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> FitState {
        self.state
    }

    pub fn model(&self) -> &'a dyn Model {
        self.model
    }

    /// Initial flat parameter vector.
    pub fn initial(&self) -> &Array1<f64> {
        &self.initial
    }

    pub fn index(&self) -> &ParameterIndex {
        &self.index
    }

    /// Free parameters followed by the composite observation.
    pub fn observed(&self) -> &Array1<f64> {
        &self.observed
    }

    /// Run the fit. Can be called once.
    pub fn run(&mut self) -> Result<FitResult> {
        if self.state != FitState::Initialized {
            return Err(FitError::InvalidState(format!(
                "fit driver for '{}' has already run (state {:?})",
                self.model.name(),
                self.state
            )));
        }

        self.state = FitState::Fitting;
        match self.solve() {
            Ok(result) => {
                self.state = FitState::Converged;
                Ok(result)
            }
            Err(cause) => {
                self.state = FitState::Failed;
                Err(FitError::fit_failed(self.model.name(), cause))
            }
        }
    }

    fn solve(&self) -> Result<FitResult> {
        let mut evaluator =
            ResidualEvaluator::new(self.model, self.index.clone(), self.observed.clone());
        if let Some(observer) = self.observer {
            evaluator = evaluator.with_observer(observer);
        }

        let solver = LevenbergMarquardt::with_config(self.options.solver_config());
        let bounds = vec![Bounds::unit(); self.index.total_len()];
        let solution = solver.minimize_bounded(&evaluator, self.initial.clone(), &bounds)?;

        let parameters = unflatten(&solution.params, &self.index)?;
        let output = self.model.evaluate(&parameters)?;
        let final_residuals = residuals(&self.observed, &output.comparison_vector())?;
        let final_rmsd = rmsd(&final_residuals);

        info!(
            model = self.model.name(),
            status = ?solution.status,
            rmsd = final_rmsd,
            iterations = solution.iterations,
            evaluations = evaluator.calls(),
            "fit finished"
        );
        if solution.status.is_budget_exhausted() {
            warn!(
                model = self.model.name(),
                "fit stopped before convergence: {}", solution.status
            );
        }

        Ok(FitResult {
            model_name: self.model.name(),
            signature: self.model.signature(),
            parameters: output.parameters,
            prediction: output.prediction,
            residuals: final_residuals.to_vec(),
            rmsd: final_rmsd,
            status: solution.status,
            iterations: solution.iterations,
            evaluations: evaluator.calls(),
            message: solution.message,
        })
    }
}

/// Fit `model` to `dataset` in one call.
pub fn fit(model: &dyn Model, dataset: &Dataset, options: FitOptions) -> Result<FitResult> {
    FitDriver::new(model, dataset, options)?.run()
}
