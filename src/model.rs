//! Model trait and model output.
//!
//! A model is a pure function from an ordered list of parameter groups to the
//! same groups plus a composite prediction. Each model declares its formal
//! signature up front so the fitting code never has to inspect arguments at
//! runtime to learn their names or shapes.

use serde::Serialize;

use crate::error::{FitError, Result};
use crate::parameters::{Arity, FormalParameter, ParameterValue};

/// A perceptual model that can be fit to composite data.
///
/// Implementations must be deterministic and free of I/O: the same arguments
/// always produce the same output.
pub trait Model: Send + Sync {
    /// Registry name, e.g. `flmpModel`.
    fn name(&self) -> &'static str;

    /// Longer human readable name used as a graph title.
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Ordered formal parameters. The first one varies fastest in the
    /// composite prediction.
    fn signature(&self) -> &'static [FormalParameter];

    /// Evaluates the model.
    ///
    /// # Arguments
    ///
    /// * `parameters` - One group per formal parameter, in signature order
    ///
    /// # Returns
    ///
    /// * The parameters (echoed) and the composite prediction
    fn evaluate(&self, parameters: &[ParameterValue]) -> Result<ModelOutput>;
}

/// Everything a model returns: echoed parameters plus the composite prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelOutput {
    pub parameters: Vec<ParameterValue>,
    pub prediction: Vec<f64>,
}

impl ModelOutput {
    pub fn new(parameters: Vec<ParameterValue>, prediction: Vec<f64>) -> Self {
        Self {
            parameters,
            prediction,
        }
    }

    /// Flatten parameters and prediction into one comparison vector.
    ///
    /// Vectors are expanded in place and scalars appended as-is, matching
    /// the layout of the observed vector built by the fit driver.
    pub fn comparison_vector(&self) -> Vec<f64> {
        self.parameters
            .iter()
            .flat_map(|p| p.as_slice().iter().copied())
            .chain(self.prediction.iter().copied())
            .collect()
    }
}

/// Check that `parameters` matches the model's signature.
///
/// The count must match exactly. A scalar formal parameter must receive one
/// value; a vector formal parameter accepts a scalar, which is treated as a
/// one-level vector.
pub fn check_arguments(model: &dyn Model, parameters: &[ParameterValue]) -> Result<()> {
    let signature = model.signature();
    if parameters.len() != signature.len() {
        return Err(FitError::ModelInvocation {
            model: model.name().to_string(),
            message: format!(
                "expected {} parameters ({}), got {}",
                signature.len(),
                signature
                    .iter()
                    .map(|p| p.name)
                    .collect::<Vec<_>>()
                    .join(", "),
                parameters.len()
            ),
        });
    }

    for (formal, value) in signature.iter().zip(parameters) {
        if formal.arity == Arity::Scalar && value.len() != 1 {
            return Err(FitError::ModelInvocation {
                model: model.name().to_string(),
                message: format!(
                    "parameter '{}' must be a scalar, got {} values",
                    formal.name,
                    value.len()
                ),
            });
        }
    }

    Ok(())
}

/// Reject predictions containing NaN or infinity.
pub fn check_prediction(model: &dyn Model, prediction: &[f64]) -> Result<()> {
    match prediction.iter().position(|v| !v.is_finite()) {
        Some(position) => Err(FitError::ModelInvocation {
            model: model.name().to_string(),
            message: format!("non-finite prediction at composite position {}", position),
        }),
        None => Ok(()),
    }
}
