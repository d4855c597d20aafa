//! Observed data: stimulus parameters and the composite observation grid.
//!
//! A [`Dataset`] holds every stimulus parameter read from a data file plus the
//! single [`CompositeObservation`]. A fit selects the parameters named by the
//! model's signature with [`Dataset::select`], which also checks that the
//! composite grid has one value per combination of their levels.

pub mod layout;
pub mod loader;

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};
use crate::parameters::{Arity, FormalParameter, ParameterValue};

pub use layout::CompositeLayout;
pub use loader::{load_dataset, parse_dataset, COMPOSITE_NAME};

/// A named axis of the experiment with one observed proportion per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusParameter {
    /// Matches a model's formal parameter name.
    pub name: String,

    /// Human readable label used in tables and legends.
    pub label: String,

    /// Short prefix for axis tick labels (`A1`, `A2`, ...).
    pub abbreviation: String,

    /// One value in [0, 1] per level.
    pub values: Vec<f64>,
}

impl StimulusParameter {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        abbreviation: impl Into<String>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            abbreviation: abbreviation.into(),
            values,
        }
    }

    /// Check that the series is non-empty and every value is a proportion.
    pub fn validate(&self) -> Result<()> {
        validate_proportions(&self.name, &self.values)
    }

    /// The observed values as a model argument.
    pub fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::from_slice(&self.values)
    }
}

/// The observed dependent variable, laid out per [`CompositeLayout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeObservation {
    pub label: String,
    pub abbreviation: String,
    pub values: Vec<f64>,
}

impl CompositeObservation {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            label: "Composite".to_string(),
            abbreviation: "C".to_string(),
            values,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_proportions(loader::COMPOSITE_NAME, &self.values)
    }
}

/// All stimulus parameters of an experiment plus its composite observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub parameters: Vec<StimulusParameter>,
    pub composite: CompositeObservation,
}

impl Dataset {
    pub fn new(parameters: Vec<StimulusParameter>, composite: CompositeObservation) -> Self {
        Self {
            parameters,
            composite,
        }
    }

    /// Look up a stimulus parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&StimulusParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Select the stimulus parameters named by `signature`, in signature order.
    ///
    /// Fails with [`FitError::Validation`] when a name is missing, a scalar
    /// formal parameter is bound to several values, any series is empty or
    /// outside [0, 1], or the composite length is not the product of the
    /// selected parameters' lengths.
    pub fn select(&self, signature: &[FormalParameter]) -> Result<Vec<&StimulusParameter>> {
        let mut selected = Vec::with_capacity(signature.len());

        for formal in signature {
            let parameter = self.parameter(formal.name).ok_or_else(|| {
                FitError::Validation(format!(
                    "No data provided for model parameter '{}'",
                    formal.name
                ))
            })?;
            parameter.validate()?;

            if formal.arity == Arity::Scalar && parameter.values.len() != 1 {
                return Err(FitError::Validation(format!(
                    "Parameter '{}' is a scalar but has {} values",
                    formal.name,
                    parameter.values.len()
                )));
            }

            selected.push(parameter);
        }

        self.composite.validate()?;

        let layout = CompositeLayout::new(selected.iter().map(|p| p.values.len()).collect());
        if layout.size() != self.composite.values.len() {
            return Err(FitError::Validation(format!(
                "Composite data has {} values, expected {} ({})",
                self.composite.values.len(),
                layout.size(),
                selected
                    .iter()
                    .map(|p| format!("{}={}", p.name, p.values.len()))
                    .collect::<Vec<_>>()
                    .join(" x ")
            )));
        }

        Ok(selected)
    }
}

fn validate_proportions(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(FitError::Validation(format!(
            "No data provided for '{}'",
            name
        )));
    }

    if let Some(bad) = values
        .iter()
        .find(|v| !v.is_finite() || !(0.0..=1.0).contains(*v))
    {
        return Err(FitError::Validation(format!(
            "All data points must be in range [0,1] inclusive; '{}' contains {}",
            name, bad
        )));
    }

    Ok(())
}
