//! Parameter values in model-call form and formal parameter signatures.
//!
//! A model receives its arguments as an ordered list of [`ParameterValue`]s,
//! each either a bare scalar (such as a response bias) or a vector holding one
//! value per level of a stimulus dimension. Each model declares the expected
//! shape of those arguments through a list of [`FormalParameter`]s.

use serde::{Deserialize, Serialize};

/// Whether a formal parameter takes a single value or one value per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    Scalar,
    Vector,
}

/// One entry of a model's ordered formal-parameter signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormalParameter {
    /// Name matched against stimulus parameter names in the data.
    pub name: &'static str,

    /// Scalar or per-level vector.
    pub arity: Arity,
}

impl FormalParameter {
    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            arity: Arity::Scalar,
        }
    }

    pub const fn vector(name: &'static str) -> Self {
        Self {
            name,
            arity: Arity::Vector,
        }
    }
}

/// A parameter group in model-call form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// A single free value, e.g. a bias term.
    Scalar(f64),

    /// One value per level of a stimulus dimension.
    Vector(Vec<f64>),
}

impl ParameterValue {
    /// Build a group from a slice, unwrapping a single element to a scalar.
    pub fn from_slice(values: &[f64]) -> Self {
        match values {
            [single] => ParameterValue::Scalar(*single),
            _ => ParameterValue::Vector(values.to_vec()),
        }
    }

    /// Number of flat elements in this group; a scalar counts as one.
    pub fn len(&self) -> usize {
        match self {
            ParameterValue::Scalar(_) => 1,
            ParameterValue::Vector(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ParameterValue::Scalar(_))
    }

    /// View the group as a slice regardless of its variant.
    pub fn as_slice(&self) -> &[f64] {
        match self {
            ParameterValue::Scalar(value) => std::slice::from_ref(value),
            ParameterValue::Vector(values) => values.as_slice(),
        }
    }

    /// The scalar value, if this group holds exactly one element.
    pub fn as_scalar(&self) -> Option<f64> {
        match self.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    /// Round every element to `digits` decimal places.
    pub fn rounded(&self, digits: u32) -> Self {
        match self {
            ParameterValue::Scalar(value) => ParameterValue::Scalar(round_to(*value, digits)),
            ParameterValue::Vector(values) => {
                ParameterValue::Vector(values.iter().map(|v| round_to(*v, digits)).collect())
            }
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(values: Vec<f64>) -> Self {
        ParameterValue::Vector(values)
    }
}

/// Round `value` to `digits` decimal places.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}
