//! Fuzzy Logical Model of Perception.
//!
//! The FLMP combines auditory and visual support multiplicatively and
//! normalises with the relative goodness rule:
//!
//! p(a, v) = a*v / (a*v + (1-a)*(1-v))

use super::cross;
use crate::error::{FitError, Result};
use crate::model::{check_arguments, Model, ModelOutput};
use crate::parameters::{FormalParameter, ParameterValue};

/// FLMP over auditory (`a_params`, fastest) and visual (`v_params`) levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlmpModel;

const SIGNATURE: &[FormalParameter] = &[
    FormalParameter::vector("a_params"),
    FormalParameter::vector("v_params"),
];

impl FlmpModel {
    /// Relative goodness of a single (a, v) pair.
    ///
    /// Returns `None` when the denominator vanishes (a=1,v=0 or a=0,v=1).
    pub fn combine(a: f64, v: f64) -> Option<f64> {
        let support = a * v;
        let denominator = support + (1.0 - a) * (1.0 - v);
        if denominator == 0.0 {
            None
        } else {
            Some(support / denominator)
        }
    }
}

impl Model for FlmpModel {
    fn name(&self) -> &'static str {
        "flmpModel"
    }

    fn display_name(&self) -> &'static str {
        "Fuzzy Logical Model of Perception"
    }

    fn signature(&self) -> &'static [FormalParameter] {
        SIGNATURE
    }

    fn evaluate(&self, parameters: &[ParameterValue]) -> Result<ModelOutput> {
        check_arguments(self, parameters)?;

        let prediction = cross(
            parameters[0].as_slice(),
            parameters[1].as_slice(),
            |a, v| {
                Self::combine(a, v).ok_or_else(|| FitError::ModelInvocation {
                    model: self.name().to_string(),
                    message: format!("undefined relative goodness at a={}, v={}", a, v),
                })
            },
        )?;

        Ok(ModelOutput::new(parameters.to_vec(), prediction))
    }
}
