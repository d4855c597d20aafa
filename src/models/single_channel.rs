//! Single-Channel model.
//!
//! Only one source of information is used on each trial; the free `bias`
//! is the probability of attending to the auditory channel:
//!
//! p(a, v) = a*bias + v*(1-bias)

use super::cross;
use crate::error::Result;
use crate::model::{check_arguments, check_prediction, Model, ModelOutput};
use crate::parameters::{FormalParameter, ParameterValue};

/// Linear-bias model over `a_params` (fastest), `v_params` and a scalar `bias`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleChannelModel;

const SIGNATURE: &[FormalParameter] = &[
    FormalParameter::vector("a_params"),
    FormalParameter::vector("v_params"),
    FormalParameter::scalar("bias"),
];

impl Model for SingleChannelModel {
    fn name(&self) -> &'static str {
        "scModel"
    }

    fn display_name(&self) -> &'static str {
        "Single-Channel Model"
    }

    fn signature(&self) -> &'static [FormalParameter] {
        SIGNATURE
    }

    fn evaluate(&self, parameters: &[ParameterValue]) -> Result<ModelOutput> {
        check_arguments(self, parameters)?;

        let bias = parameters[2].as_slice()[0];
        let prediction = cross(
            parameters[0].as_slice(),
            parameters[1].as_slice(),
            |a, v| Ok(a * bias + v * (1.0 - bias)),
        )?;
        check_prediction(self, &prediction)?;

        Ok(ModelOutput::new(parameters.to_vec(), prediction))
    }
}
