//! Example model: the plain product of two stimulus parameters.
//!
//! Kept as a template for adding new models.

use super::cross;
use crate::error::Result;
use crate::model::{check_arguments, Model, ModelOutput};
use crate::parameters::{FormalParameter, ParameterValue};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductModel;

const SIGNATURE: &[FormalParameter] = &[
    FormalParameter::vector("parameter1"),
    FormalParameter::vector("parameter2"),
];

impl Model for ProductModel {
    fn name(&self) -> &'static str {
        "exampleModel"
    }

    fn display_name(&self) -> &'static str {
        "Example Product Model"
    }

    fn signature(&self) -> &'static [FormalParameter] {
        SIGNATURE
    }

    fn evaluate(&self, parameters: &[ParameterValue]) -> Result<ModelOutput> {
        check_arguments(self, parameters)?;

        let prediction = cross(
            parameters[0].as_slice(),
            parameters[1].as_slice(),
            |p1, p2| Ok(p1 * p2),
        )?;

        Ok(ModelOutput::new(parameters.to_vec(), prediction))
    }
}
