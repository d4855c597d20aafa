//! Built-in models and the model registry.
//!
//! The registry is a fixed, ordered list. Indices are stable and are what the
//! settings file and the `--model` flag refer to:
//!
//! | Index | Name           | Signature                      |
//! |-------|----------------|--------------------------------|
//! | 0     | `exampleModel` | `parameter1`, `parameter2`     |
//! | 1     | `flmpModel`    | `a_params`, `v_params`         |
//! | 2     | `scModel`      | `a_params`, `v_params`, `bias` |
//!
//! New models are added by implementing [`Model`] and appending to
//! [`REGISTRY`].

use serde::Serialize;

use crate::error::{FitError, Result};
use crate::model::Model;
use crate::parameters::FormalParameter;

mod flmp;
mod product;
mod single_channel;

// Re-export the models
pub use flmp::FlmpModel;
pub use product::ProductModel;
pub use single_channel::SingleChannelModel;

/// Every available model, in registry order.
pub static REGISTRY: [&dyn Model; 3] = [&ProductModel, &FlmpModel, &SingleChannelModel];

/// Registry entry as shown to users.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    pub index: usize,
    pub name: &'static str,
    pub display_name: &'static str,
    pub signature: &'static [FormalParameter],
}

/// List the registry in order.
pub fn list_models() -> Vec<ModelDescriptor> {
    REGISTRY
        .iter()
        .enumerate()
        .map(|(index, model)| ModelDescriptor {
            index,
            name: model.name(),
            display_name: model.display_name(),
            signature: model.signature(),
        })
        .collect()
}

/// Select a model by registry index.
pub fn get_model(index: usize) -> Result<&'static dyn Model> {
    REGISTRY
        .get(index)
        .copied()
        .ok_or(FitError::IndexOutOfRange {
            index,
            len: REGISTRY.len(),
        })
}

/// Select a model by its registry name, returning its index alongside.
pub fn find_model(name: &str) -> Option<(usize, &'static dyn Model)> {
    REGISTRY
        .iter()
        .copied()
        .enumerate()
        .find(|(_, model)| model.name() == name)
}

/// Evaluate `f` over every (first, second) pair, first parameter fastest.
pub(crate) fn cross<F>(first: &[f64], second: &[f64], mut f: F) -> Result<Vec<f64>>
where
    F: FnMut(f64, f64) -> Result<f64>,
{
    let mut values = Vec::with_capacity(first.len() * second.len());
    for &s in second {
        for &x in first {
            values.push(f(x, s)?);
        }
    }
    Ok(values)
}
