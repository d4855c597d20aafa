//! # Parameter System
//!
//! Models are called with an ordered list of parameter groups, while the
//! solver works on a single flat vector. This module holds both
//! representations and the codec between them.
//!
//! ## Core Components
//!
//! - [`ParameterValue`]: a scalar or per-level vector in model-call form
//! - [`FormalParameter`] and [`Arity`]: the declared signature of a model
//! - [`flatten`], [`unflatten`] and [`ParameterIndex`]: the parameter codec
//! - [`Bounds`] and [`BoundsTransform`]: the `[0, 1]` box used during fitting
//!
//! ## Example Usage
//!
//! ```rust
//! use modelfit_rs::parameters::{flatten, unflatten, ParameterValue};
//!
//! let groups = vec![
//!     ParameterValue::Vector(vec![0.01, 0.04, 0.23]),
//!     ParameterValue::Scalar(0.5),
//! ];
//!
//! let (flat, index) = flatten(&groups);
//! assert_eq!(index.boundaries(), &[0, 3, 4]);
//!
//! let restored = unflatten(&flat, &index).unwrap();
//! assert_eq!(restored, groups);
//! ```

pub mod bounds;
pub mod codec;
pub mod value;

// Re-export key types
pub use bounds::{Bounds, BoundsError, BoundsTransform};
pub use codec::{flatten, unflatten, ParameterIndex};
pub use value::{round_to, Arity, FormalParameter, ParameterValue};
