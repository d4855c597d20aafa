//! Numerical helpers shared by the solver.

pub mod finite_difference;
pub mod matrix_convert;

pub use finite_difference::jacobian_at;
pub use matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};
