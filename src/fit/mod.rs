//! Fitting: the residual evaluator, the fit driver and its options.

pub mod driver;
pub mod evaluator;
pub mod options;

pub use driver::{fit, FitDriver, FitResult, FitState};
pub use evaluator::{residuals, rmsd, Evaluated, Evaluation, Observer, ResidualEvaluator};
pub use options::FitOptions;
