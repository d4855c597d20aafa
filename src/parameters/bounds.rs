//! Box constraints for fitted parameters
//!
//! Every free parameter in a fit is a proportion, so the optimizer works on a
//! closed box. The Minuit-style sine transform lets the solver step freely in
//! an unbounded internal space while every external value it evaluates stays
//! inside the box.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when working with parameter bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundsError {
    #[error("Invalid bounds: min ({min}) must not exceed max ({max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("Parameter value {value} is outside bounds: [{min}, {max}]")]
    ValueOutsideBounds { value: f64, min: f64, max: f64 },

    #[error("Non-finite parameter value is not allowed")]
    NonFiniteValue,
}

/// Closed interval `[min, max]` for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unit()
    }
}

impl Bounds {
    /// Create bounds, rejecting `min > max` and non-finite limits
    ///
    /// # Examples
    ///
    /// ```
    /// use modelfit_rs::parameters::bounds::Bounds;
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert_eq!(bounds.min, 0.0);
    /// assert_eq!(bounds.max, 10.0);
    /// ```
    pub fn new(min: f64, max: f64) -> Result<Self, BoundsError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(BoundsError::NonFiniteValue);
        }
        if min > max {
            return Err(BoundsError::InvalidBounds { min, max });
        }

        Ok(Self { min, max })
    }

    /// The `[0, 1]` box used for every proportion parameter
    pub const fn unit() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    /// Check if a value is within the bounds (inclusive)
    pub fn is_within_bounds(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value to be within the bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Move `value` at least `margin * range` away from either limit
    ///
    /// A box narrower than twice the margin collapses to its midpoint.
    ///
    /// ```
    /// use modelfit_rs::parameters::bounds::Bounds;
    ///
    /// let unit = Bounds::unit();
    /// assert_eq!(unit.strictly_inside(0.0, 1e-3), 1e-3);
    /// assert_eq!(unit.strictly_inside(0.5, 1e-3), 0.5);
    /// ```
    pub fn strictly_inside(&self, value: f64, margin: f64) -> f64 {
        let gap = margin * self.range();
        if self.range() <= 2.0 * gap {
            return self.min + self.range() / 2.0;
        }
        value.clamp(self.min + gap, self.max - gap)
    }
}

/// Sine transform between internal (unbounded) and external (bounded) values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsTransform {
    bounds: Bounds,
}

impl BoundsTransform {
    pub fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Map an internal value into the box: `min + (sin(u) + 1) * range / 2`
    ///
    /// The result is clamped so rounding can never leave the box.
    pub fn to_external(&self, internal_value: f64) -> f64 {
        let external =
            self.bounds.min + (internal_value.sin() + 1.0) * self.bounds.range() / 2.0;
        self.bounds.clamp(external)
    }

    /// Map an external value in the box to its internal value in `[-pi/2, pi/2]`
    pub fn to_internal(&self, external_value: f64) -> Result<f64, BoundsError> {
        if !external_value.is_finite() {
            return Err(BoundsError::NonFiniteValue);
        }

        if !self.bounds.is_within_bounds(external_value) {
            return Err(BoundsError::ValueOutsideBounds {
                value: external_value,
                min: self.bounds.min,
                max: self.bounds.max,
            });
        }

        if self.bounds.range() == 0.0 {
            return Ok(0.0);
        }

        let scaled = 2.0 * (external_value - self.bounds.min) / self.bounds.range() - 1.0;

        // Ensure scaled is in [-1, 1] for asin
        Ok(scaled.clamp(-1.0, 1.0).asin())
    }
}
