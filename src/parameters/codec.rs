//! Conversion between model-call form and the flat optimization vector.
//!
//! The solver only sees a single `Array1<f64>`. [`flatten`] concatenates
//! every parameter group into that vector and records where each group
//! starts in a [`ParameterIndex`]; [`unflatten`] slices the vector back
//! into groups using the same index.

use ndarray::{s, Array1};
use serde::Serialize;

use super::value::ParameterValue;
use crate::error::{FitError, Result};

/// Group boundaries inside a flat parameter vector.
///
/// Group `i` occupies `boundaries[i]..boundaries[i + 1]`. The first boundary
/// is always 0 and the last equals the length of the flat vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterIndex {
    boundaries: Vec<usize>,
}

impl ParameterIndex {
    /// Build an index from the element count of each group.
    pub fn from_lengths<I>(lengths: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut boundaries = vec![0];
        let mut current = 0;
        for len in lengths {
            current += len;
            boundaries.push(current);
        }
        Self { boundaries }
    }

    /// Wrap raw boundary offsets without checking them.
    ///
    /// [`unflatten`] validates the offsets against the vector it slices.
    pub fn from_boundaries(boundaries: Vec<usize>) -> Self {
        Self { boundaries }
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Number of parameter groups described by the index.
    pub fn group_count(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    /// Total number of flat elements.
    pub fn total_len(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Element range of group `group`.
    pub fn range(&self, group: usize) -> Option<std::ops::Range<usize>> {
        if group < self.group_count() {
            Some(self.boundaries[group]..self.boundaries[group + 1])
        } else {
            None
        }
    }

    /// Check the index against a flat vector of length `len`.
    pub fn check(&self, len: usize) -> Result<()> {
        match self.boundaries.first() {
            Some(0) => {}
            Some(first) => {
                return Err(FitError::ShapeMismatch(format!(
                    "Parameter index must start at 0, starts at {}",
                    first
                )))
            }
            None => {
                return Err(FitError::ShapeMismatch(
                    "Parameter index is empty".to_string(),
                ))
            }
        }

        if let Some(pos) = self.boundaries.windows(2).position(|w| w[1] < w[0]) {
            return Err(FitError::ShapeMismatch(format!(
                "Parameter index decreases at position {}: {} -> {}",
                pos,
                self.boundaries[pos],
                self.boundaries[pos + 1]
            )));
        }

        if self.total_len() != len {
            return Err(FitError::ShapeMismatch(format!(
                "Parameter index ends at {}, flat vector has {} elements",
                self.total_len(),
                len
            )));
        }

        Ok(())
    }
}

/// Concatenate parameter groups into a flat vector, preserving group order.
pub fn flatten(groups: &[ParameterValue]) -> (Array1<f64>, ParameterIndex) {
    let flat: Vec<f64> = groups
        .iter()
        .flat_map(|group| group.as_slice().iter().copied())
        .collect();
    let index = ParameterIndex::from_lengths(groups.iter().map(ParameterValue::len));

    (Array1::from_vec(flat), index)
}

/// Slice a flat vector back into parameter groups.
///
/// A one-element group comes back as [`ParameterValue::Scalar`]; any other
/// length comes back as [`ParameterValue::Vector`].
pub fn unflatten(flat: &Array1<f64>, index: &ParameterIndex) -> Result<Vec<ParameterValue>> {
    index.check(flat.len())?;

    let groups = index
        .boundaries()
        .windows(2)
        .map(|w| {
            let group = flat.slice(s![w[0]..w[1]]);
            match group.len() {
                1 => ParameterValue::Scalar(group[0]),
                _ => ParameterValue::Vector(group.to_vec()),
            }
        })
        .collect();

    Ok(groups)
}
