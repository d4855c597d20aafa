//! Ordering of composite observations.
//!
//! The composite grid crosses every level of every selected stimulus
//! parameter. The first parameter varies fastest and the last varies slowest,
//! so for parameters `A` (2 levels) and `B` (2 levels) the order is
//! `(A1,B1), (A2,B1), (A1,B2), (A2,B2)`. Models must emit predictions in this
//! order and the data file must store observations in it.

/// Shape of a composite grid: the level count of each parameter, fastest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLayout {
    lengths: Vec<usize>,
}

impl CompositeLayout {
    pub fn new(lengths: Vec<usize>) -> Self {
        Self { lengths }
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// Number of cells in the grid.
    pub fn size(&self) -> usize {
        self.lengths.iter().product()
    }

    /// Flat position of the cell at `levels` (zero-based, fastest first).
    pub fn position(&self, levels: &[usize]) -> Option<usize> {
        if levels.len() != self.lengths.len() {
            return None;
        }

        let mut position = 0;
        for (level, len) in levels.iter().zip(&self.lengths).rev() {
            if level >= len {
                return None;
            }
            position = position * len + level;
        }
        Some(position)
    }

    /// Inverse of [`CompositeLayout::position`].
    pub fn levels(&self, position: usize) -> Option<Vec<usize>> {
        if position >= self.size() {
            return None;
        }

        let mut rest = position;
        let levels = self
            .lengths
            .iter()
            .map(|len| {
                let level = rest % len;
                rest /= len;
                level
            })
            .collect();
        Some(levels)
    }

    /// Number of columns when the grid is drawn as a table.
    pub fn row_len(&self) -> usize {
        self.lengths.first().copied().unwrap_or(0)
    }

    /// Split composite values into rows, one per level of the second parameter.
    ///
    /// Any third or later parameter simply continues the row sequence.
    pub fn rows<'a>(&self, values: &'a [f64]) -> Vec<&'a [f64]> {
        match self.row_len() {
            0 => Vec::new(),
            n => values.chunks(n).collect(),
        }
    }
}
