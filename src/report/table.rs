//! Two-factor result table.
//!
//! The first stimulus parameter runs across the columns and the second down
//! the rows, matching the composite layout. An extra last row holds the
//! first parameter's values and an extra last column the second
//! parameter's. Any further parameters are listed below the table.

use std::fmt;
use std::io::Write;

use crate::data::{CompositeLayout, Dataset, StimulusParameter};
use crate::error::{FitError, Result};
use crate::fit::FitResult;
use crate::parameters::{round_to, ParameterValue};

/// A two-factor table of composite values, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    column_labels: Vec<String>,
    row_labels: Vec<String>,
    /// `row_labels.len()` rows of `column_labels.len()` cells each.
    cells: Vec<Vec<Option<f64>>>,
    extras: Vec<(String, ParameterValue)>,
    rounding: u32,
}

impl ResultTable {
    /// Build a table from labelled stimulus parameters, their (fitted or
    /// observed) values and a composite vector.
    ///
    /// `stimuli` and `values` are in signature order; at least two are
    /// required.
    pub fn new(
        stimuli: &[&StimulusParameter],
        values: &[ParameterValue],
        composite: &[f64],
        rounding: u32,
    ) -> Result<Self> {
        if stimuli.len() != values.len() {
            return Err(FitError::ShapeMismatch(format!(
                "{} labelled parameters but {} values",
                stimuli.len(),
                values.len()
            )));
        }
        if values.len() < 2 {
            return Err(FitError::Validation(
                "a two-factor table needs at least two parameters".to_string(),
            ));
        }

        let layout = CompositeLayout::new(values.iter().map(ParameterValue::len).collect());
        if layout.size() != composite.len() {
            return Err(FitError::ShapeMismatch(format!(
                "composite has {} values, table expects {}",
                composite.len(),
                layout.size()
            )));
        }

        let columns = values[0].as_slice();
        let rows = values[1].as_slice();
        let n_columns = layout.row_len();

        let column_labels = (1..=n_columns)
            .map(|i| format!("{}{}", stimuli[0].abbreviation, i))
            .chain(std::iter::once(String::new()))
            .collect();

        let mut row_labels = Vec::new();
        let mut cells = Vec::new();
        for (i, row) in layout.rows(composite).into_iter().enumerate() {
            let level = layout
                .levels(i * n_columns)
                .map(|levels| levels[1])
                .unwrap_or(0);
            row_labels.push(format!("{}{}", stimuli[1].abbreviation, level + 1));

            let mut cell_row: Vec<Option<f64>> = row.iter().copied().map(Some).collect();
            cell_row.push(rows.get(level).copied());
            cells.push(cell_row);
        }

        row_labels.push(String::new());
        let mut last_row: Vec<Option<f64>> = columns.iter().copied().map(Some).collect();
        last_row.push(None);
        cells.push(last_row);

        let extras = stimuli[2..]
            .iter()
            .zip(&values[2..])
            .map(|(stimulus, value)| (stimulus.label.clone(), value.clone()))
            .collect();

        Ok(Self {
            column_labels,
            row_labels,
            cells,
            extras,
            rounding,
        })
    }

    /// The table of optimal parameters and prediction of a finished fit.
    pub fn from_fit(dataset: &Dataset, result: &FitResult, rounding: u32) -> Result<Self> {
        let stimuli = dataset.select(result.signature)?;
        Self::new(&stimuli, &result.parameters, &result.prediction, rounding)
    }

    /// The table of the observed data.
    pub fn observed(dataset: &Dataset, stimuli: &[&StimulusParameter], rounding: u32) -> Result<Self> {
        let values: Vec<ParameterValue> = stimuli.iter().map(|s| s.to_parameter_value()).collect();
        Self::new(stimuli, &values, &dataset.composite.values, rounding)
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    /// Rounded cell value; `None` for the empty corner.
    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .flatten()
            .map(|v| round_to(v, self.rounding))
    }

    /// Render to `out`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write!(out, "{}", self)?;
        Ok(())
    }

    fn format_value(&self, value: f64) -> String {
        format!("{:.*}", self.rounding as usize, round_to(value, self.rounding))
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text_cells: Vec<Vec<String>> = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(|v| self.format_value(v)).unwrap_or_default())
                    .collect()
            })
            .collect();

        let label_width = self.row_labels.iter().map(String::len).max().unwrap_or(0);
        let cell_width = text_cells
            .iter()
            .flatten()
            .chain(&self.column_labels)
            .map(String::len)
            .max()
            .unwrap_or(0);

        write!(f, "{:label_width$}", "")?;
        for label in &self.column_labels {
            write!(f, "  {:>cell_width$}", label)?;
        }
        writeln!(f)?;

        for (label, row) in self.row_labels.iter().zip(&text_cells) {
            write!(f, "{:<label_width$}", label)?;
            for cell in row {
                write!(f, "  {:>cell_width$}", cell)?;
            }
            writeln!(f)?;
        }

        for (label, value) in &self.extras {
            writeln!(f, "{} {}", label, format_parameter(value, self.rounding))?;
        }
        Ok(())
    }
}

/// `0.5` for a scalar, `[0.1, 0.2]` for a vector, rounded.
pub fn format_parameter(value: &ParameterValue, rounding: u32) -> String {
    match value.rounded(rounding) {
        ParameterValue::Scalar(v) => v.to_string(),
        ParameterValue::Vector(values) => format!(
            "[{}]",
            values
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Write the full fit report.
///
/// Layout: a heading, the solver summary when `verbose`, the optimal table,
/// the optimal parameters by label and the final RMSD.
pub fn write_fit_report<W: Write + ?Sized>(
    out: &mut W,
    dataset: &Dataset,
    result: &FitResult,
    rounding: u32,
    verbose: bool,
) -> Result<()> {
    let stimuli = dataset.select(result.signature)?;

    writeln!(out)?;
    writeln!(out, "Model Fitting Result")?;
    writeln!(out)?;

    if verbose {
        writeln!(out, "model: {}", result.model_name)?;
        writeln!(out, "status: {:?}", result.status)?;
        writeln!(out, "message: {}", result.message)?;
        writeln!(out, "success: {}", result.converged())?;
        writeln!(out, "iterations: {}", result.iterations)?;
        writeln!(out, "evaluations: {}", result.evaluations)?;
        writeln!(out)?;
    }

    ResultTable::new(&stimuli, &result.parameters, &result.prediction, rounding)?.write_to(out)?;
    writeln!(out)?;

    writeln!(out, "Optimal Parameters")?;
    writeln!(out)?;
    for (stimulus, value) in stimuli.iter().zip(&result.parameters) {
        writeln!(out, "{} {}", stimulus.label, format_parameter(value, rounding))?;
    }
    writeln!(out)?;
    writeln!(out, "RMSD = {}", round_to(result.rmsd, rounding))?;
    Ok(())
}
