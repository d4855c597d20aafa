//! Per-evaluation progress output.

use std::cell::RefCell;
use std::io::Write;

use tracing::warn;

use super::table::ResultTable;
use crate::data::StimulusParameter;
use crate::error::Result;
use crate::fit::Evaluation;
use crate::parameters::round_to;

/// Writes the table and RMSD of every residual evaluation to a sink.
///
/// Attach it to a fit with
/// `driver.with_observer(&|evaluation| reporter.observe(evaluation))`.
pub struct VerboseReporter<'a, W: Write> {
    out: RefCell<W>,
    stimuli: Vec<&'a StimulusParameter>,
    rounding: u32,
}

impl<'a, W: Write> VerboseReporter<'a, W> {
    /// `stimuli` are the fitted model's parameters in signature order.
    pub fn new(out: W, stimuli: Vec<&'a StimulusParameter>, rounding: u32) -> Self {
        Self {
            out: RefCell::new(out),
            stimuli,
            rounding,
        }
    }

    /// Report one evaluation. Write failures are logged, not raised, so a
    /// broken sink never aborts a fit.
    pub fn observe(&self, evaluation: &Evaluation<'_>) {
        if let Err(err) = self.write_evaluation(evaluation) {
            warn!(call = evaluation.call, error = %err, "could not write progress");
        }
    }

    fn write_evaluation(&self, evaluation: &Evaluation<'_>) -> Result<()> {
        let table = ResultTable::new(
            &self.stimuli,
            evaluation.parameters,
            evaluation.prediction,
            self.rounding,
        )?;

        let mut out = self.out.borrow_mut();
        writeln!(out, "Evaluation {}", evaluation.call)?;
        table.write_to(&mut *out)?;
        writeln!(out, "RMSD = {}", round_to(evaluation.rmsd, self.rounding))?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}
