//! Settings document.
//!
//! Settings are stored as pretty-printed JSON with four sections:
//!
//! ```json
//! {
//!   "general": { "verbose": false, "rounding": 5 },
//!   "data": { "model_number": 1, "data_filename": "av.json" },
//!   "graph": { "caption": "", "x_label": "Auditory", "y_label": "P(/da/)" },
//!   "solver": { "max_iterations": 500 }
//! }
//! ```
//!
//! Every field is optional. [`Settings::fill_defaults`] resolves the
//! dated result and graph file names once the model is known.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FitError, Result};
use crate::fit::FitOptions;
use crate::models::get_model;

/// Largest rounding accepted.
pub const MAX_ROUNDING: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Report every residual evaluation.
    pub verbose: bool,
    /// Digits after the decimal point in tables and reports.
    pub rounding: u32,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            rounding: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Registry index of the model to fit.
    pub model_number: usize,
    pub data_filename: Option<String>,
    pub result_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub graph_filename: Option<String>,
    pub caption: String,
    pub x_label: String,
    pub y_label: String,
    /// Legend title; an empty string means the second parameter's label.
    pub legend_label: String,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            graph_filename: None,
            caption: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            legend_label: "Legend".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub data: DataSettings,
    pub graph: GraphSettings,
    pub solver: FitOptions,
}

impl Settings {
    /// Read settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let settings = Self::from_json(&text)
            .map_err(|e| FitError::Settings(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FitError::Settings(e.to_string()))
    }

    /// Write settings as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Check values that the document format cannot rule out.
    pub fn validate(&self) -> Result<()> {
        if self.general.rounding > MAX_ROUNDING {
            return Err(FitError::Settings(format!(
                "rounding must be at most {}, got {}",
                MAX_ROUNDING, self.general.rounding
            )));
        }
        self.solver
            .validate()
            .map_err(|e| FitError::Settings(e.to_string()))
    }

    /// Fill blank file names with dated defaults for the selected model.
    ///
    /// Fails with [`FitError::IndexOutOfRange`] if `model_number` does not
    /// name a registered model.
    pub fn fill_defaults(&mut self, today: NaiveDate) -> Result<()> {
        let model = get_model(self.data.model_number)?;

        if is_blank(&self.data.result_filename) {
            self.data.result_filename = Some(default_result_filename(model.name(), today));
        }
        if is_blank(&self.graph.graph_filename) {
            self.graph.graph_filename = Some(default_graph_filename(model.name(), today));
        }
        Ok(())
    }

    /// [`Settings::fill_defaults`] with the local date.
    pub fn fill_defaults_today(&mut self) -> Result<()> {
        self.fill_defaults(chrono::Local::now().date_naive())
    }

    /// The data file name, which has no default.
    pub fn data_filename(&self) -> Result<&str> {
        match self.data.data_filename.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name),
            _ => Err(FitError::Settings(
                "data.data_filename is required".to_string(),
            )),
        }
    }

    pub fn to_fit_options(&self) -> FitOptions {
        self.solver.clone()
    }
}

/// `Result_<model>_<dd-mm-YYYY>.txt`
pub fn default_result_filename(model_name: &str, date: NaiveDate) -> String {
    format!("Result_{}_{}.txt", model_name, date.format("%d-%m-%Y"))
}

/// `Graph_<model>_<dd-mm-YYYY>.json`
pub fn default_graph_filename(model_name: &str, date: NaiveDate) -> String {
    format!("Graph_{}_{}.json", model_name, date.format("%d-%m-%Y"))
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}
