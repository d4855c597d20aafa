//! JSON data files.
//!
//! A data file is an array of records:
//!
//! ```json
//! [
//!   { "name": "a_params", "label": "Auditory", "abbreviation": "A", "data": [0.01, 0.99] },
//!   { "name": "v_params", "label": "Visual", "abbreviation": "V", "data": [0.03, 0.97] },
//!   { "name": "composite", "label": "AV", "abbreviation": "AV", "data": [0.02, 0.76, 0.28, 0.99] }
//! ]
//! ```
//!
//! The record named `composite` is the composite observation; every other
//! record is a stimulus parameter, kept in file order.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{CompositeObservation, Dataset, StimulusParameter};
use crate::error::{FitError, Result};

/// Record name reserved for the composite observation.
pub const COMPOSITE_NAME: &str = "composite";

#[derive(Debug, Deserialize)]
struct DataRecord {
    name: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default)]
    data: Option<Vec<f64>>,
}

/// Read and validate a data file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    tracing::debug!(path = %path.display(), "loading data file");
    parse_dataset(&text)
}

/// Parse and validate the JSON text of a data file.
pub fn parse_dataset(text: &str) -> Result<Dataset> {
    let records: Vec<DataRecord> = serde_json::from_str(text)?;

    let mut parameters = Vec::new();
    let mut composite: Option<CompositeObservation> = None;

    for record in records {
        let values = match record.data {
            Some(values) if !values.is_empty() => values,
            _ => {
                return Err(FitError::Validation(format!(
                    "No data provided for '{}'",
                    record.name
                )))
            }
        };
        let label = record.label.unwrap_or_else(|| record.name.clone());
        let abbreviation = record.abbreviation.unwrap_or_else(|| label.clone());

        if record.name == COMPOSITE_NAME {
            if composite.is_some() {
                return Err(FitError::Validation(
                    "Data file contains more than one composite record".to_string(),
                ));
            }
            let observation = CompositeObservation {
                label,
                abbreviation,
                values,
            };
            observation.validate()?;
            composite = Some(observation);
        } else {
            let parameter = StimulusParameter::new(record.name, label, abbreviation, values);
            parameter.validate()?;
            parameters.push(parameter);
        }
    }

    let composite = composite.ok_or_else(|| {
        FitError::Validation("Data file has no composite record".to_string())
    })?;

    tracing::debug!(
        parameters = parameters.len(),
        composite = composite.values.len(),
        "data file parsed"
    );

    Ok(Dataset::new(parameters, composite))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"[
        {"name": "a_params", "label": "Auditory", "abbreviation": "A", "data": [0.1, 0.9]},
        {"name": "v_params", "label": "Visual", "abbreviation": "V", "data": [0.2, 0.8]},
        {"name": "composite", "label": "Audiovisual", "abbreviation": "AV", "data": [0.1, 0.5, 0.4, 0.9]}
    ]"#;

    #[test]
    fn test_parse_valid_file() {
        let dataset = parse_dataset(VALID).unwrap();

        assert_eq!(dataset.parameters.len(), 2);
        assert_eq!(dataset.parameters[0].name, "a_params");
        assert_eq!(dataset.parameters[1].abbreviation, "V");
        assert_eq!(dataset.composite.values, vec![0.1, 0.5, 0.4, 0.9]);
        assert_eq!(dataset.composite.label, "Audiovisual");
    }

    #[test]
    fn test_missing_composite() {
        let text = r#"[{"name": "a_params", "data": [0.1]}]"#;
        assert!(matches!(parse_dataset(text), Err(FitError::Validation(_))));
    }

    #[test]
    fn test_empty_and_out_of_range_data() {
        let empty = r#"[{"name": "a_params", "data": []}, {"name": "composite", "data": [0.1]}]"#;
        assert!(matches!(parse_dataset(empty), Err(FitError::Validation(_))));

        let missing = r#"[{"name": "a_params"}, {"name": "composite", "data": [0.1]}]"#;
        assert!(matches!(parse_dataset(missing), Err(FitError::Validation(_))));

        let high = r#"[{"name": "a_params", "data": [1.5]}, {"name": "composite", "data": [0.1]}]"#;
        assert!(matches!(parse_dataset(high), Err(FitError::Validation(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_dataset("{not json"), Err(FitError::Json(_))));
    }

    #[test]
    fn test_labels_default_to_name() {
        let text = r#"[{"name": "bias", "data": [0.5]}, {"name": "composite", "data": [0.1]}]"#;
        let dataset = parse_dataset(text).unwrap();
        assert_eq!(dataset.parameters[0].label, "bias");
        assert_eq!(dataset.parameters[0].abbreviation, "bias");
    }
}
