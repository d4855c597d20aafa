use thiserror::Error;

/// Error types for the modelfit-rs library.
#[derive(Error, Debug)]
pub enum FitError {
    /// Observed data outside [0, 1], an empty series, or inconsistent lengths.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A flat vector disagrees with its parameter index, or a model's output
    /// does not line up with the observed layout.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The selected model could not produce a prediction.
    #[error("Model '{model}' failed: {message}")]
    ModelInvocation { model: String, message: String },

    /// Invalid model selection.
    #[error("Model index {index} is out of range (registry holds {len} models)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The solver stopped on an error; the cause is attached.
    #[error("Fit failed for model '{model}': {source}")]
    FitFailed {
        model: String,
        #[source]
        source: Box<FitError>,
    },

    /// The damped normal equations could not be solved.
    #[error("Linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Invalid state in the fit driver.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed or incomplete settings.
    #[error("Settings error: {0}")]
    Settings(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FitError {
    /// Wrap an error raised while fitting `model`.
    pub fn fit_failed(model: impl Into<String>, cause: FitError) -> Self {
        FitError::FitFailed {
            model: model.into(),
            source: Box::new(cause),
        }
    }

    /// The innermost error, looking through any `FitFailed` wrappers.
    pub fn cause(&self) -> &FitError {
        match self {
            FitError::FitFailed { source, .. } => source.cause(),
            other => other,
        }
    }

    /// Process exit code used by the `modelfit` binary.
    pub fn exit_code(&self) -> u8 {
        match self.cause() {
            FitError::Validation(_) => 2,
            FitError::ShapeMismatch(_) => 3,
            FitError::ModelInvocation { .. } => 4,
            FitError::IndexOutOfRange { .. } => 5,
            FitError::Settings(_) => 6,
            FitError::Io(_) | FitError::Json(_) => 7,
            _ => 1,
        }
    }
}

/// Result type alias for modelfit-rs operations.
pub type Result<T> = std::result::Result<T, FitError>;
