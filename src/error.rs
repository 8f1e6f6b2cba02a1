use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between loading the artifacts and
/// rendering a prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    /// An artifact was missing, unreadable or structurally invalid.
    #[error("failed to load artifact {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("{field} = {value} is below the minimum of {min}")]
    InputRange {
        field: &'static str,
        value: f64,
        min: f64,
    },

    #[error("{field} must be a finite number, got {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("{ratio} = {numerator} / {denominator} is not a finite number")]
    NonFiniteRatio {
        ratio: &'static str,
        numerator: f64,
        denominator: f64,
    },

    #[error("feature length mismatch: got {got}, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("division by zero while deriving ratios ({numerator} / {denominator})")]
    Division { numerator: f64, denominator: f64 },

    #[error("{0} is not loaded")]
    ModelUnavailable(&'static str),

    #[error("model produced an invalid output: {0}")]
    Model(String),
}

impl PredictError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PredictError::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Errors caused by what the user typed rather than by the deployment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PredictError::InputRange { .. }
                | PredictError::NonFiniteInput { .. }
                | PredictError::NonFiniteRatio { .. }
                | PredictError::Division { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PredictError>;
