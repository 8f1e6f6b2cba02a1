use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Number of model inputs: five measurements plus two derived ratios.
pub const N_FEATURES: usize = 7;

/// Authoritative input order shared with the scaler and both models.
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["U", "H", "D", "Fr", "d50", "H_D", "D_d50"];

pub type FeatureVector = [f64; N_FEATURES];

/// The five measurements entered on the form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    /// Flow velocity (m/s)
    pub u: f64,
    /// Flow depth (m)
    pub h: f64,
    /// Pier diameter (m)
    pub d: f64,
    /// Froude number
    pub fr: f64,
    /// Median grain size (m)
    pub d50: f64,
}

impl Default for RawInputs {
    fn default() -> Self {
        Self {
            u: 1.5,
            h: 0.6,
            d: 0.3,
            fr: 0.5,
            d50: 0.001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRatios {
    pub h_d: f64,
    pub d_d50: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    #[default]
    #[serde(alias = "rf", alias = "Random Forest")]
    RandomForest,
    #[serde(alias = "gpr", alias = "Gaussian Process Regression")]
    GaussianProcess,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::RandomForest, ModelChoice::GaussianProcess];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelChoice::RandomForest => "random_forest",
            ModelChoice::GaussianProcess => "gaussian_process",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelChoice::RandomForest => "Random Forest",
            ModelChoice::GaussianProcess => "Gaussian Process Regression",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            ModelChoice::RandomForest => "RF",
            ModelChoice::GaussianProcess => "GPR",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown model choice: {0:?}")]
pub struct UnknownModel(pub String);

impl FromStr for ModelChoice {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        ModelChoice::ALL
            .into_iter()
            .find(|m| {
                key.eq_ignore_ascii_case(m.as_str())
                    || key.eq_ignore_ascii_case(m.label())
                    || key.eq_ignore_ascii_case(m.short())
            })
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Model output, shaped by which model produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionResult {
    Point { value: f64 },
    WithUncertainty { value: f64, uncertainty: f64 },
}

impl PredictionResult {
    pub fn value(&self) -> f64 {
        match *self {
            PredictionResult::Point { value } => value,
            PredictionResult::WithUncertainty { value, .. } => value,
        }
    }

    pub fn uncertainty(&self) -> Option<f64> {
        match *self {
            PredictionResult::Point { .. } => None,
            PredictionResult::WithUncertainty { uncertainty, .. } => Some(uncertainty),
        }
    }
}

/// Everything produced for one press of "Predict".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub choice: ModelChoice,
    pub ratios: DerivedRatios,
    pub result: PredictionResult,
}
