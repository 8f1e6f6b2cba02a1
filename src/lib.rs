//! Scour depth prediction around ice-covered bridge piers.
//!
//! Five measurements are turned into a fixed-order feature vector, scaled,
//! and passed to either a random forest or a Gaussian process exported from
//! a training pipeline as JSON.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod format;
pub mod model;
pub mod types;
pub mod web;

pub use dispatch::{predict, run};
pub use error::PredictError;
pub use features::{build, derive, InputBounds};
pub use format::{format_ratios, format_result, DisplayStrings};
pub use model::{ArtifactPaths, Artifacts};
pub use types::{
    DerivedRatios, FeatureVector, ModelChoice, Prediction, PredictionResult, RawInputs,
    FEATURE_NAMES, N_FEATURES,
};
