//! Fitted artifacts and the capabilities the dispatcher needs from them.
//!
//! The scaler and the two regressors are trained elsewhere and exported to
//! JSON. They are loaded once at startup and then only read.

use crate::error::{PredictError, Result};
use crate::types::N_FEATURES;
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
};

mod forest;
mod gaussian;
mod scaler;

pub use forest::{RandomForest, Tree};
pub use gaussian::{GaussianProcess, LengthScale, RbfKernel};
pub use scaler::FittedScaler;

pub trait Scaler: Send + Sync {
    fn n_features(&self) -> usize;
    fn transform(&self, x: &[f64]) -> Result<Vec<f64>>;
}

/// Point-estimate model.
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;
    fn predict(&self, x: &[f64]) -> Result<f64>;
}

/// A regressor that also reports one standard deviation around its mean.
pub trait UncertainRegressor: Regressor {
    fn predict_with_uncertainty(&self, x: &[f64]) -> Result<(f64, f64)>;
}

pub(crate) fn check_len(x: &[f64], expected: usize) -> Result<()> {
    if x.len() != expected {
        return Err(PredictError::ShapeMismatch {
            expected,
            got: x.len(),
        });
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let txt = fs::read_to_string(path).map_err(|e| PredictError::artifact(path, e))?;
    serde_json::from_str(&txt).map_err(|e| PredictError::artifact(path, e))
}

/// Where the three artifacts live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub rf: PathBuf,
    pub gpr: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>, scaler: &str, rf: &str, gpr: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            scaler: dir.join(scaler),
            rf: dir.join(rf),
            gpr: dir.join(gpr),
        }
    }
}

/// Process-wide handles. A slot is `None` only when assembled by hand;
/// [`Artifacts::load`] fills all three or fails.
#[derive(Default)]
pub struct Artifacts {
    pub scaler: Option<Box<dyn Scaler>>,
    pub rf: Option<Box<dyn Regressor>>,
    pub gpr: Option<Box<dyn UncertainRegressor>>,
}

impl Artifacts {
    pub fn with_scaler(mut self, scaler: impl Scaler + 'static) -> Self {
        self.scaler = Some(Box::new(scaler));
        self
    }

    pub fn with_rf(mut self, rf: impl Regressor + 'static) -> Self {
        self.rf = Some(Box::new(rf));
        self
    }

    pub fn with_gpr(mut self, gpr: impl UncertainRegressor + 'static) -> Self {
        self.gpr = Some(Box::new(gpr));
        self
    }

    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let scaler: FittedScaler = read_json(&paths.scaler)?;
        scaler
            .validate()
            .map_err(|e| PredictError::artifact(&paths.scaler, e))?;
        warn_on_width("scaler", &paths.scaler, Scaler::n_features(&scaler));

        let rf: RandomForest = read_json(&paths.rf)?;
        rf.validate().map_err(|e| PredictError::artifact(&paths.rf, e))?;
        warn_on_width("rf", &paths.rf, Regressor::n_features(&rf));
        tracing::info!("loaded random forest with {} trees", rf.n_trees());

        let gpr: GaussianProcess = read_json(&paths.gpr)?;
        gpr.validate()
            .map_err(|e| PredictError::artifact(&paths.gpr, e))?;
        warn_on_width("gpr", &paths.gpr, Regressor::n_features(&gpr));
        tracing::info!("loaded gaussian process with {} training points", gpr.n_train());

        Ok(Self::default().with_scaler(scaler).with_rf(rf).with_gpr(gpr))
    }

    pub fn scaler(&self) -> Result<&dyn Scaler> {
        self.scaler
            .as_deref()
            .ok_or(PredictError::ModelUnavailable("scaler"))
    }

    pub fn rf(&self) -> Result<&dyn Regressor> {
        self.rf
            .as_deref()
            .ok_or(PredictError::ModelUnavailable("random forest model"))
    }

    pub fn gpr(&self) -> Result<&dyn UncertainRegressor> {
        self.gpr
            .as_deref()
            .ok_or(PredictError::ModelUnavailable("gaussian process model"))
    }
}

// A width mismatch is reported again as ShapeMismatch by the startup warmup.
fn warn_on_width(name: &str, path: &Path, width: usize) {
    if width != N_FEATURES {
        tracing::warn!(
            "{} artifact {} expects {} features, pipeline produces {}",
            name,
            path.display(),
            width,
            N_FEATURES
        );
    }
}
