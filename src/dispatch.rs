use crate::error::{PredictError, Result};
use crate::features::{self, InputBounds};
use crate::model::Artifacts;
use crate::types::{FeatureVector, ModelChoice, Prediction, PredictionResult, RawInputs};

/// Scale `features`, then run the chosen model.
pub fn predict(
    choice: ModelChoice,
    features: &FeatureVector,
    artifacts: &Artifacts,
) -> Result<PredictionResult> {
    let scaled = artifacts.scaler()?.transform(features)?;

    let result = match choice {
        ModelChoice::RandomForest => {
            let value = artifacts.rf()?.predict(&scaled)?;
            PredictionResult::Point { value }
        }
        ModelChoice::GaussianProcess => {
            let (value, uncertainty) = artifacts.gpr()?.predict_with_uncertainty(&scaled)?;
            PredictionResult::WithUncertainty { value, uncertainty }
        }
    };

    if !result.value().is_finite() {
        return Err(PredictError::Model(format!(
            "{} returned a non-finite value",
            choice.label()
        )));
    }
    if let Some(sigma) = result.uncertainty() {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(PredictError::Model(format!(
                "{} returned an invalid uncertainty {}",
                choice.label(),
                sigma
            )));
        }
    }
    Ok(result)
}

/// validate → derive → build → predict, for one request.
pub fn run(
    raw: &RawInputs,
    choice: ModelChoice,
    bounds: &InputBounds,
    artifacts: &Artifacts,
) -> Result<Prediction> {
    bounds.validate(raw)?;
    let ratios = features::derive(raw.h, raw.d, raw.d50)?;
    let x = features::build(raw, &ratios);

    if log_features() {
        let sample: Vec<String> = crate::types::FEATURE_NAMES
            .iter()
            .zip(x.iter())
            .map(|(name, v)| format!("{}={:.4}", name, v))
            .collect();
        tracing::info!("predict model={} x=[{}]", choice, sample.join(", "));
    }

    let result = predict(choice, &x, artifacts)?;
    tracing::debug!("model={} result={:?}", choice, result);
    Ok(Prediction {
        choice,
        ratios,
        result,
    })
}

fn log_features() -> bool {
    std::env::var("LOG_PRED").ok().as_deref() == Some("1")
}
