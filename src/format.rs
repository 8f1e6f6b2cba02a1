use crate::types::{DerivedRatios, ModelChoice, PredictionResult};
use serde::Serialize;

/// Text shown for one prediction: the estimate, plus the ±1σ band when the
/// model provides one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStrings {
    pub headline: String,
    pub uncertainty: Option<String>,
}

impl DisplayStrings {
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(self.headline.clone())
            .chain(self.uncertainty.clone())
            .collect()
    }
}

pub fn format_result(choice: ModelChoice, result: &PredictionResult) -> DisplayStrings {
    let headline = format!(
        "Predicted Scour Depth ({}) = {:.4} m",
        choice.short(),
        result.value()
    );
    let uncertainty = result
        .uncertainty()
        .map(|sigma| format!("Uncertainty (±1σ) = {:.4} m", sigma));
    DisplayStrings {
        headline,
        uncertainty,
    }
}

pub fn format_ratios(ratios: &DerivedRatios) -> [String; 2] {
    [
        format!("H/D = {:.3}", ratios.h_d),
        format!("D/d50 = {:.3}", ratios.d_d50),
    ]
}
