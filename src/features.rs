use crate::error::{PredictError, Result};
use crate::types::{DerivedRatios, FeatureVector, RawInputs};
use serde::Deserialize;

/// Lower bound for every form field. A field passes when it is finite and
/// not below its minimum.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputBounds {
    pub u: f64,
    pub h: f64,
    pub d: f64,
    pub fr: f64,
    pub d50: f64,
}

impl Default for InputBounds {
    fn default() -> Self {
        Self {
            u: 0.01,
            h: 0.01,
            d: 0.01,
            fr: 0.01,
            d50: 0.00001,
        }
    }
}

impl InputBounds {
    /// (name, value, min) in feature order.
    fn fields(&self, raw: &RawInputs) -> [(&'static str, f64, f64); 5] {
        [
            ("U", raw.u, self.u),
            ("H", raw.h, self.h),
            ("D", raw.d, self.d),
            ("Fr", raw.fr, self.fr),
            ("d50", raw.d50, self.d50),
        ]
    }

    /// Reports the first offending field, in feature order.
    pub fn validate(&self, raw: &RawInputs) -> Result<()> {
        for (field, value, min) in self.fields(raw) {
            if !value.is_finite() {
                return Err(PredictError::NonFiniteInput { field, value });
            }
            if value < min {
                return Err(PredictError::InputRange { field, value, min });
            }
        }
        Ok(())
    }

    /// Every minimum must be finite and strictly positive, otherwise a
    /// zero D or d50 would pass validation.
    pub fn check(&self) -> std::result::Result<(), String> {
        for (field, _, min) in self.fields(&RawInputs::default()) {
            if !min.is_finite() || min <= 0.0 {
                return Err(format!(
                    "minimum for {} must be a positive number, got {}",
                    field, min
                ));
            }
        }
        Ok(())
    }

    /// Minimum for a field by its feature name, used by the form markup.
    pub fn min_for(&self, field: &str) -> Option<f64> {
        match field {
            "U" => Some(self.u),
            "H" => Some(self.h),
            "D" => Some(self.d),
            "Fr" => Some(self.fr),
            "d50" => Some(self.d50),
            _ => None,
        }
    }
}

/// H/D and D/d50. Range checks belong to [`InputBounds::validate`]; this
/// only refuses a zero denominator or a ratio that overflows.
pub fn derive(h: f64, d: f64, d50: f64) -> Result<DerivedRatios> {
    if d == 0.0 {
        return Err(PredictError::Division {
            numerator: h,
            denominator: d,
        });
    }
    if d50 == 0.0 {
        return Err(PredictError::Division {
            numerator: d,
            denominator: d50,
        });
    }
    let ratios = DerivedRatios {
        h_d: h / d,
        d_d50: d / d50,
    };
    // finite inputs can still overflow
    if !ratios.h_d.is_finite() {
        return Err(PredictError::NonFiniteRatio {
            ratio: "H/D",
            numerator: h,
            denominator: d,
        });
    }
    if !ratios.d_d50.is_finite() {
        return Err(PredictError::NonFiniteRatio {
            ratio: "D/d50",
            numerator: d,
            denominator: d50,
        });
    }
    Ok(ratios)
}

/// Lays out `[U, H, D, Fr, d50, H_D, D_d50]`.
pub fn build(raw: &RawInputs, derived: &DerivedRatios) -> FeatureVector {
    [
        raw.u,
        raw.h,
        raw.d,
        raw.fr,
        raw.d50,
        derived.h_d,
        derived.d_d50,
    ]
}
