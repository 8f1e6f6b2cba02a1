use super::{check_len, Scaler};
use crate::error::Result;
use serde::Deserialize;

/// A fitted per-feature affine transform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    /// `(x - mean) / scale`; a zero scale (constant feature) divides by 1.
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl FittedScaler {
    pub fn validate(&self) -> std::result::Result<(), String> {
        let (offset, scale) = match self {
            FittedScaler::Standard { mean, scale } => (mean, scale),
            FittedScaler::MinMax { min, scale } => (min, scale),
        };
        if scale.is_empty() {
            return Err("scaler has no features".into());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "offset has {} entries but scale has {}",
                offset.len(),
                scale.len()
            ));
        }
        if offset.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".into());
        }
        Ok(())
    }
}

impl Scaler for FittedScaler {
    fn n_features(&self) -> usize {
        match self {
            FittedScaler::Standard { scale, .. } | FittedScaler::MinMax { scale, .. } => {
                scale.len()
            }
        }
    }

    fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_len(x, self.n_features())?;
        let out = match self {
            FittedScaler::Standard { mean, scale } => x
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(v, (m, s))| (v - m) / if *s == 0.0 { 1.0 } else { *s })
                .collect(),
            FittedScaler::MinMax { min, scale } => x
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(v, (m, s))| v * s + m)
                .collect(),
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictError;

    #[test]
    fn standard_scaler_centres_and_scales() {
        let s = FittedScaler::Standard {
            mean: vec![1.0, 2.0, 5.0],
            scale: vec![2.0, 0.5, 0.0],
        };
        let y = s.transform(&[3.0, 1.0, 7.0]).unwrap();
        assert_eq!(y, vec![1.0, -2.0, 2.0]);
    }

    #[test]
    fn min_max_scaler_maps_linearly() {
        let s = FittedScaler::MinMax {
            min: vec![-0.5, 0.0],
            scale: vec![0.25, 2.0],
        };
        let y = s.transform(&[2.0, 0.5]).unwrap();
        assert_eq!(y, vec![0.0, 1.0]);
    }

    #[test]
    fn wrong_width_is_a_shape_mismatch() {
        let s = FittedScaler::Standard {
            mean: vec![0.0; 5],
            scale: vec![1.0; 5],
        };
        match s.transform(&[0.0; 7]) {
            Err(PredictError::ShapeMismatch { expected, got }) => {
                assert_eq!((expected, got), (5, 7));
            }
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn validate_catches_ragged_parameters() {
        let s = FittedScaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 2],
        };
        assert!(s.validate().is_err());
        let s: FittedScaler =
            serde_json::from_str(r#"{"kind":"min_max","min":[0.0],"scale":[1.0]}"#).unwrap();
        assert!(s.validate().is_ok());
    }
}
