use super::{check_len, Regressor, UncertainRegressor};
use crate::error::{PredictError, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LengthScale {
    Isotropic(f64),
    PerFeature(Vec<f64>),
}

impl LengthScale {
    fn get(&self, j: usize) -> f64 {
        match self {
            LengthScale::Isotropic(l) => *l,
            LengthScale::PerFeature(ls) => ls[j],
        }
    }
}

/// `constant * exp(-|x - y|^2 / 2l^2) + noise_level * [x == y]`.
/// The white-noise term only contributes to the prior variance of a
/// query point, never to its covariance with training points.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RbfKernel {
    #[serde(default = "one")]
    pub constant: f64,
    pub length_scale: LengthScale,
    #[serde(default)]
    pub noise_level: f64,
}

fn one() -> f64 {
    1.0
}

impl RbfKernel {
    fn cov(&self, a: &[f64], b: &[f64]) -> f64 {
        let sq: f64 = a
            .iter()
            .zip(b)
            .enumerate()
            .map(|(j, (x, y))| {
                let z = (x - y) / self.length_scale.get(j);
                z * z
            })
            .sum();
        self.constant * (-0.5 * sq).exp()
    }

    fn prior_var(&self) -> f64 {
        self.constant + self.noise_level
    }
}

/// Fitted Gaussian process regressor.
///
/// `alpha` solves `K alpha = y` for the (normalised) training targets and
/// `l_factor` is the lower Cholesky factor of that same `K`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GaussianProcess {
    pub x_train: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    pub l_factor: Vec<Vec<f64>>,
    pub kernel: RbfKernel,
    #[serde(default)]
    pub y_train_mean: f64,
    #[serde(default = "one")]
    pub y_train_std: f64,
}

impl GaussianProcess {
    pub fn validate(&self) -> std::result::Result<(), String> {
        let m = self.x_train.len();
        if m == 0 {
            return Err("no training points".into());
        }
        let n = self.x_train[0].len();
        if n == 0 {
            return Err("training points have no features".into());
        }
        if self.x_train.iter().any(|row| row.len() != n) {
            return Err("training points differ in width".into());
        }
        if self.alpha.len() != m {
            return Err(format!("alpha has {} entries, expected {}", self.alpha.len(), m));
        }
        if self.l_factor.len() != m || self.l_factor.iter().any(|row| row.len() != m) {
            return Err(format!("l_factor must be {}x{}", m, m));
        }
        if (0..m).any(|i| self.l_factor[i][i] <= 0.0) {
            return Err("l_factor diagonal must be positive".into());
        }
        match &self.kernel.length_scale {
            LengthScale::Isotropic(l) if *l <= 0.0 => {
                return Err("length_scale must be positive".into())
            }
            LengthScale::PerFeature(ls) if ls.len() != n => {
                return Err(format!("length_scale has {} entries, expected {}", ls.len(), n))
            }
            LengthScale::PerFeature(ls) if ls.iter().any(|l| *l <= 0.0) => {
                return Err("length_scale must be positive".into())
            }
            _ => {}
        }
        if self.kernel.constant <= 0.0 || self.kernel.noise_level < 0.0 {
            return Err("kernel amplitudes must be non-negative".into());
        }
        if self.y_train_std <= 0.0 {
            return Err("y_train_std must be positive".into());
        }
        Ok(())
    }

    pub fn n_train(&self) -> usize {
        self.x_train.len()
    }

    fn k_star(&self, x: &[f64]) -> Vec<f64> {
        self.x_train.iter().map(|xi| self.kernel.cov(x, xi)).collect()
    }

    // solves L v = b by forward substitution
    fn solve_lower(&self, b: &[f64]) -> Vec<f64> {
        let mut v = vec![0.0; b.len()];
        for i in 0..b.len() {
            let row = &self.l_factor[i];
            let s: f64 = (0..i).map(|j| row[j] * v[j]).sum();
            v[i] = (b[i] - s) / row[i];
        }
        v
    }

    fn mean_from(&self, k_star: &[f64]) -> f64 {
        let m: f64 = k_star.iter().zip(&self.alpha).map(|(k, a)| k * a).sum();
        m * self.y_train_std + self.y_train_mean
    }
}

impl Regressor for GaussianProcess {
    fn n_features(&self) -> usize {
        self.x_train.first().map_or(0, Vec::len)
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        self.predict_with_uncertainty(x).map(|(mean, _)| mean)
    }
}

impl UncertainRegressor for GaussianProcess {
    fn predict_with_uncertainty(&self, x: &[f64]) -> Result<(f64, f64)> {
        check_len(x, self.n_features())?;
        let k = self.k_star(x);
        let mean = self.mean_from(&k);

        let v = self.solve_lower(&k);
        let explained: f64 = v.iter().map(|vi| vi * vi).sum();
        // round-off can push this slightly below zero
        let var = (self.kernel.prior_var() - explained).max(0.0) * self.y_train_std.powi(2);
        let std = var.sqrt();

        if !mean.is_finite() || !std.is_finite() {
            return Err(PredictError::Model(format!(
                "gaussian process returned mean={} std={}",
                mean, std
            )));
        }
        Ok((mean, std))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One training point at the origin, K = [[1 + 0.25]] with noise folded in.
    fn single_point() -> GaussianProcess {
        let k00: f64 = 1.25;
        GaussianProcess {
            x_train: vec![vec![0.0, 0.0]],
            alpha: vec![2.0 / k00],
            l_factor: vec![vec![k00.sqrt()]],
            kernel: RbfKernel {
                constant: 1.0,
                length_scale: LengthScale::Isotropic(1.0),
                noise_level: 0.25,
            },
            y_train_mean: 0.0,
            y_train_std: 1.0,
        }
    }

    #[test]
    fn mean_and_std_at_training_point() {
        let gp = single_point();
        assert!(gp.validate().is_ok());
        let (mean, std) = gp.predict_with_uncertainty(&[0.0, 0.0]).unwrap();
        assert!((mean - 2.0 / 1.25).abs() < 1e-12);
        // var = 1.25 - 1/1.25
        assert!((std - (1.25f64 - 0.8).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn far_from_data_reverts_to_prior() {
        let gp = GaussianProcess {
            y_train_mean: 0.4,
            y_train_std: 2.0,
            ..single_point()
        };
        let (mean, std) = gp.predict_with_uncertainty(&[50.0, -50.0]).unwrap();
        assert!((mean - 0.4).abs() < 1e-9);
        assert!((std - 2.0 * 1.25f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn per_feature_length_scale_is_checked() {
        let mut gp = single_point();
        gp.kernel.length_scale = LengthScale::PerFeature(vec![1.0, 2.0, 3.0]);
        assert!(gp.validate().is_err());
        gp.kernel.length_scale = LengthScale::PerFeature(vec![1.0, 2.0]);
        assert!(gp.validate().is_ok());
    }

    #[test]
    fn std_is_never_negative() {
        // overly tight factor makes the explained variance exceed the prior
        let mut gp = single_point();
        gp.l_factor = vec![vec![0.5]];
        let (_, std) = gp.predict_with_uncertainty(&[0.0, 0.0]).unwrap();
        assert_eq!(std, 0.0);
    }

    #[test]
    fn kernel_defaults_from_json() {
        let k: RbfKernel = serde_json::from_str(r#"{"length_scale":[1.0,2.0]}"#).unwrap();
        assert_eq!(k.constant, 1.0);
        assert_eq!(k.noise_level, 0.0);
        assert_eq!(k.length_scale, LengthScale::PerFeature(vec![1.0, 2.0]));
    }
}
