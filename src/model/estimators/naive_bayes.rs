use std::f64::consts::PI;

use serde::Deserialize;

use super::{EstimatorError, check_dims};

/// Gaussian naive Bayes. `var` already includes the variance smoothing
/// applied at fit time.
#[derive(Debug, Clone, Deserialize)]
pub struct GaussianNb {
    pub classes: Vec<i64>,
    pub class_prior: Vec<f64>,
    pub theta: Vec<Vec<f64>>,
    pub var: Vec<Vec<f64>>,
}

impl GaussianNb {
    pub fn n_features(&self) -> usize {
        self.theta.first().map(Vec::len).unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        let n_classes = self.classes.len();
        if n_classes == 0 {
            return Err(EstimatorError::Malformed("no classes".into()));
        }
        if self.class_prior.len() != n_classes
            || self.theta.len() != n_classes
            || self.var.len() != n_classes
        {
            return Err(EstimatorError::Malformed(format!(
                "expected {n_classes} rows of priors, means and variances"
            )));
        }
        let width = self.n_features();
        let ragged = self
            .theta
            .iter()
            .chain(&self.var)
            .any(|row| row.len() != width);
        if width == 0 || ragged {
            return Err(EstimatorError::Malformed("ragged mean/variance rows".into()));
        }
        if self.var.iter().flatten().any(|v| *v <= 0.0) {
            return Err(EstimatorError::Malformed("variances must be positive".into()));
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, x: &[f64]) -> Vec<f64> {
        self.class_prior
            .iter()
            .zip(self.theta.iter().zip(&self.var))
            .map(|(prior, (means, vars))| {
                let norm: f64 = vars.iter().map(|v| (2.0 * PI * v).ln()).sum();
                let dist: f64 = x
                    .iter()
                    .zip(means.iter().zip(vars))
                    .map(|(xi, (mu, v))| (xi - mu).powi(2) / v)
                    .sum();
                prior.ln() - 0.5 * norm - 0.5 * dist
            })
            .collect()
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        check_dims(self.n_features(), x.len())?;
        let jll = self.joint_log_likelihood(x);
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(EstimatorError::NonFinite);
        }
        let log_norm = max + jll.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
        Ok(jll.iter().map(|v| (v - log_norm).exp()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class() -> GaussianNb {
        GaussianNb {
            classes: vec![0, 1],
            class_prior: vec![0.5, 0.5],
            theta: vec![vec![-1.0, -1.0], vec![1.0, 1.0]],
            var: vec![vec![1.0, 1.0], vec![1.0, 1.0]],
        }
    }

    #[test]
    fn probabilities_normalise() {
        let model = two_class();
        model.validate().unwrap();
        let proba = model.predict_proba(&[0.3, -0.2]).unwrap();
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_point_is_even() {
        let proba = two_class().predict_proba(&[0.0, 0.0]).unwrap();
        assert!((proba[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn nearer_mean_wins() {
        let proba = two_class().predict_proba(&[0.9, 1.2]).unwrap();
        assert!(proba[1] > 0.9);
    }

    #[test]
    fn zero_variance_is_malformed() {
        let mut model = two_class();
        model.var[1][0] = 0.0;
        assert!(model.validate().is_err());
    }
}
