use serde::Deserialize;

use super::{EstimatorError, check_dims};

/// Ordinary least squares / ridge: `y = w·x + b`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.coefficients.is_empty() {
            return Err(EstimatorError::Malformed("no coefficients".into()));
        }
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        check_dims(self.n_features(), x.len())?;
        Ok(self
            .coefficients
            .iter()
            .zip(x)
            .map(|(w, v)| w * v)
            .sum::<f64>()
            + self.intercept)
    }
}
