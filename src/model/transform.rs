use serde::Deserialize;

use super::estimators::EstimatorError;

/// Feature scaling fitted at training time.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `(x - center) / scale`, center being the median and scale the IQR.
    Robust { center: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    fn parts(&self) -> (&[f64], &[f64]) {
        match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::Robust { center, scale } => (center, scale),
        }
    }

    pub fn n_features(&self) -> usize {
        self.parts().0.len()
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        let (offset, scale) = self.parts();
        if offset.is_empty() || offset.len() != scale.len() {
            return Err(EstimatorError::Malformed(
                "scaler offset and scale differ in length".into(),
            ));
        }
        Ok(())
    }

    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let (offset, scale) = self.parts();
        if x.len() != offset.len() {
            return Err(EstimatorError::DimensionMismatch {
                expected: offset.len(),
                actual: x.len(),
            });
        }
        Ok(x.iter()
            .zip(offset.iter().zip(scale))
            .map(|(v, (o, s))| {
                // Constant features were fitted with a zero scale; treat as 1.
                let s = if *s == 0.0 { 1.0 } else { *s };
                (v - o) / s
            })
            .collect())
    }
}

/// Maps encoded class indices back to their string labels.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn inverse_transform(&self, encoded: i64) -> Option<&str> {
        usize::try_from(encoded)
            .ok()
            .and_then(|idx| self.classes.get(idx))
            .map(String::as_str)
    }
}

/// Ordered feature names the estimator was trained on.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FeatureOrder(pub Vec<String>);

impl FeatureOrder {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
