use serde::Deserialize;

use super::{EstimatorError, check_dims};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
}

impl Kernel {
    fn apply(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            Kernel::Linear => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            Kernel::Rbf { gamma } => {
                let d2: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * d2).exp()
            }
        }
    }
}

/// libsvm clamps Platt outputs to `[1e-7, 1 - 1e-7]`.
const MIN_PROBABILITY: f64 = 1e-7;

/// Binary support vector classifier with Platt-scaled probabilities.
///
/// `dual_coef` and `intercept` carry scikit-learn's sign, so a positive
/// decision value selects `classes[1]`. `prob_a`/`prob_b` keep libsvm's
/// sign, which is fitted against the negated decision value.
#[derive(Debug, Clone, Deserialize)]
pub struct Svc {
    pub classes: Vec<i64>,
    pub kernel: Kernel,
    #[serde(default)]
    pub support_vectors: Vec<Vec<f64>>,
    #[serde(default)]
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
    pub prob_a: f64,
    pub prob_b: f64,
    /// Input width, needed when there are no support vectors to infer it from.
    #[serde(default)]
    pub n_features: Option<usize>,
}

impl Svc {
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
            .or_else(|| self.support_vectors.first().map(Vec::len))
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.classes.len() != 2 {
            return Err(EstimatorError::Malformed(format!(
                "binary SVC needs 2 classes, got {}",
                self.classes.len()
            )));
        }
        if self.support_vectors.len() != self.dual_coef.len() {
            return Err(EstimatorError::Malformed(
                "support_vectors and dual_coef differ in length".into(),
            ));
        }
        if let Some(width) = self.n_features() {
            if self.support_vectors.iter().any(|sv| sv.len() != width) {
                return Err(EstimatorError::Malformed("ragged support vectors".into()));
            }
        }
        if let Kernel::Rbf { gamma } = self.kernel {
            if gamma <= 0.0 {
                return Err(EstimatorError::Malformed("gamma must be positive".into()));
            }
        }
        Ok(())
    }

    pub fn decision_function(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        if let Some(width) = self.n_features() {
            check_dims(width, x.len())?;
        }
        let sum: f64 = self
            .support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, coef)| coef * self.kernel.apply(sv, x))
            .sum();
        Ok(sum + self.intercept)
    }

    pub fn predict(&self, x: &[f64]) -> Result<i64, EstimatorError> {
        let f = self.decision_function(x)?;
        Ok(if f > 0.0 { self.classes[1] } else { self.classes[0] })
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let f = self.decision_function(x)?;
        let positive = (1.0 / (1.0 + (self.prob_a * f - self.prob_b).exp()))
            .clamp(MIN_PROBABILITY, 1.0 - MIN_PROBABILITY);
        Ok(vec![1.0 - positive, positive])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(prob_b: f64, intercept: f64) -> Svc {
        Svc {
            classes: vec![0, 1],
            kernel: Kernel::Rbf { gamma: 0.5 },
            support_vectors: vec![],
            dual_coef: vec![],
            intercept,
            prob_a: 0.0,
            prob_b,
            n_features: Some(4),
        }
    }

    #[test]
    fn platt_probability_of_positive_class() {
        let model = constant(4f64.ln(), 1.0);
        let proba = model.predict_proba(&[0.0; 4]).unwrap();
        assert!((proba[1] - 0.8).abs() < 1e-12);
        assert_eq!(model.predict(&[0.0; 4]).unwrap(), 1);
    }

    #[test]
    fn platt_parameters_use_libsvm_sign() {
        // f = 2, A = -1, B = 0.5: P(classes[1]) = 1 / (1 + exp(-2 - 0.5)).
        let model = Svc {
            prob_a: -1.0,
            prob_b: 0.5,
            ..constant(0.0, 2.0)
        };
        let proba = model.predict_proba(&[0.0; 4]).unwrap();
        let expected = 1.0 / (1.0 + (-2.5f64).exp());
        assert!((proba[1] - expected).abs() < 1e-12);
        assert!((proba[1] - 0.924_141_8).abs() < 1e-6);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn platt_output_is_clamped() {
        let model = Svc {
            prob_a: -1.0,
            ..constant(0.0, 100.0)
        };
        let proba = model.predict_proba(&[0.0; 4]).unwrap();
        assert_eq!(proba[1], 1.0 - 1e-7);
        assert!(proba[0] > 0.0);
    }

    #[test]
    fn rbf_kernel_decision() {
        let model = Svc {
            classes: vec![0, 1],
            kernel: Kernel::Rbf { gamma: 1.0 },
            support_vectors: vec![vec![0.0], vec![2.0]],
            dual_coef: vec![-1.0, 1.0],
            intercept: 0.0,
            prob_a: -1.0,
            prob_b: 0.0,
            n_features: None,
        };
        model.validate().unwrap();
        assert_eq!(model.predict(&[1.9]).unwrap(), 1);
        assert_eq!(model.predict(&[0.1]).unwrap(), 0);
        assert!(model.predict_proba(&[1.9]).unwrap()[1] > 0.5);
    }

    #[test]
    fn kernel_tag_decodes() {
        let kernel: Kernel = serde_json::from_str(r#"{"rbf":{"gamma":0.1}}"#).unwrap();
        assert_eq!(kernel, Kernel::Rbf { gamma: 0.1 });
        let kernel: Kernel = serde_json::from_str(r#""linear""#).unwrap();
        assert_eq!(kernel, Kernel::Linear);
    }
}
