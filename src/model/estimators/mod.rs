//! Native evaluation of exported estimator parameters.
//!
//! Each estimator is deserialised from the JSON document the training
//! pipeline writes next to its scaler and feature list, checked once for
//! shape consistency at load time, and then evaluated read-only.

mod forest;
mod linear;
mod mlp;
mod naive_bayes;
mod neighbors;
mod svm;

#[cfg(feature = "tch-backend")]
pub mod torchscript;

use serde::Deserialize;
use thiserror::Error;

pub use forest::{DecisionTree, RandomForest};
pub use linear::LinearModel;
pub use mlp::{Activation, Layer, Mlp};
pub use naive_bayes::GaussianNb;
pub use neighbors::{KNeighbors, NeighborWeights};
pub use svm::{Kernel, Svc};

#[derive(Debug, Error, PartialEq)]
pub enum EstimatorError {
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("estimator produced a non-finite value")]
    NonFinite,
    #[error("malformed estimator: {0}")]
    Malformed(String),
}

pub(crate) fn check_dims(expected: usize, actual: usize) -> Result<(), EstimatorError> {
    if expected != actual {
        return Err(EstimatorError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, &value)| match best {
            Some((_, top)) if top >= value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

/// Continuous-output estimator.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearModel),
    Mlp(Mlp),
    #[cfg(feature = "tch-backend")]
    #[serde(skip)]
    TorchScript(std::sync::Arc<torchscript::TorchScriptModule>),
}

impl Regressor {
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Regressor::Linear(model) => Some(model.n_features()),
            Regressor::Mlp(model) => model.n_features(),
            #[cfg(feature = "tch-backend")]
            Regressor::TorchScript(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        match self {
            Regressor::Linear(model) => model.validate(),
            Regressor::Mlp(model) => model.validate(),
            #[cfg(feature = "tch-backend")]
            Regressor::TorchScript(_) => Ok(()),
        }
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        let value = match self {
            Regressor::Linear(model) => model.predict(x)?,
            Regressor::Mlp(model) => model.predict(x)?,
            #[cfg(feature = "tch-backend")]
            Regressor::TorchScript(module) => module.predict(x)?,
        };
        if !value.is_finite() {
            return Err(EstimatorError::NonFinite);
        }
        Ok(value)
    }
}

/// Estimator producing a class label and a probability per declared class.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    GaussianNb(GaussianNb),
    KNeighbors(KNeighbors),
    Svc(Svc),
    RandomForest(RandomForest),
}

impl Classifier {
    /// Encoded class labels, in the column order of `predict_proba`.
    pub fn classes(&self) -> &[i64] {
        match self {
            Classifier::GaussianNb(model) => &model.classes,
            Classifier::KNeighbors(model) => &model.classes,
            Classifier::Svc(model) => &model.classes,
            Classifier::RandomForest(model) => &model.classes,
        }
    }

    pub fn n_features(&self) -> Option<usize> {
        match self {
            Classifier::GaussianNb(model) => Some(model.n_features()),
            Classifier::KNeighbors(model) => model.n_features(),
            Classifier::Svc(model) => model.n_features(),
            Classifier::RandomForest(_) => None,
        }
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        match self {
            Classifier::GaussianNb(model) => model.validate(),
            Classifier::KNeighbors(model) => model.validate(),
            Classifier::Svc(model) => model.validate(),
            Classifier::RandomForest(model) => model.validate(),
        }
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let proba = match self {
            Classifier::GaussianNb(model) => model.predict_proba(x)?,
            Classifier::KNeighbors(model) => model.predict_proba(x)?,
            Classifier::Svc(model) => model.predict_proba(x)?,
            Classifier::RandomForest(model) => model.predict_proba(x)?,
        };
        if proba.iter().any(|p| !p.is_finite()) {
            return Err(EstimatorError::NonFinite);
        }
        Ok(proba)
    }

    /// Predicted class label.
    ///
    /// The SVC decides on the sign of its decision function; every other
    /// classifier takes the most probable class.
    pub fn predict(&self, x: &[f64]) -> Result<i64, EstimatorError> {
        if let Classifier::Svc(model) = self {
            return model.predict(x);
        }
        let proba = self.predict_proba(x)?;
        let idx = argmax(&proba)
            .ok_or_else(|| EstimatorError::Malformed("classifier has no classes".into()))?;
        Ok(self.classes()[idx])
    }
}
