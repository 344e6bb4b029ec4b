pub mod store;

use std::sync::Arc;

use serde::Serialize;

use crate::model::estimators::{Classifier, Regressor};
use crate::model::transform::{FeatureOrder, LabelEncoder, Scaler};

pub use store::{ArtifactStore, FsArtifactStore, MemoryArtifactStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Regressor,
    Classifier,
    Scaler,
    Encoder,
    FeatureList,
    NeuralEstimator,
}

/// Where an artifact lives in the store and what it must decode to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub key: &'static str,
    pub file: String,
    pub kind: ArtifactKind,
}

impl ArtifactSpec {
    pub fn new(key: &'static str, file: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            key,
            file: file.into(),
            kind,
        }
    }

    /// Spec whose file is `<key>.json`.
    pub fn json(key: &'static str, kind: ArtifactKind) -> Self {
        Self::new(key, format!("{key}.json"), kind)
    }
}

/// Decoded artifact payload.
#[derive(Debug, Clone)]
pub enum Artifact {
    Regressor(Arc<Regressor>),
    Classifier(Arc<Classifier>),
    Scaler(Arc<Scaler>),
    Encoder(Arc<LabelEncoder>),
    FeatureList(Arc<FeatureOrder>),
    NeuralEstimator(Arc<Regressor>),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Regressor(_) => ArtifactKind::Regressor,
            Artifact::Classifier(_) => ArtifactKind::Classifier,
            Artifact::Scaler(_) => ArtifactKind::Scaler,
            Artifact::Encoder(_) => ArtifactKind::Encoder,
            Artifact::FeatureList(_) => ArtifactKind::FeatureList,
            Artifact::NeuralEstimator(_) => ArtifactKind::NeuralEstimator,
        }
    }
}

/// An artifact as held by one registry generation. Never mutated.
#[derive(Debug)]
pub struct LoadedArtifact {
    pub key: &'static str,
    pub generation: u64,
    pub size_bytes: u64,
    pub payload: Artifact,
}

impl LoadedArtifact {
    pub fn kind(&self) -> ArtifactKind {
        self.payload.kind()
    }
}
