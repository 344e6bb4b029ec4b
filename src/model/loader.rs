use std::{collections::BTreeMap, sync::Arc};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{
    artifact::{Artifact, ArtifactKind, ArtifactSpec, ArtifactStore, LoadedArtifact},
    config::{AppConfig, NeuralBackend},
    error::ServiceError,
    model::{
        ModelKind,
        estimators::{Classifier, Regressor},
        transform::{FeatureOrder, LabelEncoder, Scaler},
    },
};

/// Reads and decodes the full artifact set from a store.
pub struct ArtifactLoader {
    specs: Vec<ArtifactSpec>,
    #[cfg_attr(not(feature = "tch-backend"), allow(dead_code))]
    backend: NeuralBackend,
    #[cfg(feature = "tch-backend")]
    device: tch::Device,
}

/// Outcome of one pass over the store: whatever decoded, plus the failures.
pub struct LoadReport {
    pub artifacts: BTreeMap<&'static str, Arc<LoadedArtifact>>,
    pub failures: Vec<(&'static str, ServiceError)>,
}

impl ArtifactLoader {
    pub fn new(config: &AppConfig) -> Self {
        let specs = ModelKind::ALL
            .iter()
            .flat_map(|model| model.artifact_specs())
            .map(|mut spec| {
                if spec.kind == ArtifactKind::NeuralEstimator
                    && config.neural_backend == NeuralBackend::TorchScript
                {
                    spec.file = spec.file.replace(".json", ".pt");
                }
                spec
            })
            .collect();

        Self {
            specs,
            backend: config.neural_backend,
            #[cfg(feature = "tch-backend")]
            device: config.device,
        }
    }

    pub fn specs(&self) -> &[ArtifactSpec] {
        &self.specs
    }

    /// Loads every artifact independently; a failing artifact is logged and
    /// left out rather than aborting the pass.
    pub async fn load_all(&self, store: &dyn ArtifactStore, generation: u64) -> LoadReport {
        let mut artifacts = BTreeMap::new();
        let mut failures = Vec::new();

        for spec in &self.specs {
            match self.load_one(store, spec, generation).await {
                Ok(artifact) => {
                    debug!(key = spec.key, generation, "artifact loaded");
                    artifacts.insert(spec.key, Arc::new(artifact));
                }
                Err(err) => {
                    warn!(
                        key = spec.key,
                        location = %store.locate(&spec.file).display(),
                        error = %err,
                        "failed to load artifact, skipping"
                    );
                    failures.push((spec.key, err));
                }
            }
        }

        info!(
            generation,
            loaded = artifacts.len(),
            failed = failures.len(),
            "artifact pass complete"
        );

        LoadReport {
            artifacts,
            failures,
        }
    }

    async fn load_one(
        &self,
        store: &dyn ArtifactStore,
        spec: &ArtifactSpec,
        generation: u64,
    ) -> Result<LoadedArtifact, ServiceError> {
        let bytes = store.fetch(&spec.file).await?;
        let payload = self.decode(spec, &bytes)?;
        Ok(LoadedArtifact {
            key: spec.key,
            generation,
            size_bytes: bytes.len() as u64,
            payload,
        })
    }

    pub fn decode(&self, spec: &ArtifactSpec, bytes: &[u8]) -> Result<Artifact, ServiceError> {
        let key = spec.key;
        let payload = match spec.kind {
            ArtifactKind::Regressor => Artifact::Regressor(Arc::new(decode_regressor(key, bytes)?)),
            ArtifactKind::Classifier => {
                let model: Classifier = parse_json(key, bytes)?;
                model
                    .validate()
                    .map_err(|e| ServiceError::artifact(key, e))?;
                Artifact::Classifier(Arc::new(model))
            }
            ArtifactKind::Scaler => {
                let scaler: Scaler = parse_json(key, bytes)?;
                scaler
                    .validate()
                    .map_err(|e| ServiceError::artifact(key, e))?;
                Artifact::Scaler(Arc::new(scaler))
            }
            ArtifactKind::Encoder => {
                let encoder: LabelEncoder = parse_json(key, bytes)?;
                if encoder.classes.is_empty() {
                    return Err(ServiceError::artifact(key, "encoder has no classes"));
                }
                Artifact::Encoder(Arc::new(encoder))
            }
            ArtifactKind::FeatureList => {
                let order: FeatureOrder = parse_json(key, bytes)?;
                if order.is_empty() {
                    return Err(ServiceError::artifact(key, "feature list is empty"));
                }
                Artifact::FeatureList(Arc::new(order))
            }
            ArtifactKind::NeuralEstimator => {
                Artifact::NeuralEstimator(Arc::new(self.decode_neural(key, bytes)?))
            }
        };
        Ok(payload)
    }

    #[cfg(feature = "tch-backend")]
    fn decode_neural(&self, key: &str, bytes: &[u8]) -> Result<Regressor, ServiceError> {
        use crate::model::estimators::torchscript::TorchScriptModule;

        match self.backend {
            NeuralBackend::Native => decode_regressor(key, bytes),
            NeuralBackend::TorchScript => {
                let module = TorchScriptModule::from_bytes(bytes, self.device)
                    .map_err(|e| ServiceError::artifact(key, e))?;
                Ok(Regressor::TorchScript(Arc::new(module)))
            }
        }
    }

    #[cfg(not(feature = "tch-backend"))]
    fn decode_neural(&self, key: &str, bytes: &[u8]) -> Result<Regressor, ServiceError> {
        decode_regressor(key, bytes)
    }
}

fn parse_json<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(bytes).map_err(|e| ServiceError::artifact(key, e))
}

fn decode_regressor(key: &str, bytes: &[u8]) -> Result<Regressor, ServiceError> {
    let model: Regressor = parse_json(key, bytes)?;
    model
        .validate()
        .map_err(|e| ServiceError::artifact(key, e))?;
    Ok(model)
}
