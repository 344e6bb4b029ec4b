use std::{collections::BTreeMap, sync::Arc, time::Instant};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::{
    artifact::{Artifact, ArtifactKind, ArtifactStore, LoadedArtifact},
    config::AppConfig,
    error::ServiceError,
    model::{
        ModelKind,
        estimators::{Classifier, Regressor},
        loader::ArtifactLoader,
        transform::LabelEncoder,
    },
    preprocess::Preprocessor,
};

/// One atomically published, internally consistent set of artifacts.
#[derive(Debug, Default)]
pub struct Generation {
    id: u64,
    artifacts: BTreeMap<&'static str, Arc<LoadedArtifact>>,
}

impl Generation {
    pub fn new(id: u64, artifacts: BTreeMap<&'static str, Arc<LoadedArtifact>>) -> Self {
        Self { id, artifacts }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn get(&self, key: &str) -> Option<&Arc<LoadedArtifact>> {
        self.artifacts.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.artifacts.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Loaded keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        self.artifacts.keys().copied().collect()
    }

    pub fn missing(&self, keys: &[&str]) -> Vec<String> {
        keys.iter()
            .filter(|key| !self.contains(key))
            .map(|key| key.to_string())
            .collect()
    }

    /// Assembles everything `model` needs from this generation alone.
    pub fn bundle(&self, model: ModelKind) -> Result<ModelBundle, ServiceError> {
        let key = model.key();
        let loaded = self
            .get(key)
            .ok_or_else(|| ServiceError::ModelUnavailable(vec![key.to_string()]))?;
        let estimator = match (&loaded.payload, model.estimator_kind()) {
            (Artifact::Regressor(m), ArtifactKind::Regressor)
            | (Artifact::NeuralEstimator(m), ArtifactKind::NeuralEstimator) => {
                Estimator::Regressor(m.clone())
            }
            (Artifact::Classifier(m), ArtifactKind::Classifier) => {
                Estimator::Classifier(m.clone())
            }
            (other, expected) => {
                return Err(ServiceError::artifact(
                    key,
                    format!("expected {expected:?}, found {:?}", other.kind()),
                ));
            }
        };

        let preprocessor = Preprocessor::for_model(self, model)?;

        let encoder = match model.encoder_key() {
            None => None,
            Some(encoder_key) => match self.get(encoder_key).map(|a| &a.payload) {
                Some(Artifact::Encoder(encoder)) => Some(encoder.clone()),
                Some(other) => {
                    return Err(ServiceError::artifact(
                        encoder_key,
                        format!("expected an encoder, found {:?}", other.kind()),
                    ));
                }
                None => {
                    return Err(ServiceError::ModelUnavailable(vec![encoder_key.to_string()]));
                }
            },
        };

        let sources = model
            .required_keys()
            .into_iter()
            .filter_map(|k| self.get(k).map(|a| (k, a.generation)))
            .collect();

        Ok(ModelBundle {
            model,
            generation: self.id,
            estimator,
            encoder,
            preprocessor,
            sources,
        })
    }
}

#[derive(Debug, Clone)]
pub enum Estimator {
    Regressor(Arc<Regressor>),
    Classifier(Arc<Classifier>),
}

/// Estimator, transforms and label map of one model, taken from one generation.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub model: ModelKind,
    pub generation: u64,
    pub estimator: Estimator,
    pub encoder: Option<Arc<LabelEncoder>>,
    pub preprocessor: Preprocessor,
    /// Generation each constituent artifact was loaded in.
    pub sources: Vec<(&'static str, u64)>,
}

impl ModelBundle {
    pub fn regressor(&self) -> Result<Arc<Regressor>, ServiceError> {
        match &self.estimator {
            Estimator::Regressor(model) => Ok(model.clone()),
            Estimator::Classifier(_) => Err(ServiceError::Inference(format!(
                "{} is not a regressor",
                self.model.key()
            ))),
        }
    }

    pub fn classifier(&self) -> Result<Arc<Classifier>, ServiceError> {
        match &self.estimator {
            Estimator::Classifier(model) => Ok(model.clone()),
            Estimator::Regressor(_) => Err(ServiceError::Inference(format!(
                "{} is not a classifier",
                self.model.key()
            ))),
        }
    }
}

/// Holds the current artifact generation and swaps it on reload.
pub struct ModelRegistry {
    store: Arc<dyn ArtifactStore>,
    loader: ArtifactLoader,
    current: RwLock<Arc<Generation>>,
    /// Serialises loads so concurrent misses share one pass over the store.
    load_gate: tokio::sync::Mutex<u64>,
}

impl ModelRegistry {
    /// Registry with an empty generation; nothing is read until `load`.
    pub fn new(config: &AppConfig, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            loader: ArtifactLoader::new(config),
            current: RwLock::new(Arc::new(Generation::default())),
            load_gate: tokio::sync::Mutex::new(0),
        }
    }

    /// Builds the registry and performs the initial load. Missing artifacts
    /// are tolerated; requests needing them get `ModelUnavailable`.
    pub async fn initialize(config: &AppConfig, store: Arc<dyn ArtifactStore>) -> Self {
        let registry = Self::new(config, store);
        registry.load().await;
        registry
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    pub fn available_keys(&self) -> Vec<&'static str> {
        self.snapshot().keys()
    }

    pub fn models_loaded(&self) -> bool {
        !self.snapshot().is_empty()
    }

    /// Reads every artifact and publishes the result as a new generation.
    pub async fn load(&self) -> Arc<Generation> {
        let mut last_id = self.load_gate.lock().await;
        self.load_locked(&mut last_id).await
    }

    /// Forces a fresh load.
    pub async fn reload(&self) -> Arc<Generation> {
        info!("reloading model artifacts");
        self.load().await
    }

    async fn load_locked(&self, last_id: &mut u64) -> Arc<Generation> {
        let started = Instant::now();
        let id = *last_id + 1;
        let report = self.loader.load_all(self.store.as_ref(), id).await;
        let generation = Arc::new(Generation::new(id, report.artifacts));

        *self.current.write() = generation.clone();
        *last_id = id;

        info!(
            generation = id,
            loaded = generation.keys().len(),
            failed = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "published artifact generation"
        );
        generation
    }

    /// Returns a generation holding every key, reloading at most once.
    pub async fn ensure_available(&self, keys: &[&str]) -> Result<Arc<Generation>, ServiceError> {
        let observed = self.snapshot();
        let missing = observed.missing(keys);
        if missing.is_empty() {
            return Ok(observed);
        }

        warn!(?missing, "artifacts missing, attempting one reload");
        let mut last_id = self.load_gate.lock().await;
        let current = self.snapshot();
        let refreshed = if current.id() != observed.id() {
            // Another request reloaded while we waited.
            current
        } else {
            self.load_locked(&mut last_id).await
        };
        drop(last_id);

        let missing = refreshed.missing(keys);
        if missing.is_empty() {
            Ok(refreshed)
        } else {
            Err(ServiceError::ModelUnavailable(missing))
        }
    }
}
