use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact not found: {0}")]
    NotFound(String),
    #[error("failed to read artifact {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Durable source of named artifact blobs.
///
/// The gateway never writes through this trait; artifacts are produced by the
/// training pipeline and only read here.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StoreError>;

    /// Human-readable location of `name`, used in logs and error messages.
    fn locate(&self, name: &str) -> PathBuf;
}

/// Artifacts stored as flat files in one directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.root.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.display().to_string()))
            }
            Err(source) => Err(StoreError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn locate(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// In-process store, handy for tests and for embedding the gateway.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.write().insert(name.into(), bytes.into());
    }

    pub fn insert_json(&self, name: impl Into<String>, value: &serde_json::Value) {
        self.insert(name, value.to_string());
    }

    pub fn remove(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.write().remove(name)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn locate(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("memory://{name}"))
    }
}
