use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{
    artifact::{ArtifactStore, StoreError},
    error::ServiceError,
};

/// Read-only view of the training metrics persisted next to the artifacts.
///
/// The document is fetched on every call and returned as-is; the gateway
/// never computes or caches metrics of its own.
#[derive(Clone)]
pub struct MetricsSurface {
    store: Arc<dyn ArtifactStore>,
    file: String,
}

impl MetricsSurface {
    pub fn new(store: Arc<dyn ArtifactStore>, file: impl Into<String>) -> Self {
        Self {
            store,
            file: file.into(),
        }
    }

    pub async fn document(&self) -> Result<Value, ServiceError> {
        let bytes = match self.store.fetch(&self.file).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => {
                return Err(ServiceError::MetricsNotFound(self.store.locate(&self.file)));
            }
            Err(err) => return Err(err.into()),
        };
        debug!(file = %self.file, size = bytes.len(), "read metrics document");
        serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Other(format!("invalid metrics document: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::artifact::{FsArtifactStore, MemoryArtifactStore};

    #[tokio::test]
    async fn returns_document_verbatim() {
        let store = Arc::new(MemoryArtifactStore::new());
        let doc = json!({"svm": {"accuracy": 0.91, "f1": 0.88}, "ann": {"r2": 0.74}});
        store.insert_json("metrics.json", &doc);

        let surface = MetricsSurface::new(store, "metrics.json");
        assert_eq!(surface.document().await.unwrap(), doc);
    }

    #[tokio::test]
    async fn missing_document_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let surface = MetricsSurface::new(
            Arc::new(FsArtifactStore::new(dir.path())),
            "metrics.json",
        );
        match surface.document().await.unwrap_err() {
            ServiceError::MetricsNotFound(path) => {
                assert_eq!(path, dir.path().join("metrics.json"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_is_a_server_error() {
        let store = Arc::new(MemoryArtifactStore::new());
        store.insert("metrics.json", b"{not json".to_vec());
        let err = MetricsSurface::new(store, "metrics.json")
            .document()
            .await
            .unwrap_err();
        assert!(err.status().is_server_error());
    }
}
