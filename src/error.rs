use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::artifact::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid value for '{field}': {constraint}")]
    FeatureValidation { field: String, constraint: String },
    #[error("Models not loaded: {}. Train and try /models/reload.", .0.join(", "))]
    ModelUnavailable(Vec<String>),
    #[error("model execution failed: {0}")]
    Inference(String),
    #[error("feature order mismatch for {model}: expected {expected:?}, got {actual:?}")]
    FeatureOrderMismatch {
        model: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("metrics document not found at {}. Run the training pipeline first.", .0.display())]
    MetricsNotFound(PathBuf),
    #[error("artifact '{key}' is invalid: {reason}")]
    Artifact { key: String, reason: String },
    #[error("artifact store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("other: {0}")]
    Other(String),
}

impl ServiceError {
    pub fn validation(field: &str, constraint: impl Into<String>) -> Self {
        ServiceError::FeatureValidation {
            field: field.to_string(),
            constraint: constraint.into(),
        }
    }

    pub fn artifact(key: &str, reason: impl std::fmt::Display) -> Self {
        ServiceError::Artifact {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::FeatureValidation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::MetricsNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Inference(_)
            | ServiceError::FeatureOrderMismatch { .. }
            | ServiceError::Artifact { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Store(_) | ServiceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Unparsable or mistyped request bodies are caller input errors.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::validation("body", rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "detail": self.to_string(),
        });

        (status, axum::Json(body)).into_response()
    }
}
