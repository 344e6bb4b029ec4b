use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::AppConfig,
    contract,
    dispatch::{
        AllergenResponse, HydrationResponse, PredictionService, RecommendationResponse,
        SatisfactionResponse, SkinTypeResponse, SuitabilityResponse,
    },
    error::ServiceError,
    metrics::MetricsSurface,
    model::{ModelInfo, ModelKind, ModelRegistry},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ModelRegistry>,
    pub service: PredictionService,
    pub metrics: MetricsSurface,
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
    status: &'static str,
    models_loaded: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    models_loaded: bool,
}

#[derive(Serialize)]
struct CatalogResponse {
    models: &'static [ModelInfo],
}

#[derive(Serialize)]
struct ReloadResponse {
    status: &'static str,
    generation: u64,
    loaded_keys: Vec<&'static str>,
}

/// Built from the contracts, so the advertised inputs are the enforced ones.
static CATALOG: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    ModelKind::ALL
        .iter()
        .map(|&model| ModelInfo {
            name: model.algorithm(),
            endpoint: model.endpoint(),
            purpose: model.purpose(),
            input_features: contract::for_model(model).field_names(),
            output: model.output(),
        })
        .collect()
});

pub fn build_router(config: Arc<AppConfig>, registry: Arc<ModelRegistry>) -> Router {
    let state = AppState {
        service: PredictionService::new(registry.clone()),
        metrics: MetricsSurface::new(registry.store().clone(), config.metrics_file.clone()),
        registry,
        config,
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/models/info", get(models_info))
        .route("/models/metrics", get(models_metrics))
        .route("/models/reload", get(reload_models))
        .route("/predict/linear-regression", post(predict_hydration))
        .route("/predict/naive-bayes", post(predict_skin_type))
        .route("/predict/knn", post(recommend_product))
        .route("/predict/svm", post(detect_allergen_risk))
        .route("/predict/decision-tree", post(classify_suitability))
        .route("/predict/ann", post(predict_satisfaction))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "SkinSync ML API is running",
        version: env!("CARGO_PKG_VERSION"),
        status: "healthy",
        models_loaded: state.registry.models_loaded(),
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        models_loaded: state.registry.models_loaded(),
    })
}

async fn models_info() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        models: CATALOG.as_slice(),
    })
}

async fn models_metrics(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    let document = state.metrics.document().await?;
    Ok(Json(json!({ "metrics": document })))
}

async fn reload_models(State(state): State<AppState>) -> Json<ReloadResponse> {
    let generation = state.registry.reload().await;
    info!(
        generation = generation.id(),
        models_dir = %state.config.models_dir.display(),
        "reload requested"
    );
    Json(ReloadResponse {
        status: "ok",
        generation: generation.id(),
        loaded_keys: generation.keys(),
    })
}

async fn predict_hydration(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<HydrationResponse>, ServiceError> {
    let Json(body) = payload?;
    Ok(Json(state.service.predict_hydration(&body).await?))
}

async fn predict_skin_type(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SkinTypeResponse>, ServiceError> {
    let Json(body) = payload?;
    Ok(Json(state.service.predict_skin_type(&body).await?))
}

async fn recommend_product(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RecommendationResponse>, ServiceError> {
    let Json(body) = payload?;
    Ok(Json(state.service.recommend_product(&body).await?))
}

async fn detect_allergen_risk(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AllergenResponse>, ServiceError> {
    let Json(body) = payload?;
    Ok(Json(state.service.detect_allergen_risk(&body).await?))
}

async fn classify_suitability(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SuitabilityResponse>, ServiceError> {
    let Json(body) = payload?;
    Ok(Json(state.service.classify_suitability(&body).await?))
}

async fn predict_satisfaction(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SatisfactionResponse>, ServiceError> {
    let Json(body) = payload?;
    Ok(Json(state.service.predict_satisfaction(&body).await?))
}
