#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use skinsync_gateway::{AppConfig, MemoryArtifactStore, ModelRegistry, build_router};

fn identity_scaler(width: usize) -> Value {
    json!({"type": "standard", "mean": vec![0.0; width], "scale": vec![1.0; width]})
}

/// Registers a model's estimator, scaler and feature list.
fn register(
    store: &MemoryArtifactStore,
    key: &str,
    estimator_file: &str,
    estimator: Value,
    features: &[&str],
    scaled: bool,
) {
    store.insert_json(estimator_file, &estimator);
    if scaled {
        store.insert_json(format!("{key}_scaler.json"), &identity_scaler(features.len()));
    }
    store.insert_json(format!("{key}_features.json"), &json!(features));
}

pub const HYDRATION_FEATURES: [&str; 4] = ["age", "oil_production", "sensitivity_level", "pore_size"];

pub const SKIN_TYPE_FEATURES: [&str; 5] = [
    "age",
    "oil_production",
    "hydration_level",
    "sensitivity_level",
    "pore_size",
];

pub const RECOMMENDATION_FEATURES: [&str; 6] = [
    "age",
    "oil_production",
    "hydration_level",
    "sensitivity_level",
    "pore_size",
    "wrinkle_score",
];

pub const ALLERGEN_FEATURES: [&str; 4] = [
    "sensitivity_level",
    "has_fragrance",
    "has_alcohol",
    "is_hypoallergenic",
];

pub const SUITABILITY_FEATURES: [&str; 9] = [
    "age",
    "sensitivity_level",
    "oil_production",
    "hydration_level",
    "suitable_for_oily",
    "suitable_for_dry",
    "suitable_for_sensitive",
    "has_fragrance",
    "has_alcohol",
];

pub const SATISFACTION_FEATURES: [&str; 12] = [
    "age",
    "oil_production",
    "hydration_level",
    "sensitivity_level",
    "pore_size",
    "wrinkle_score",
    "suitable_for_oily",
    "suitable_for_dry",
    "suitable_for_sensitive",
    "has_fragrance",
    "has_alcohol",
    "is_hypoallergenic",
];

/// Constant regressor: every input predicts 3.2.
pub fn hydration_model() -> Value {
    json!({"type": "linear", "coefficients": [0.0, 0.0, 0.0, 0.0], "intercept": 3.2})
}

/// Five skin types, class means spread along oil production.
pub fn skin_type_model() -> Value {
    let theta: Vec<Vec<f64>> = (0..5)
        .map(|c| vec![30.0, 2.0 * c as f64 + 1.0, 5.0, 5.0, 5.0])
        .collect();
    json!({
        "type": "gaussian_nb",
        "classes": [0, 1, 2, 3, 4],
        "class_prior": [0.2, 0.2, 0.2, 0.2, 0.2],
        "theta": theta,
        "var": vec![vec![100.0, 4.0, 4.0, 4.0, 4.0]; 5],
    })
}

pub fn skin_type_encoder() -> Value {
    json!({"classes": ["Combination", "Dry", "Normal", "Oily", "Sensitive"]})
}

pub fn recommendation_model() -> Value {
    json!({
        "type": "k_neighbors",
        "n_neighbors": 3,
        "weights": "uniform",
        "classes": [0, 1],
        "fit_x": [
            [25.0, 5.0, 5.0, 5.0, 5.0, 5.0],
            [26.0, 5.0, 6.0, 5.0, 5.0, 4.0],
            [27.0, 6.0, 5.0, 4.0, 5.0, 5.0],
            [70.0, 9.0, 2.0, 9.0, 9.0, 9.0],
        ],
        "fit_y": [1, 1, 0, 0],
    })
}

/// Constant SVM: decision value 1.0, `P(class 1) = 0.8`.
pub fn allergen_model() -> Value {
    json!({
        "type": "svc",
        "classes": [0, 1],
        "kernel": "linear",
        "intercept": 1.0,
        "prob_a": 0.0,
        "prob_b": 4f64.ln(),
        "n_features": 4,
    })
}

/// One leaf-only tree with class distribution `[0.9, 0.1]`.
pub fn suitability_model() -> Value {
    json!({
        "type": "random_forest",
        "classes": [0, 1],
        "trees": [{
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [[9.0, 1.0]],
        }],
    })
}

pub fn satisfaction_model() -> Value {
    json!({
        "type": "mlp",
        "layers": [
            {"dense": {"weights": vec![vec![0.0; 12]; 2], "bias": [1.0, 2.0], "activation": "relu"}},
            {"batch_norm": {"gamma": [1.0, 1.0], "beta": [0.0, 0.0],
                            "moving_mean": [0.0, 0.0], "moving_variance": [1.0, 1.0],
                            "epsilon": 0.0}},
            {"dense": {"weights": [[1.5, 3.0]], "bias": [0.0], "activation": "identity"}},
        ],
    })
}

/// A store holding every artifact of all six models.
pub fn full_store() -> Arc<MemoryArtifactStore> {
    let store = Arc::new(MemoryArtifactStore::new());
    register(
        &store,
        "linear_regression",
        "linear_regression.json",
        hydration_model(),
        &HYDRATION_FEATURES,
        true,
    );
    register(
        &store,
        "naive_bayes",
        "naive_bayes.json",
        skin_type_model(),
        &SKIN_TYPE_FEATURES,
        true,
    );
    store.insert_json("naive_bayes_encoder.json", &skin_type_encoder());
    register(
        &store,
        "knn",
        "knn.json",
        recommendation_model(),
        &RECOMMENDATION_FEATURES,
        true,
    );
    register(&store, "svm", "svm.json", allergen_model(), &ALLERGEN_FEATURES, true);
    register(
        &store,
        "decision_tree",
        "decision_tree.json",
        suitability_model(),
        &SUITABILITY_FEATURES,
        false,
    );
    register(
        &store,
        "ann",
        "ann_model.json",
        satisfaction_model(),
        &SATISFACTION_FEATURES,
        true,
    );
    store
}

pub async fn registry(store: Arc<MemoryArtifactStore>) -> Arc<ModelRegistry> {
    Arc::new(ModelRegistry::initialize(&AppConfig::default(), store).await)
}

pub async fn app(store: Arc<MemoryArtifactStore>) -> (Router, Arc<ModelRegistry>) {
    let registry = registry(store).await;
    let router = build_router(Arc::new(AppConfig::default()), registry.clone());
    (router, registry)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, uri, Some("application/json"), body.to_string()).await
}

/// Posts `body` as-is, optionally without a content type.
pub async fn post_raw(
    router: &Router,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.into())).unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn hydration_request() -> Value {
    json!({"age": 30, "oil_production": 5, "sensitivity_level": 4, "pore_size": 6})
}

pub fn skin_type_request() -> Value {
    json!({"age": 28, "oil_production": 7, "hydration_level": 4, "sensitivity_level": 5, "pore_size": 6})
}

pub fn recommendation_request() -> Value {
    json!({"age": 26, "oil_production": 5, "hydration_level": 5, "sensitivity_level": 5,
           "pore_size": 5, "wrinkle_score": 5})
}

pub fn allergen_request() -> Value {
    json!({"sensitivity_level": 8, "has_fragrance": 1, "has_alcohol": 0, "is_hypoallergenic": 0})
}

pub fn suitability_request() -> Value {
    json!({"age": 35, "sensitivity_level": 6, "oil_production": 4, "hydration_level": 5,
           "suitable_for_oily": 0, "suitable_for_dry": 1, "suitable_for_sensitive": 1,
           "has_fragrance": 0, "has_alcohol": 0})
}

pub fn satisfaction_request() -> Value {
    json!({"age": 40, "oil_production": 5, "hydration_level": 6, "sensitivity_level": 3,
           "pore_size": 4, "wrinkle_score": 6, "suitable_for_oily": 1, "suitable_for_dry": 0,
           "suitable_for_sensitive": 1, "has_fragrance": 0, "has_alcohol": 0,
           "is_hypoallergenic": 1})
}

/// Every prediction endpoint with a valid request body.
pub fn all_requests() -> Vec<(&'static str, Value)> {
    vec![
        ("/predict/linear-regression", hydration_request()),
        ("/predict/naive-bayes", skin_type_request()),
        ("/predict/knn", recommendation_request()),
        ("/predict/svm", allergen_request()),
        ("/predict/decision-tree", suitability_request()),
        ("/predict/ann", satisfaction_request()),
    ]
}
