//! The six prediction use-cases.
//!
//! Every use-case runs the same pipeline: validate against the endpoint's
//! contract, make sure the model's artifacts are loaded, take one bundle from
//! one generation, transform, run the estimator once on the blocking pool,
//! then interpret.

mod types;

use std::{collections::BTreeMap, sync::Arc};

use serde_json::Value;
use tokio::task;
use tracing::debug;

use crate::{
    contract::{self, FeatureContract, ValidatedInput},
    error::ServiceError,
    interpret::{self, percent, round2},
    model::{ModelBundle, ModelKind, ModelRegistry, estimators::EstimatorError},
};

pub use types::{
    AllergenResponse, HydrationResponse, RecommendationResponse, SatisfactionResponse,
    SkinTypeResponse, SuitabilityResponse,
};

struct Prepared {
    input: ValidatedInput,
    bundle: ModelBundle,
    features: Vec<f64>,
}

/// Class prediction together with the probability of every class.
struct ClassOutput {
    label: i64,
    classes: Vec<i64>,
    proba: Vec<f64>,
}

impl ClassOutput {
    fn confidence(&self) -> f64 {
        percent(self.proba.iter().copied().fold(0.0, f64::max))
    }

    fn probability_of(&self, class: i64) -> Option<f64> {
        self.classes
            .iter()
            .position(|&c| c == class)
            .map(|idx| self.proba[idx])
    }
}

#[derive(Clone)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
}

impl PredictionService {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    async fn prepare(
        &self,
        contract: &'static FeatureContract,
        raw: &Value,
    ) -> Result<Prepared, ServiceError> {
        let input = contract.validate(raw)?;
        let model = contract.model;
        let generation = self
            .registry
            .ensure_available(&model.required_keys())
            .await?;
        let bundle = generation.bundle(model)?;
        let features = bundle.preprocessor.transform(&input.to_vector())?;
        debug!(
            model = model.key(),
            generation = bundle.generation,
            "prepared prediction"
        );
        Ok(Prepared {
            input,
            bundle,
            features,
        })
    }

    async fn regress(
        &self,
        contract: &'static FeatureContract,
        raw: &Value,
    ) -> Result<(ValidatedInput, f64), ServiceError> {
        let Prepared {
            input,
            bundle,
            features,
        } = self.prepare(contract, raw).await?;
        let model = bundle.regressor()?;
        let score = run_blocking(move || model.predict(&features)).await?;
        Ok((input, score))
    }

    async fn classify(
        &self,
        contract: &'static FeatureContract,
        raw: &Value,
    ) -> Result<(ValidatedInput, ModelBundle, ClassOutput), ServiceError> {
        let Prepared {
            input,
            bundle,
            features,
        } = self.prepare(contract, raw).await?;
        let model = bundle.classifier()?;
        let output = run_blocking(move || {
            let proba = model.predict_proba(&features)?;
            let label = model.predict(&features)?;
            Ok(ClassOutput {
                label,
                classes: model.classes().to_vec(),
                proba,
            })
        })
        .await?;
        Ok((input, bundle, output))
    }

    /// Hydration estimate (linear regression).
    pub async fn predict_hydration(&self, raw: &Value) -> Result<HydrationResponse, ServiceError> {
        let (input, score) = self.regress(&contract::HYDRATION, raw).await?;
        let reading = interpret::hydration(score);
        Ok(HydrationResponse {
            algorithm: ModelKind::LinearRegression.algorithm(),
            predicted_hydration_level: round2(score),
            interpretation: reading.interpretation,
            recommendation: reading.recommendation,
            input_features: input,
        })
    }

    /// Skin-type classification (naive Bayes).
    pub async fn predict_skin_type(&self, raw: &Value) -> Result<SkinTypeResponse, ServiceError> {
        let (input, bundle, output) = self.classify(&contract::SKIN_TYPE, raw).await?;
        let encoder = bundle.encoder.as_ref().ok_or_else(|| {
            ServiceError::ModelUnavailable(vec!["naive_bayes_encoder".to_string()])
        })?;
        let decode = |class: i64| {
            encoder.inverse_transform(class).ok_or_else(|| {
                ServiceError::Inference(format!("class {class} is not in the label encoder"))
            })
        };

        let skin_type = decode(output.label)?;
        let recommendation = interpret::skin_type_recommendation(skin_type).ok_or_else(|| {
            ServiceError::Inference(format!("no recommendation for skin type '{skin_type}'"))
        })?;
        let mut all_probabilities = BTreeMap::new();
        for (&class, &p) in output.classes.iter().zip(&output.proba) {
            all_probabilities.insert(decode(class)?.to_string(), percent(p));
        }

        Ok(SkinTypeResponse {
            algorithm: ModelKind::NaiveBayes.algorithm(),
            predicted_skin_type: skin_type.to_string(),
            confidence: output.confidence(),
            all_probabilities,
            recommendation,
            input_features: input,
        })
    }

    /// Product recommendation (k-nearest neighbours).
    pub async fn recommend_product(
        &self,
        raw: &Value,
    ) -> Result<RecommendationResponse, ServiceError> {
        let (input, _, output) = self.classify(&contract::RECOMMENDATION, raw).await?;
        let would_recommend = output.label != 0;
        Ok(RecommendationResponse {
            algorithm: ModelKind::Knn.algorithm(),
            recommendation: interpret::product_recommendation(would_recommend),
            would_recommend,
            confidence: output.confidence(),
            explanation: "Based on similar users' experiences and satisfaction scores",
            similar_users_liked: would_recommend,
            input_features: input,
        })
    }

    /// Allergen-risk detection (SVM). Reports `P(class = 1)`, not the
    /// probability of whichever class won.
    pub async fn detect_allergen_risk(&self, raw: &Value) -> Result<AllergenResponse, ServiceError> {
        let (input, _, output) = self.classify(&contract::ALLERGEN, raw).await?;
        let has_risk = output.label != 0;
        let positive = output
            .probability_of(1)
            .ok_or_else(|| ServiceError::Inference("allergen model has no class 1".into()))?;
        let reading = interpret::allergen(has_risk);
        Ok(AllergenResponse {
            algorithm: ModelKind::Svm.algorithm(),
            allergen_risk: reading.risk_level,
            has_risk,
            risk_probability: percent(positive),
            warning: reading.warning,
            advice: reading.advice,
            input_features: input,
        })
    }

    /// Suitability classification (tree ensemble, unscaled).
    pub async fn classify_suitability(
        &self,
        raw: &Value,
    ) -> Result<SuitabilityResponse, ServiceError> {
        let (input, _, output) = self.classify(&contract::SUITABILITY, raw).await?;
        let is_suitable = output.label != 0;
        let reading = interpret::suitability(is_suitable);
        Ok(SuitabilityResponse {
            algorithm: ModelKind::DecisionTree.algorithm(),
            verdict: reading.verdict,
            is_suitable,
            confidence: output.confidence(),
            explanation: reading.explanation,
            expected_satisfaction: reading.expected_satisfaction,
            input_features: input,
        })
    }

    /// Satisfaction score (neural network).
    pub async fn predict_satisfaction(
        &self,
        raw: &Value,
    ) -> Result<SatisfactionResponse, ServiceError> {
        let (input, score) = self.regress(&contract::SATISFACTION, raw).await?;
        let reading = interpret::satisfaction(score);
        Ok(SatisfactionResponse {
            algorithm: ModelKind::Ann.algorithm(),
            predicted_satisfaction_score: round2(score),
            rating: reading.rating.label(),
            interpretation: reading.interpretation,
            recommendation: reading.recommendation,
            deep_learning_insight: "This prediction uses neural network analysis of complex patterns in user-product interactions",
            input_features: input,
        })
    }
}

/// Runs one inference call on the blocking pool. Never retried.
async fn run_blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EstimatorError> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|err| ServiceError::Inference(format!("inference task failed: {err}")))?
        .map_err(|err| ServiceError::Inference(err.to_string()))
}
