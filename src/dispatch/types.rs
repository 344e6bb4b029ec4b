use std::collections::BTreeMap;

use serde::Serialize;

use crate::contract::ValidatedInput;

#[derive(Debug, Clone, Serialize)]
pub struct HydrationResponse {
    pub algorithm: &'static str,
    pub predicted_hydration_level: f64,
    pub interpretation: &'static str,
    pub recommendation: &'static str,
    pub input_features: ValidatedInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkinTypeResponse {
    pub algorithm: &'static str,
    pub predicted_skin_type: String,
    pub confidence: f64,
    /// Percentage per declared skin type.
    pub all_probabilities: BTreeMap<String, f64>,
    pub recommendation: &'static str,
    pub input_features: ValidatedInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub algorithm: &'static str,
    pub recommendation: &'static str,
    pub would_recommend: bool,
    pub confidence: f64,
    pub explanation: &'static str,
    pub similar_users_liked: bool,
    pub input_features: ValidatedInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllergenResponse {
    pub algorithm: &'static str,
    pub allergen_risk: &'static str,
    pub has_risk: bool,
    /// `P(reaction)` as a percentage, regardless of the predicted class.
    pub risk_probability: f64,
    pub warning: &'static str,
    pub advice: &'static str,
    pub input_features: ValidatedInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuitabilityResponse {
    pub algorithm: &'static str,
    pub verdict: &'static str,
    pub is_suitable: bool,
    pub confidence: f64,
    pub explanation: &'static str,
    pub expected_satisfaction: &'static str,
    pub input_features: ValidatedInput,
}

#[derive(Debug, Clone, Serialize)]
pub struct SatisfactionResponse {
    pub algorithm: &'static str,
    pub predicted_satisfaction_score: f64,
    pub rating: &'static str,
    pub interpretation: String,
    pub recommendation: &'static str,
    pub deep_learning_insight: &'static str,
    pub input_features: ValidatedInput,
}
