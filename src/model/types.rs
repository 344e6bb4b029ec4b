use serde::Serialize;

use crate::artifact::{ArtifactKind, ArtifactSpec};

/// The six served models. Each owns one estimator artifact plus the
/// transforms it was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    NaiveBayes,
    Knn,
    Svm,
    DecisionTree,
    Ann,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        ModelKind::LinearRegression,
        ModelKind::NaiveBayes,
        ModelKind::Knn,
        ModelKind::Svm,
        ModelKind::DecisionTree,
        ModelKind::Ann,
    ];

    /// Registry key of the estimator artifact.
    pub fn key(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::NaiveBayes => "naive_bayes",
            ModelKind::Knn => "knn",
            ModelKind::Svm => "svm",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::Ann => "ann",
        }
    }

    pub fn algorithm(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::NaiveBayes => "Naive Bayes",
            ModelKind::Knn => "K-Nearest Neighbors (KNN)",
            ModelKind::Svm => "Support Vector Machine (SVM)",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::Ann => "Artificial Neural Network (ANN)",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "/predict/linear-regression",
            ModelKind::NaiveBayes => "/predict/naive-bayes",
            ModelKind::Knn => "/predict/knn",
            ModelKind::Svm => "/predict/svm",
            ModelKind::DecisionTree => "/predict/decision-tree",
            ModelKind::Ann => "/predict/ann",
        }
    }

    pub fn purpose(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => {
                "Predict skin hydration levels based on user characteristics"
            }
            ModelKind::NaiveBayes => {
                "Classify skin type (Oily, Dry, Combination, Sensitive, Normal)"
            }
            ModelKind::Knn => "Recommend products based on similar user profiles",
            ModelKind::Svm => "Detect potential allergen risks and reactions",
            ModelKind::DecisionTree => "Classify product suitability for user",
            ModelKind::Ann => "Predict product satisfaction score using deep learning",
        }
    }

    pub fn output(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Predicted hydration level (1-10 scale)",
            ModelKind::NaiveBayes => "Predicted skin type and probability",
            ModelKind::Knn => "Product recommendation (Yes/No) and confidence",
            ModelKind::Svm => "Allergen risk assessment and probability",
            ModelKind::DecisionTree => "Suitability classification and confidence",
            ModelKind::Ann => "Predicted satisfaction score (1-10 scale)",
        }
    }

    pub fn estimator_kind(self) -> ArtifactKind {
        match self {
            ModelKind::LinearRegression => ArtifactKind::Regressor,
            ModelKind::Ann => ArtifactKind::NeuralEstimator,
            _ => ArtifactKind::Classifier,
        }
    }

    /// Tree ensembles are trained on raw features.
    pub fn scaler_key(self) -> Option<&'static str> {
        match self {
            ModelKind::LinearRegression => Some("linear_regression_scaler"),
            ModelKind::NaiveBayes => Some("naive_bayes_scaler"),
            ModelKind::Knn => Some("knn_scaler"),
            ModelKind::Svm => Some("svm_scaler"),
            ModelKind::DecisionTree => None,
            ModelKind::Ann => Some("ann_scaler"),
        }
    }

    pub fn encoder_key(self) -> Option<&'static str> {
        match self {
            ModelKind::NaiveBayes => Some("naive_bayes_encoder"),
            _ => None,
        }
    }

    pub fn features_key(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear_regression_features",
            ModelKind::NaiveBayes => "naive_bayes_features",
            ModelKind::Knn => "knn_features",
            ModelKind::Svm => "svm_features",
            ModelKind::DecisionTree => "decision_tree_features",
            ModelKind::Ann => "ann_features",
        }
    }

    /// Every artifact key a prediction with this model needs.
    pub fn required_keys(self) -> Vec<&'static str> {
        let mut keys = vec![self.key()];
        keys.extend(self.scaler_key());
        keys.extend(self.encoder_key());
        keys.push(self.features_key());
        keys
    }

    /// File name of the estimator. The network keeps the name the training
    /// pipeline has always written.
    pub fn estimator_file(self) -> String {
        match self {
            ModelKind::Ann => "ann_model.json".to_string(),
            _ => format!("{}.json", self.key()),
        }
    }

    pub fn artifact_specs(self) -> Vec<ArtifactSpec> {
        let mut specs = vec![ArtifactSpec::new(
            self.key(),
            self.estimator_file(),
            self.estimator_kind(),
        )];
        if let Some(key) = self.scaler_key() {
            specs.push(ArtifactSpec::json(key, ArtifactKind::Scaler));
        }
        if let Some(key) = self.encoder_key() {
            specs.push(ArtifactSpec::json(key, ArtifactKind::Encoder));
        }
        specs.push(ArtifactSpec::json(self.features_key(), ArtifactKind::FeatureList));
        specs
    }
}

/// Entry of the static model catalog served at `/models/info`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub endpoint: &'static str,
    pub purpose: &'static str,
    pub input_features: Vec<&'static str>,
    pub output: &'static str,
}
