use std::sync::Arc;

use crate::{
    artifact::Artifact,
    contract::FeatureVector,
    error::ServiceError,
    model::{Generation, ModelKind, transform::{FeatureOrder, Scaler}},
};

/// The training-time transform of one model, resolved from one generation.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    model: ModelKind,
    scaler: Option<Arc<Scaler>>,
    feature_order: Arc<FeatureOrder>,
}

impl Preprocessor {
    /// Resolves the scaler and feature list for `model`.
    ///
    /// A model whose estimator is loaded but whose scaler is not is an error,
    /// never a silent passthrough.
    pub fn for_model(generation: &Generation, model: ModelKind) -> Result<Self, ServiceError> {
        let scaler = match model.scaler_key() {
            None => None,
            Some(key) => match generation.get(key).map(|a| &a.payload) {
                Some(Artifact::Scaler(scaler)) => Some(scaler.clone()),
                Some(other) => {
                    return Err(ServiceError::artifact(
                        key,
                        format!("expected a scaler, found {:?}", other.kind()),
                    ));
                }
                None => return Err(ServiceError::ModelUnavailable(vec![key.to_string()])),
            },
        };

        let features_key = model.features_key();
        let feature_order = match generation.get(features_key).map(|a| &a.payload) {
            Some(Artifact::FeatureList(order)) => order.clone(),
            Some(other) => {
                return Err(ServiceError::artifact(
                    features_key,
                    format!("expected a feature list, found {:?}", other.kind()),
                ));
            }
            None => return Err(ServiceError::ModelUnavailable(vec![features_key.to_string()])),
        };

        if let Some(scaler) = &scaler {
            if scaler.n_features() != feature_order.len() {
                return Err(ServiceError::artifact(
                    model.scaler_key().unwrap_or(model.key()),
                    format!(
                        "scaler expects {} features but the feature list names {}",
                        scaler.n_features(),
                        feature_order.len()
                    ),
                ));
            }
        }

        Ok(Self {
            model,
            scaler,
            feature_order,
        })
    }

    pub fn is_passthrough(&self) -> bool {
        self.scaler.is_none()
    }

    pub fn feature_order(&self) -> &FeatureOrder {
        &self.feature_order
    }

    /// Checks the request's columns against the persisted training order, then
    /// scales. The output always has the input's length.
    pub fn transform(&self, vector: &FeatureVector) -> Result<Vec<f64>, ServiceError> {
        let expected = self.feature_order.names();
        let in_order = expected.len() == vector.names.len()
            && expected.iter().zip(&vector.names).all(|(a, b)| a.as_str() == *b);
        if !in_order {
            return Err(ServiceError::FeatureOrderMismatch {
                model: self.model.key().to_string(),
                expected: expected.to_vec(),
                actual: vector.names.iter().map(|n| n.to_string()).collect(),
            });
        }

        match &self.scaler {
            None => Ok(vector.values.clone()),
            Some(scaler) => scaler
                .transform(&vector.values)
                .map_err(|e| ServiceError::Inference(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{artifact::LoadedArtifact, contract};

    fn artifact(key: &'static str, payload: Artifact) -> (&'static str, Arc<LoadedArtifact>) {
        (
            key,
            Arc::new(LoadedArtifact {
                key,
                generation: 1,
                size_bytes: 0,
                payload,
            }),
        )
    }

    fn order(names: &[&str]) -> Artifact {
        Artifact::FeatureList(Arc::new(FeatureOrder(
            names.iter().map(|n| n.to_string()).collect(),
        )))
    }

    fn svm_generation(names: &[&str], with_scaler: bool) -> Generation {
        let mut artifacts = BTreeMap::new();
        let (k, v) = artifact("svm_features", order(names));
        artifacts.insert(k, v);
        if with_scaler {
            let (k, v) = artifact(
                "svm_scaler",
                Artifact::Scaler(Arc::new(Scaler::Standard {
                    mean: vec![5.0, 0.5, 0.5, 0.5],
                    scale: vec![2.0, 0.5, 0.5, 0.5],
                })),
            );
            artifacts.insert(k, v);
        }
        Generation::new(1, artifacts)
    }

    const SVM_ORDER: [&str; 4] = [
        "sensitivity_level",
        "has_fragrance",
        "has_alcohol",
        "is_hypoallergenic",
    ];

    fn svm_vector() -> FeatureVector {
        contract::ALLERGEN
            .to_vector(&serde_json::json!({
                "sensitivity_level": 9, "has_fragrance": 1,
                "has_alcohol": 0, "is_hypoallergenic": 1
            }))
            .unwrap()
    }

    #[test]
    fn scales_in_training_order() {
        let pre = Preprocessor::for_model(&svm_generation(&SVM_ORDER, true), ModelKind::Svm).unwrap();
        assert_eq!(
            pre.transform(&svm_vector()).unwrap(),
            vec![2.0, 1.0, -1.0, 1.0]
        );
    }

    #[test]
    fn reordered_training_columns_are_refused() {
        let swapped = [SVM_ORDER[1], SVM_ORDER[0], SVM_ORDER[2], SVM_ORDER[3]];
        let pre = Preprocessor::for_model(&svm_generation(&swapped, true), ModelKind::Svm).unwrap();
        assert!(matches!(
            pre.transform(&svm_vector()),
            Err(ServiceError::FeatureOrderMismatch { .. })
        ));
    }

    #[test]
    fn missing_scaler_is_unavailable() {
        let err = Preprocessor::for_model(&svm_generation(&SVM_ORDER, false), ModelKind::Svm)
            .unwrap_err();
        match err {
            ServiceError::ModelUnavailable(keys) => assert_eq!(keys, vec!["svm_scaler"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn tree_path_passes_through() {
        let names = contract::SUITABILITY.field_names();
        let mut artifacts = BTreeMap::new();
        let (k, v) = artifact("decision_tree_features", order(&names));
        artifacts.insert(k, v);
        let generation = Generation::new(1, artifacts);

        let pre = Preprocessor::for_model(&generation, ModelKind::DecisionTree).unwrap();
        assert!(pre.is_passthrough());

        let vector = FeatureVector {
            names,
            values: vec![30.0, 3.0, 5.0, 5.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        };
        assert_eq!(pre.transform(&vector).unwrap(), vector.values);
    }
}
