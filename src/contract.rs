//! Per-endpoint input contracts.
//!
//! A contract names every field a model consumes, in the exact column order
//! of its training matrix, with the bounds callers must respect. Requests are
//! validated by name and only projected to a positional vector afterwards.

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_json::Value;

use crate::{error::ServiceError, model::ModelKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Whole number within `[min, max]`.
    Integer,
    /// 0/1 indicator; JSON booleans are accepted too.
    Flag,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub min: i64,
    pub max: i64,
    pub required: bool,
    pub default: Option<i64>,
}

impl FieldSpec {
    const fn integer(name: &'static str, min: i64, max: i64) -> Self {
        Self {
            name,
            ty: FieldType::Integer,
            min,
            max,
            required: true,
            default: None,
        }
    }

    const fn age() -> Self {
        Self::integer("age", 18, 100)
    }

    const fn scale(name: &'static str) -> Self {
        Self::integer(name, 1, 10)
    }

    const fn flag(name: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Flag,
            min: 0,
            max: 1,
            required: true,
            default: None,
        }
    }

    const fn or_default(self, default: i64) -> Self {
        Self {
            required: false,
            default: Some(default),
            ..self
        }
    }

    fn read(&self, raw: &serde_json::Map<String, Value>) -> Result<i64, ServiceError> {
        let value = match raw.get(self.name) {
            None | Some(Value::Null) => {
                return match (self.required, self.default) {
                    (false, Some(default)) => Ok(default),
                    _ => Err(ServiceError::validation(self.name, "field required")),
                };
            }
            Some(value) => value,
        };

        let parsed = match (value, self.ty) {
            (Value::Bool(flag), FieldType::Flag) => i64::from(*flag),
            (Value::Number(number), _) => match number.as_i64() {
                Some(v) => v,
                None => match number.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
                    _ => return Err(ServiceError::validation(self.name, "must be an integer")),
                },
            },
            (_, FieldType::Flag) => {
                return Err(ServiceError::validation(self.name, "must be 0, 1, true or false"));
            }
            (_, FieldType::Integer) => {
                return Err(ServiceError::validation(self.name, "must be an integer"));
            }
        };

        if parsed < self.min || parsed > self.max {
            return Err(ServiceError::validation(
                self.name,
                format!("must be between {} and {}", self.min, self.max),
            ));
        }
        Ok(parsed)
    }
}

#[derive(Debug)]
pub struct FeatureContract {
    pub model: ModelKind,
    /// Model inputs, in training column order.
    pub fields: &'static [FieldSpec],
    /// Accepted alongside the inputs and bounds-checked, but not fed to the model.
    pub accepted: &'static [FieldSpec],
    /// Echo flags as JSON booleans rather than 0/1.
    pub echo_flags_as_bool: bool,
}

pub static HYDRATION: FeatureContract = FeatureContract {
    model: ModelKind::LinearRegression,
    fields: &[
        FieldSpec::age(),
        FieldSpec::scale("oil_production"),
        FieldSpec::scale("sensitivity_level"),
        FieldSpec::scale("pore_size"),
    ],
    accepted: &[
        FieldSpec::scale("hydration_level").or_default(5),
        FieldSpec::scale("wrinkle_score").or_default(5),
    ],
    echo_flags_as_bool: false,
};

pub static SKIN_TYPE: FeatureContract = FeatureContract {
    model: ModelKind::NaiveBayes,
    fields: &[
        FieldSpec::age(),
        FieldSpec::scale("oil_production"),
        FieldSpec::scale("hydration_level").or_default(5),
        FieldSpec::scale("sensitivity_level"),
        FieldSpec::scale("pore_size"),
    ],
    accepted: &[FieldSpec::scale("wrinkle_score").or_default(5)],
    echo_flags_as_bool: false,
};

pub static RECOMMENDATION: FeatureContract = FeatureContract {
    model: ModelKind::Knn,
    fields: &[
        FieldSpec::age(),
        FieldSpec::scale("oil_production"),
        FieldSpec::scale("hydration_level").or_default(5),
        FieldSpec::scale("sensitivity_level"),
        FieldSpec::scale("pore_size"),
        FieldSpec::scale("wrinkle_score").or_default(5),
    ],
    accepted: &[],
    echo_flags_as_bool: false,
};

pub static ALLERGEN: FeatureContract = FeatureContract {
    model: ModelKind::Svm,
    fields: &[
        FieldSpec::scale("sensitivity_level"),
        FieldSpec::flag("has_fragrance"),
        FieldSpec::flag("has_alcohol"),
        FieldSpec::flag("is_hypoallergenic"),
    ],
    accepted: &[],
    echo_flags_as_bool: true,
};

pub static SUITABILITY: FeatureContract = FeatureContract {
    model: ModelKind::DecisionTree,
    fields: &[
        FieldSpec::age(),
        FieldSpec::scale("sensitivity_level"),
        FieldSpec::scale("oil_production"),
        FieldSpec::scale("hydration_level"),
        FieldSpec::flag("suitable_for_oily"),
        FieldSpec::flag("suitable_for_dry"),
        FieldSpec::flag("suitable_for_sensitive"),
        FieldSpec::flag("has_fragrance"),
        FieldSpec::flag("has_alcohol"),
    ],
    accepted: &[],
    echo_flags_as_bool: false,
};

pub static SATISFACTION: FeatureContract = FeatureContract {
    model: ModelKind::Ann,
    fields: &[
        FieldSpec::age(),
        FieldSpec::scale("oil_production"),
        FieldSpec::scale("hydration_level"),
        FieldSpec::scale("sensitivity_level"),
        FieldSpec::scale("pore_size"),
        FieldSpec::scale("wrinkle_score"),
        FieldSpec::flag("suitable_for_oily"),
        FieldSpec::flag("suitable_for_dry"),
        FieldSpec::flag("suitable_for_sensitive"),
        FieldSpec::flag("has_fragrance"),
        FieldSpec::flag("has_alcohol"),
        FieldSpec::flag("is_hypoallergenic"),
    ],
    accepted: &[],
    echo_flags_as_bool: false,
};

pub fn for_model(model: ModelKind) -> &'static FeatureContract {
    match model {
        ModelKind::LinearRegression => &HYDRATION,
        ModelKind::NaiveBayes => &SKIN_TYPE,
        ModelKind::Knn => &RECOMMENDATION,
        ModelKind::Svm => &ALLERGEN,
        ModelKind::DecisionTree => &SUITABILITY,
        ModelKind::Ann => &SATISFACTION,
    }
}

impl FeatureContract {
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Checks every field against its bounds. Optional fields fall back to
    /// their default; required fields never do, and nothing is clamped.
    pub fn validate(&'static self, raw: &Value) -> Result<ValidatedInput, ServiceError> {
        let Value::Object(map) = raw else {
            return Err(ServiceError::validation("body", "must be a JSON object"));
        };

        let values = self
            .fields
            .iter()
            .map(|field| field.read(map))
            .collect::<Result<Vec<_>, _>>()?;
        for field in self.accepted {
            field.read(map)?;
        }

        Ok(ValidatedInput {
            contract: self,
            values,
        })
    }

    pub fn to_vector(&'static self, raw: &Value) -> Result<FeatureVector, ServiceError> {
        Ok(self.validate(raw)?.to_vector())
    }
}

/// A request that passed its contract. Values align with `contract.fields`.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    contract: &'static FeatureContract,
    values: Vec<i64>,
}

impl ValidatedInput {
    pub fn contract(&self) -> &'static FeatureContract {
        self.contract
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.contract
            .fields
            .iter()
            .position(|f| f.name == name)
            .map(|idx| self.values[idx])
    }

    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector {
            names: self.contract.field_names(),
            values: self.values.iter().map(|&v| v as f64).collect(),
        }
    }
}

/// Echoes the validated fields in contract order. Flags render as booleans
/// only where the contract asks for it.
impl Serialize for ValidatedInput {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.contract.fields.iter().zip(&self.values) {
            match field.ty {
                FieldType::Integer => map.serialize_entry(field.name, value)?,
                FieldType::Flag if self.contract.echo_flags_as_bool => {
                    map.serialize_entry(field.name, &(*value != 0))?
                }
                FieldType::Flag => map.serialize_entry(field.name, value)?,
            }
        }
        map.end()
    }
}

/// Positional model input that still remembers which name sits where.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub names: Vec<&'static str>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field_of(err: ServiceError) -> String {
        match err {
            ServiceError::FeatureValidation { field, .. } => field,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn projects_in_contract_order() {
        let body = json!({"pore_size": 5, "sensitivity_level": 3, "oil_production": 8, "age": 30});
        let vector = HYDRATION.to_vector(&body).unwrap();
        assert_eq!(
            vector.names,
            vec!["age", "oil_production", "sensitivity_level", "pore_size"]
        );
        assert_eq!(vector.values, vec![30.0, 8.0, 3.0, 5.0]);
    }

    #[test]
    fn missing_required_field_is_named() {
        let body = json!({"age": 30, "oil_production": 8, "pore_size": 5});
        let err = HYDRATION.validate(&body).unwrap_err();
        assert_eq!(field_of(err), "sensitivity_level");
    }

    #[test]
    fn out_of_range_is_rejected_not_clamped() {
        let body = json!({"age": 17, "oil_production": 8, "sensitivity_level": 3, "pore_size": 5});
        let err = HYDRATION.validate(&body).unwrap_err();
        assert!(err.to_string().contains("between 18 and 100"));
        assert_eq!(field_of(err), "age");
    }

    #[test]
    fn optional_fields_default() {
        let body = json!({"age": 40, "oil_production": 2, "sensitivity_level": 9, "pore_size": 4});
        let input = RECOMMENDATION.validate(&body).unwrap();
        assert_eq!(input.get("hydration_level"), Some(5));
        assert_eq!(input.get("wrinkle_score"), Some(5));
    }

    #[test]
    fn accepted_extras_are_still_bounded() {
        let body = json!({"age": 30, "oil_production": 8, "sensitivity_level": 3,
                          "pore_size": 5, "wrinkle_score": 11});
        assert_eq!(field_of(HYDRATION.validate(&body).unwrap_err()), "wrinkle_score");
    }

    #[test]
    fn flags_accept_booleans_and_render_as_booleans() {
        let body = json!({"sensitivity_level": 7, "has_fragrance": true,
                          "has_alcohol": 0, "is_hypoallergenic": 1.0});
        let input = ALLERGEN.validate(&body).unwrap();
        assert_eq!(input.to_vector().values, vec![7.0, 1.0, 0.0, 1.0]);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"sensitivity_level": 7, "has_fragrance": true,
                   "has_alcohol": false, "is_hypoallergenic": true})
        );
    }

    #[test]
    fn suitability_echoes_flags_as_integers() {
        let body = json!({"age": 35, "sensitivity_level": 6, "oil_production": 4,
                          "hydration_level": 5, "suitable_for_oily": true,
                          "suitable_for_dry": 0, "suitable_for_sensitive": 1,
                          "has_fragrance": 0, "has_alcohol": 0});
        let echoed = serde_json::to_value(SUITABILITY.validate(&body).unwrap()).unwrap();
        assert_eq!(echoed["suitable_for_oily"], 1);
        assert_eq!(echoed["suitable_for_dry"], 0);
        assert_eq!(echoed["age"], 35);
    }

    #[test]
    fn fractional_and_string_values_are_rejected() {
        let body = json!({"sensitivity_level": 2.5, "has_fragrance": 0,
                          "has_alcohol": 0, "is_hypoallergenic": 0});
        assert_eq!(field_of(ALLERGEN.validate(&body).unwrap_err()), "sensitivity_level");

        let body = json!({"sensitivity_level": 2, "has_fragrance": "yes",
                          "has_alcohol": 0, "is_hypoallergenic": 0});
        assert_eq!(field_of(ALLERGEN.validate(&body).unwrap_err()), "has_fragrance");
    }

    #[test]
    fn body_must_be_object() {
        assert_eq!(field_of(SATISFACTION.validate(&json!([1, 2])).unwrap_err()), "body");
    }

    #[test]
    fn contracts_match_their_models() {
        for model in ModelKind::ALL {
            assert_eq!(for_model(model).model, model);
        }
        assert_eq!(SATISFACTION.fields.len(), 12);
        assert_eq!(SUITABILITY.fields.len(), 9);
    }
}
