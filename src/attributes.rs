//! Attribute schema types and schema-driven value coercion.
//!
//! Tenants and users carry custom attributes whose schema lives in the
//! identity service. Browsers submit every form field as text, so values
//! are normalized against the declared types before they are forwarded.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Declared type of a custom attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttributeType {
    String,
    Number,
    Bool,
    Date,
    /// A type this gateway has no rule for; passed through untouched.
    Other(String),
}

impl AttributeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for AttributeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "bool" => Self::Bool,
            "date" => Self::Date,
            _ => Self::Other(value),
        }
    }
}

impl From<AttributeType> for String {
    fn from(value: AttributeType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema entry for one custom attribute, as served by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub display_name: String,
    pub attribute_type: AttributeType,
}

impl AttributeDefinition {
    pub fn new(
        attribute_name: impl Into<String>,
        display_name: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        Self {
            attribute_name: attribute_name.into(),
            display_name: display_name.into(),
            attribute_type,
        }
    }
}

/// A loosely-typed attribute value as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl AttributeValue {
    pub fn integer(value: i64) -> Self {
        Self::Number(value.into())
    }

    /// JavaScript-style truthiness, which decides whether a value is coerced at all.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
            Self::String(s) => !s.is_empty(),
        }
    }
}

impl From<AttributeValue> for serde_json::Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Bool(b) => serde_json::Value::Bool(b),
            AttributeValue::Number(n) => serde_json::Value::Number(n),
            AttributeValue::String(s) => serde_json::Value::String(s),
        }
    }
}

/// Attribute name to value.
pub type AttributeValueMap = BTreeMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("attribute `{name}` is declared as a number but got {got}")]
    NotANumber { name: String, got: String },
}

/// Normalize `values` against `definitions`.
///
/// Every truthy value whose definition declares `number` is replaced by its
/// base-10 integer. Attributes without a definition, falsy values, and values
/// of any other declared type are returned unchanged. Decimal input, as text
/// or as a number, truncates toward zero. Text that does not parse as a finite
/// number is rejected rather than forwarded.
pub fn coerce(
    mut values: AttributeValueMap,
    definitions: &[AttributeDefinition],
) -> Result<AttributeValueMap, CoercionError> {
    for definition in definitions {
        let Some(value) = values.get_mut(&definition.attribute_name) else {
            continue;
        };
        if !value.is_truthy() {
            continue;
        }

        match definition.attribute_type {
            AttributeType::Number => {
                *value = coerce_integer(&definition.attribute_name, value)?;
            }
            AttributeType::String
            | AttributeType::Bool
            | AttributeType::Date
            | AttributeType::Other(_) => {}
        }
    }

    Ok(values)
}

fn coerce_integer(name: &str, value: &AttributeValue) -> Result<AttributeValue, CoercionError> {
    let not_a_number = || CoercionError::NotANumber {
        name: name.to_string(),
        got: serde_json::to_string(value).unwrap_or_default(),
    };

    match value {
        AttributeValue::Number(n) => {
            if n.is_i64() || n.is_u64() {
                return Ok(value.clone());
            }
            n.as_f64().and_then(truncate).ok_or_else(not_a_number)
        }
        AttributeValue::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(AttributeValue::integer(i));
            }
            s.parse::<f64>()
                .ok()
                .and_then(truncate)
                .ok_or_else(not_a_number)
        }
        AttributeValue::Bool(_) | AttributeValue::Null => Err(not_a_number()),
    }
}

/// Fractions truncate toward zero; non-finite or out-of-range values have no integer.
fn truncate(f: f64) -> Option<AttributeValue> {
    (f.is_finite() && f.abs() < i64::MAX as f64).then(|| AttributeValue::integer(f.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<AttributeDefinition> {
        vec![
            AttributeDefinition::new("age", "Age", AttributeType::Number),
            AttributeDefinition::new("nickname", "Nickname", AttributeType::String),
            AttributeDefinition::new("joined", "Joined", AttributeType::Date),
        ]
    }

    fn values(pairs: &[(&str, AttributeValue)]) -> AttributeValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_numeric_text_becomes_integer() {
        let input = values(&[("age", AttributeValue::String("30".into()))]);
        let out = coerce(input, &schema()).unwrap();
        assert_eq!(out["age"], AttributeValue::integer(30));
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let input = values(&[
            ("age", AttributeValue::String(" 42 ".into())),
            ("nickname", AttributeValue::String("007".into())),
        ]);
        let once = coerce(input, &schema()).unwrap();
        let twice = coerce(once.clone(), &schema()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice["age"], AttributeValue::integer(42));
    }

    #[test]
    fn test_non_numeric_types_are_never_mutated() {
        let input = values(&[
            ("nickname", AttributeValue::String("12".into())),
            ("joined", AttributeValue::String("2024-01-01".into())),
        ]);
        let out = coerce(input.clone(), &schema()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_undeclared_attributes_pass_through() {
        let input = values(&[("shoe_size", AttributeValue::String("abc".into()))]);
        let out = coerce(input.clone(), &schema()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_falsy_values_are_left_alone() {
        let input = values(&[("age", AttributeValue::String(String::new()))]);
        let out = coerce(input.clone(), &schema()).unwrap();
        assert_eq!(out, input);

        let input = values(&[("age", AttributeValue::Null)]);
        assert_eq!(coerce(input.clone(), &schema()).unwrap(), input);
    }

    #[test]
    fn test_fractions_truncate_as_number_or_text() {
        let as_number = values(&[(
            "age",
            AttributeValue::Number(serde_json::Number::from_f64(30.9).unwrap()),
        )]);
        let as_text = values(&[("age", AttributeValue::String("30.9".into()))]);
        let negative = values(&[("age", AttributeValue::String(" -2.7 ".into()))]);

        assert_eq!(coerce(as_number, &schema()).unwrap()["age"], AttributeValue::integer(30));
        assert_eq!(coerce(as_text, &schema()).unwrap()["age"], AttributeValue::integer(30));
        assert_eq!(coerce(negative, &schema()).unwrap()["age"], AttributeValue::integer(-2));
    }

    #[test]
    fn test_non_finite_text_is_rejected() {
        for text in ["NaN", "inf", "1e400"] {
            let input = values(&[("age", AttributeValue::String(text.into()))]);
            assert!(coerce(input, &schema()).is_err(), "{} should be rejected", text);
        }
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        let input = values(&[("age", AttributeValue::String("thirty".into()))]);
        let err = coerce(input, &schema()).unwrap_err();
        assert_eq!(
            err,
            CoercionError::NotANumber {
                name: "age".into(),
                got: "\"thirty\"".into()
            }
        );
    }

    #[test]
    fn test_true_is_not_a_number() {
        let input = values(&[("age", AttributeValue::Bool(true))]);
        assert!(coerce(input, &schema()).is_err());
    }

    #[test]
    fn test_fraction_truncates() {
        let input: AttributeValueMap = serde_json::from_str(r#"{"age": 30.9}"#).unwrap();
        let out = coerce(input, &schema()).unwrap();
        assert_eq!(out["age"], AttributeValue::integer(30));
    }

    #[test]
    fn test_attribute_value_deserializes_untagged() {
        let map: AttributeValueMap =
            serde_json::from_str(r#"{"a": null, "b": true, "c": 1, "d": "x"}"#).unwrap();
        assert_eq!(map["a"], AttributeValue::Null);
        assert_eq!(map["b"], AttributeValue::Bool(true));
        assert_eq!(map["c"], AttributeValue::integer(1));
        assert_eq!(map["d"], AttributeValue::String("x".into()));
    }

    #[test]
    fn test_attribute_type_round_trips_unknown_names() {
        let def: AttributeDefinition = serde_json::from_str(
            r#"{"attribute_name":"tier","display_name":"Tier","attribute_type":"enum"}"#,
        )
        .unwrap();
        assert_eq!(def.attribute_type, AttributeType::Other("enum".into()));
        assert_eq!(
            serde_json::to_value(&def).unwrap()["attribute_type"],
            "enum"
        );
    }
}
