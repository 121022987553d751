//! Field Values
//!
//! Raw attribute values as they arrive in listing data, and the rule that
//! decides whether one can take part in a comparison.

use serde::{Deserialize, Serialize};

use super::Attribute;

/// Marker the listing source uses for "not specified".
pub const NOT_SPECIFIED: &str = "Nav norādīts";

// == Field Value ==
/// A numeric-or-missing listing field. Listings carry numbers, numeric
/// strings, sentinel strings and nulls in the same position, so the raw
/// shape is kept and interpreted per comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn not_specified() -> Self {
        FieldValue::Text(NOT_SPECIFIED.to_string())
    }

    /// Parses the value as a number without any attribute rules applied.
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() || text == NOT_SPECIFIED {
                    return None;
                }
                text.parse::<f64>().ok()?
            }
            FieldValue::Null | FieldValue::Bool(_) => return None,
        };
        number.is_finite().then_some(number)
    }

    /// Returns the value as a number if it is valid for comparing
    /// `attribute`: present, not empty, not the sentinel, numeric, finite,
    /// and non-zero unless the attribute is the model year.
    pub fn comparable_number(&self, attribute: Attribute) -> Option<f64> {
        let number = self.as_number()?;
        if number == 0.0 && !attribute.accepts_zero() {
            return None;
        }
        Some(number)
    }
}

impl From<&serde_json::Value> for FieldValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(FieldValue::Null, FieldValue::Number),
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            // Arrays and objects have no numeric reading.
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => FieldValue::Null,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_and_numeric_strings() {
        assert_eq!(FieldValue::from(15000.0).comparable_number(Attribute::Price), Some(15000.0));
        assert_eq!(FieldValue::from(" 1.9 ").comparable_number(Attribute::EngineVolume), Some(1.9));
        assert_eq!(FieldValue::from("2018").comparable_number(Attribute::Year), Some(2018.0));
    }

    #[test]
    fn test_missing_and_sentinel_values() {
        for value in [
            FieldValue::Null,
            FieldValue::from(""),
            FieldValue::from("   "),
            FieldValue::not_specified(),
            FieldValue::from("abc"),
            FieldValue::Bool(true),
        ] {
            for attribute in Attribute::ALL {
                assert_eq!(value.comparable_number(attribute), None, "{value:?} / {attribute:?}");
            }
        }
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for value in [
            FieldValue::Number(f64::INFINITY),
            FieldValue::Number(f64::NAN),
            FieldValue::from("inf"),
            FieldValue::from("NaN"),
        ] {
            assert_eq!(value.comparable_number(Attribute::Year), None);
        }
    }

    #[test]
    fn test_zero_only_valid_for_year() {
        let zero = FieldValue::from(0i64);
        assert_eq!(zero.comparable_number(Attribute::Year), Some(0.0));
        assert_eq!(zero.comparable_number(Attribute::Price), None);
        assert_eq!(zero.comparable_number(Attribute::Mileage), None);
        assert_eq!(zero.comparable_number(Attribute::EngineVolume), None);
        assert_eq!(FieldValue::from("0").comparable_number(Attribute::Price), None);
    }

    #[test]
    fn test_untagged_deserialize() {
        let values: Vec<FieldValue> =
            serde_json::from_value(json!([null, 12, "Nav norādīts", false])).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Null,
                FieldValue::Number(12.0),
                FieldValue::not_specified(),
                FieldValue::Bool(false),
            ]
        );
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(FieldValue::from(&json!(3)), FieldValue::Number(3.0));
        assert_eq!(FieldValue::from(&json!([1])), FieldValue::Null);
        assert_eq!(FieldValue::from(&json!({"a": 1})), FieldValue::Null);
    }
}
