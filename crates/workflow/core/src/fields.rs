//! Loosely typed persisted fields.
//!
//! Rule definitions are written by edit forms, so numeric fields may arrive as
//! JSON numbers or as the raw text of an input box, and unset text fields may
//! arrive as empty strings. The helpers here normalize both on the way in.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A numeric field as it was entered.
///
/// Text that parses as a number is normalized to [`NumberInput::Number`] on
/// deserialization; anything else is kept verbatim so it survives a save.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    /// Numeric view of the field. Non-numeric text yields NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        }
    }

    /// The value when it is a finite number.
    pub fn finite(&self) -> Option<f64> {
        Some(self.as_f64()).filter(|n| n.is_finite())
    }

    fn parse(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(text.to_owned()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl From<f64> for NumberInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumberInput {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for NumberInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl Serialize for NumberInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for NumberInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NumberInputVisitor;

        impl Visitor<'_> for NumberInputVisitor {
            type Value = NumberInput;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or numeric text")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(NumberInput::Number(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(NumberInput::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(NumberInput::Number(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(NumberInput::parse(v))
            }
        }

        deserializer.deserialize_any(NumberInputVisitor)
    }
}

/// Deserializes an optional number, treating blank text as absent.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<NumberInput>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberInput>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_blank()))
}

/// Deserializes an optional string, treating blank text as absent.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "optional_number")]
        value: Option<NumberInput>,
        #[serde(default, deserialize_with = "optional_text")]
        path: Option<String>,
    }

    #[test]
    fn numeric_text_is_normalized() {
        let row: Row = serde_json::from_str(r#"{"value": " 12 "}"#).unwrap();
        assert_eq!(row.value, Some(NumberInput::Number(12.0)));
    }

    #[test]
    fn blank_fields_are_absent() {
        let row: Row = serde_json::from_str(r#"{"value": "", "path": "  "}"#).unwrap();
        assert_eq!(row.value, None);
        assert_eq!(row.path, None);

        let row: Row = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(row.value, None);
    }

    #[test]
    fn non_numeric_text_is_kept_but_reads_as_nan() {
        let row: Row = serde_json::from_str(r#"{"value": "ten"}"#).unwrap();
        let value = row.value.unwrap();
        assert_eq!(value, NumberInput::Text("ten".into()));
        assert!(value.as_f64().is_nan());
        assert_eq!(value.finite(), None);
    }
}
