//! Numeric trigger conditions.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Comparison applied between an event's numeric result and a trigger value.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    #[default]
    Eq,
    Lt,
    Gt,
    Neq,
}

impl Operator {
    /// Parses an operator, falling back to [`Operator::Eq`] for anything unknown.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|raw| Self::parse_lenient(&raw)).unwrap_or_default())
    }
}

/// Evaluates `value <operator> target`.
///
/// Never panics: if either operand is NaN the comparison is a non-match for
/// every operator, `Neq` included.
pub fn compare(value: f64, operator: Operator, target: f64) -> bool {
    if value.is_nan() || target.is_nan() {
        return false;
    }
    match operator {
        Operator::Eq => value == target,
        Operator::Lt => value < target,
        Operator::Gt => value > target,
        Operator::Neq => value != target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn numeric_pairs_compare_correctly() {
        let pairs = [(1.0, 1.0), (1.0, 2.0), (2.0, 1.0), (-3.5, 0.0), (20.0, 20.0)];
        for (value, target) in pairs {
            assert_eq!(compare(value, Operator::Eq, target), value == target);
            assert_eq!(compare(value, Operator::Lt, target), value < target);
            assert_eq!(compare(value, Operator::Gt, target), value > target);
            assert_eq!(compare(value, Operator::Neq, target), value != target);
        }
    }

    #[test]
    fn nan_operands_never_match() {
        for operator in Operator::iter() {
            assert!(!compare(f64::NAN, operator, 1.0), "{operator} matched NaN value");
            assert!(!compare(1.0, operator, f64::NAN), "{operator} matched NaN target");
            assert!(!compare(f64::NAN, operator, f64::NAN));
        }
    }

    #[test]
    fn unknown_operator_falls_back_to_eq() {
        assert_eq!(Operator::parse_lenient("gte"), Operator::Eq);
        assert_eq!(Operator::parse_lenient(" gt "), Operator::Gt);
        let parsed: Operator = serde_json::from_str("\"between\"").unwrap();
        assert_eq!(parsed, Operator::Eq);
        let parsed: Operator = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Operator::Eq);
    }
}
