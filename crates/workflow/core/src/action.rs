//! Effects performed when a group fires.
//!
//! Every field of every variant is optional: an action saved before the user
//! finished filling it in is valid data and simply does nothing when run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::RollRequestError;
use crate::fields::{NumberInput, optional_number, optional_text};

/// Default playback volume when a sound action leaves it unset.
pub const DEFAULT_SOUND_VOLUME: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    Macro {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        macro_uuid: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    PlaySound {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        sound_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_number")]
        sound_volume: Option<NumberInput>,
    },

    #[serde(rename_all = "camelCase")]
    ApplyCondition {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        condition_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    RemoveCondition {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        condition_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    ToggleCondition {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        condition_id: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    RollTable {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        table_uuid: Option<String>,
    },

    DistributeAward,

    #[serde(rename_all = "camelCase")]
    RequestRoll {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        roll_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_number")]
        roll_dc: Option<NumberInput>,
    },

    #[serde(rename_all = "camelCase")]
    ActorUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        update_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        update_value: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    TokenUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        update_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_text")]
        update_value: Option<String>,
    },
}

/// Tag of an [`Action`], used for logging and form rows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ActionKind {
    Macro,
    PlaySound,
    ApplyCondition,
    RemoveCondition,
    ToggleCondition,
    RollTable,
    DistributeAward,
    RequestRoll,
    ActorUpdate,
    TokenUpdate,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Macro { .. } => ActionKind::Macro,
            Self::PlaySound { .. } => ActionKind::PlaySound,
            Self::ApplyCondition { .. } => ActionKind::ApplyCondition,
            Self::RemoveCondition { .. } => ActionKind::RemoveCondition,
            Self::ToggleCondition { .. } => ActionKind::ToggleCondition,
            Self::RollTable { .. } => ActionKind::RollTable,
            Self::DistributeAward => ActionKind::DistributeAward,
            Self::RequestRoll { .. } => ActionKind::RequestRoll,
            Self::ActorUpdate { .. } => ActionKind::ActorUpdate,
            Self::TokenUpdate { .. } => ActionKind::TokenUpdate,
        }
    }

    pub fn run_macro(uuid: impl Into<String>) -> Self {
        Self::Macro {
            macro_uuid: Some(uuid.into()),
        }
    }

    pub fn apply_condition(condition: impl Into<String>) -> Self {
        Self::ApplyCondition {
            condition_id: Some(condition.into()),
        }
    }

    pub fn actor_update(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ActorUpdate {
            update_path: Some(path.into()),
            update_value: Some(value.into()),
        }
    }
}

/// Kind of roll an actor can be asked to make.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RollCategory {
    Save,
    Check,
    Skill,
}

/// Parsed `category:key` roll request with an optional difficulty class.
#[derive(Debug, Clone, PartialEq)]
pub struct RollRequest {
    pub category: RollCategory,
    /// Ability or skill abbreviation, e.g. `dex` or `prc`.
    pub key: String,
    pub dc: Option<f64>,
}

impl RollRequest {
    /// Parses a persisted roll type, keeping the DC only when it is finite.
    pub fn parse(roll_type: &str, dc: Option<&NumberInput>) -> Result<Self, RollRequestError> {
        let mut request: Self = roll_type.parse()?;
        request.dc = dc.and_then(NumberInput::finite);
        Ok(request)
    }
}

impl FromStr for RollRequest {
    type Err = RollRequestError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (category, key) = raw
            .split_once(':')
            .ok_or_else(|| RollRequestError::MissingSeparator(raw.to_owned()))?;
        let category = category
            .trim()
            .parse()
            .map_err(|_| RollRequestError::UnknownCategory(category.to_owned()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(RollRequestError::EmptyKey(raw.to_owned()));
        }
        Ok(Self {
            category,
            key: key.to_owned(),
            dc: None,
        })
    }
}

/// Value written by an actor or token update action.
///
/// Form inputs are text; `true`/`false` and anything numeric are coerced so
/// the host receives the field's natural type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpdateValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl UpdateValue {
    pub fn coerce(raw: &str) -> Self {
        match raw.trim() {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            trimmed => match trimmed.parse::<f64>() {
                Ok(n) if n.is_finite() => Self::Number(n),
                _ => Self::Text(raw.to_owned()),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(text) => serde_json::Value::String(text.clone()),
        }
    }
}

impl fmt::Display for UpdateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_are_tagged_by_type() {
        let action: Action =
            serde_json::from_str(r#"{"type": "playSound", "soundPath": "sfx/crit.ogg", "soundVolume": "0.5"}"#)
                .unwrap();
        assert_eq!(
            action,
            Action::PlaySound {
                sound_path: Some("sfx/crit.ogg".into()),
                sound_volume: Some(NumberInput::Number(0.5)),
            }
        );
        assert_eq!(action.kind(), ActionKind::PlaySound);

        let award: Action = serde_json::from_str(r#"{"type": "distributeAward"}"#).unwrap();
        assert_eq!(award, Action::DistributeAward);
    }

    #[test]
    fn blank_fields_read_as_unset() {
        let action: Action = serde_json::from_str(r#"{"type": "macro", "macroUuid": ""}"#).unwrap();
        assert_eq!(action, Action::Macro { macro_uuid: None });
    }

    #[test]
    fn roll_request_parses_category_and_key() {
        let request = RollRequest::parse("save:dex", Some(&NumberInput::Number(15.0))).unwrap();
        assert_eq!(request.category, RollCategory::Save);
        assert_eq!(request.key, "dex");
        assert_eq!(request.dc, Some(15.0));

        let request = RollRequest::parse("skill:prc", Some(&NumberInput::Text("hard".into()))).unwrap();
        assert_eq!(request.category, RollCategory::Skill);
        assert_eq!(request.dc, None);
    }

    #[test]
    fn malformed_roll_requests_are_rejected() {
        assert_eq!(
            "dex".parse::<RollRequest>(),
            Err(RollRequestError::MissingSeparator("dex".into()))
        );
        assert_eq!(
            "attack:str".parse::<RollRequest>(),
            Err(RollRequestError::UnknownCategory("attack".into()))
        );
        assert_eq!(
            "check:".parse::<RollRequest>(),
            Err(RollRequestError::EmptyKey("check:".into()))
        );
    }

    #[test]
    fn update_values_are_coerced() {
        assert_eq!(UpdateValue::coerce("true"), UpdateValue::Bool(true));
        assert_eq!(UpdateValue::coerce(" 12.5"), UpdateValue::Number(12.5));
        assert_eq!(UpdateValue::coerce("prone"), UpdateValue::Text("prone".into()));
        assert_eq!(UpdateValue::coerce("3").to_json(), serde_json::json!(3.0));
    }
}
