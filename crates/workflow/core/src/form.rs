//! Edit-form marshalling.
//!
//! Edit forms submit a flat list of `key -> value` entries. Group-level fields
//! use bare keys (`label`, `visible`, `actorTypes`); trigger and action rows
//! use `section.<row id>.<field>` keys, e.g. `triggers.k3f.operator` or
//! `actions.p0c.macroUuid`. [`flatten`] produces these entries from a group
//! and [`expand`] reassembles them, preserving row order.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::FormError;
use crate::group::TriggerGroup;
use crate::ordered::OrderedMap;

/// One submitted form field.
pub type FormEntry = (String, Value);

const TRIGGERS: &str = "triggers";
const ACTIONS: &str = "actions";

/// Flattens a group into form entries.
pub fn flatten(group: &TriggerGroup) -> Vec<FormEntry> {
    let mut entries = vec![
        ("label".to_owned(), Value::String(group.label.clone())),
        ("visible".to_owned(), Value::Bool(group.visible)),
        (
            "actorTypes".to_owned(),
            group
                .actor_types
                .iter()
                .cloned()
                .map(Value::String)
                .collect(),
        ),
    ];
    for (id, trigger) in group.triggers.iter() {
        push_row(&mut entries, TRIGGERS, id, trigger);
    }
    for (id, action) in group.actions.iter() {
        push_row(&mut entries, ACTIONS, id, action);
    }
    entries
}

fn push_row<T: Serialize>(entries: &mut Vec<FormEntry>, section: &str, id: &str, row: &T) {
    if let Ok(Value::Object(fields)) = serde_json::to_value(row) {
        for (field, value) in fields {
            entries.push((format!("{section}.{id}.{field}"), value));
        }
    }
}

/// Rebuilds a group from submitted form entries.
///
/// Rows are kept in the order their first field appears. A trigger row
/// without an event, or an action row without a type, is an unfinished row
/// and is dropped.
pub fn expand<I>(entries: I) -> Result<TriggerGroup, FormError>
where
    I: IntoIterator<Item = FormEntry>,
{
    let mut group = TriggerGroup::new("");
    let mut triggers: OrderedMap<Map<String, Value>> = OrderedMap::new();
    let mut actions: OrderedMap<Map<String, Value>> = OrderedMap::new();

    for (key, value) in entries {
        let Some((section, rest)) = key.split_once('.') else {
            match key.as_str() {
                "label" => group.label = text(&key, value)?,
                "visible" => group.visible = flag(&key, &value)?,
                "actorTypes" => {
                    group.actor_types = list(&key, value)?.into_iter().collect();
                }
                _ => return Err(FormError::UnknownField(key.clone())),
            }
            continue;
        };

        let rows = match section {
            TRIGGERS => &mut triggers,
            ACTIONS => &mut actions,
            _ => return Err(FormError::UnknownField(key.clone())),
        };
        let (id, field) = match rest.split_once('.') {
            Some((id, field)) if !id.is_empty() && !field.is_empty() => (id, field),
            _ => return Err(FormError::UnknownField(key.clone())),
        };
        match rows.get_mut(id) {
            Some(row) => {
                row.insert(field.to_owned(), value);
            }
            None => {
                let mut row = Map::new();
                row.insert(field.to_owned(), value);
                rows.insert(id, row);
            }
        }
    }

    for (id, trigger) in decode_rows(triggers, "trigger", "event")? {
        group.triggers.insert(id, trigger);
    }
    for (id, action) in decode_rows(actions, "action", "type")? {
        group.actions.insert(id, action);
    }
    Ok(group)
}

fn decode_rows<T: DeserializeOwned>(
    rows: OrderedMap<Map<String, Value>>,
    section: &'static str,
    required: &str,
) -> Result<Vec<(String, T)>, FormError> {
    rows.into_iter()
        .filter(|(_, row)| !is_blank(row.get(required)))
        .map(|(id, row)| match serde_json::from_value(Value::Object(row)) {
            Ok(decoded) => Ok((id, decoded)),
            Err(err) => Err(FormError::InvalidRow {
                section,
                id,
                message: err.to_string(),
            }),
        })
        .collect()
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

fn text(key: &str, value: Value) -> Result<String, FormError> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(FormError::InvalidField(key.to_owned())),
    }
}

fn flag(key: &str, value: &Value) -> Result<bool, FormError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::String(text) => match text.trim() {
            "true" | "on" | "1" => Ok(true),
            "false" | "off" | "0" | "" => Ok(false),
            _ => Err(FormError::InvalidField(key.to_owned())),
        },
        _ => Err(FormError::InvalidField(key.to_owned())),
    }
}

/// Accepts a JSON array or comma-separated text.
fn list(key: &str, value: Value) -> Result<Vec<String>, FormError> {
    let items = match value {
        Value::Null => Vec::new(),
        Value::String(text) => text.split(',').map(str::to_owned).collect(),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => Ok(text),
                _ => Err(FormError::InvalidField(key.to_owned())),
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(FormError::InvalidField(key.to_owned())),
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::compare::Operator;
    use crate::event::EventKey;
    use crate::fields::NumberInput;
    use crate::trigger::Trigger;
    use serde_json::json;

    fn entry(key: &str, value: Value) -> FormEntry {
        (key.to_owned(), value)
    }

    #[test]
    fn round_trip_preserves_the_group() {
        let group = TriggerGroup::new("Bloodied")
            .for_actor_types(["character", "npc"])
            .with_trigger("t2", Trigger::on(EventKey::HalfHp))
            .with_trigger("t1", Trigger::on(EventKey::LoseHp).when(Operator::Gt, 10.0))
            .with_action("a9", Action::run_macro("Macro.abc"))
            .with_action(
                "a1",
                Action::PlaySound {
                    sound_path: Some("sounds/drums.ogg".into()),
                    sound_volume: Some(NumberInput::Number(0.4)),
                },
            )
            .with_action("a5", Action::DistributeAward);

        let rebuilt = expand(flatten(&group)).unwrap();
        assert_eq!(rebuilt, group);
        assert_eq!(rebuilt.actions.keys().collect::<Vec<_>>(), vec!["a9", "a1", "a5"]);
    }

    #[test]
    fn raw_form_strings_are_decoded() {
        let group = expand([
            entry("label", json!("Nat 20")),
            entry("visible", json!("on")),
            entry("actorTypes", json!("character, npc")),
            entry("triggers.x.event", json!("rollAttack")),
            entry("triggers.x.operator", json!("eq")),
            entry("triggers.x.value", json!("20")),
            entry("actions.y.type", json!("requestRoll")),
            entry("actions.y.rollType", json!("save:con")),
            entry("actions.y.rollDc", json!("")),
        ])
        .unwrap();

        assert_eq!(group.label, "Nat 20");
        assert!(group.visible);
        assert_eq!(group.actor_types.len(), 2);
        let trigger = group.triggers.get("x").unwrap();
        assert_eq!(trigger.value, Some(NumberInput::Number(20.0)));
        assert_eq!(
            group.actions.get("y"),
            Some(&Action::RequestRoll {
                roll_type: Some("save:con".into()),
                roll_dc: None,
            })
        );
    }

    #[test]
    fn unfinished_rows_are_dropped() {
        let group = expand([
            entry("label", json!("Draft")),
            entry("triggers.x.event", json!("")),
            entry("actions.y.macroUuid", json!("Macro.abc")),
        ])
        .unwrap();
        assert!(group.triggers.is_empty());
        assert!(group.actions.is_empty());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert_eq!(
            expand([entry("colour", json!("red"))]),
            Err(FormError::UnknownField("colour".into()))
        );
        assert_eq!(
            expand([entry("effects.x.type", json!("macro"))]),
            Err(FormError::UnknownField("effects.x.type".into()))
        );
        assert_eq!(
            expand([entry("triggers.x", json!("zeroHp"))]),
            Err(FormError::UnknownField("triggers.x".into()))
        );
    }

    #[test]
    fn invalid_rows_name_the_row() {
        let err = expand([entry("triggers.x.event", json!("rollPerception"))]).unwrap_err();
        assert!(matches!(err, FormError::InvalidRow { section: "trigger", ref id, .. } if id == "x"));
    }
}
