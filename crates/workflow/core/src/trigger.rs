//! A single condition under which a group fires.

use serde::{Deserialize, Serialize};

use crate::compare::{Operator, compare};
use crate::event::EventKey;
use crate::fields::{NumberInput, optional_number};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub event: EventKey,

    #[serde(default)]
    pub operator: Operator,

    /// Threshold for the event's numeric result. Absent means the event alone
    /// satisfies the trigger.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_number"
    )]
    pub value: Option<NumberInput>,
}

impl Trigger {
    /// Trigger matching every occurrence of `event`.
    pub fn on(event: EventKey) -> Self {
        Self {
            event,
            operator: Operator::Eq,
            value: None,
        }
    }

    /// Adds a numeric condition on the event's result.
    pub fn when(mut self, operator: Operator, value: impl Into<NumberInput>) -> Self {
        self.operator = operator;
        self.value = Some(value.into());
        self
    }

    /// Returns true if `event` (with its numeric result, if any) satisfies
    /// this trigger.
    pub fn matches(&self, event: EventKey, die_total: Option<f64>) -> bool {
        if self.event != event {
            return false;
        }
        match &self.value {
            None => true,
            Some(target) => compare(
                die_total.unwrap_or(f64::NAN),
                self.operator,
                target.as_f64(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valueless_trigger_matches_on_event_alone() {
        let trigger = Trigger::on(EventKey::RollAttack);
        assert!(trigger.matches(EventKey::RollAttack, None));
        assert!(trigger.matches(EventKey::RollAttack, Some(3.0)));
        assert!(!trigger.matches(EventKey::RollDamage, Some(3.0)));
    }

    #[test]
    fn value_condition_needs_a_numeric_result() {
        let trigger = Trigger::on(EventKey::RollAttack).when(Operator::Eq, 20.0);
        assert!(trigger.matches(EventKey::RollAttack, Some(20.0)));
        assert!(!trigger.matches(EventKey::RollAttack, Some(19.0)));
        assert!(!trigger.matches(EventKey::RollAttack, None));
    }

    #[test]
    fn persisted_form_strings_are_accepted() {
        let trigger: Trigger =
            serde_json::from_str(r#"{"event": "loseHp", "operator": "gt", "value": "10"}"#).unwrap();
        assert_eq!(trigger.event, EventKey::LoseHp);
        assert!(trigger.matches(EventKey::LoseHp, Some(11.0)));
        assert!(!trigger.matches(EventKey::LoseHp, Some(10.0)));

        let trigger: Trigger = serde_json::from_str(r#"{"event": "loseHp", "value": ""}"#).unwrap();
        assert_eq!(trigger.value, None);
        assert_eq!(trigger.operator, Operator::Eq);
    }

    #[test]
    fn non_numeric_value_never_matches() {
        let trigger = Trigger::on(EventKey::RollSkill).when(Operator::Neq, "natural");
        assert!(!trigger.matches(EventKey::RollSkill, Some(4.0)));
    }
}
