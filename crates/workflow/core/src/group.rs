//! Trigger groups and the collections they are stored in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::FormError;
use crate::event::EventKey;
use crate::ordered::OrderedMap;
use crate::trigger::Trigger;

/// Opaque key of a group within its scope.
pub type GroupId = String;

/// A labelled, toggleable bundle of triggers and the actions they fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerGroup {
    #[serde(default)]
    pub label: String,

    /// Hidden groups are kept but never fire.
    #[serde(default = "visible_by_default")]
    pub visible: bool,

    /// Actor categories the group is limited to. Empty means every actor.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub actor_types: BTreeSet<String>,

    #[serde(default)]
    pub triggers: OrderedMap<Trigger>,

    /// Executed in map order whenever any trigger matches.
    #[serde(default)]
    pub actions: OrderedMap<Action>,
}

fn visible_by_default() -> bool {
    true
}

impl TriggerGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visible: true,
            actor_types: BTreeSet::new(),
            triggers: OrderedMap::new(),
            actions: OrderedMap::new(),
        }
    }

    pub fn with_trigger(mut self, id: impl Into<String>, trigger: Trigger) -> Self {
        self.triggers.insert(id, trigger);
        self
    }

    pub fn with_action(mut self, id: impl Into<String>, action: Action) -> Self {
        self.actions.insert(id, action);
        self
    }

    pub fn for_actor_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actor_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Distinct events referenced by this group's triggers.
    pub fn events(&self) -> BTreeSet<EventKey> {
        self.triggers.values().map(|trigger| trigger.event).collect()
    }

    pub fn references(&self, event: EventKey) -> bool {
        self.triggers.values().any(|trigger| trigger.event == event)
    }

    /// Returns true if the group is not limited to other actor categories.
    pub fn applies_to(&self, actor_type: &str) -> bool {
        self.actor_types.is_empty() || self.actor_types.contains(actor_type)
    }

    /// OR across triggers: any single satisfied trigger fires the group.
    pub fn matches(&self, event: EventKey, die_total: Option<f64>) -> bool {
        self.triggers
            .values()
            .any(|trigger| trigger.matches(event, die_total))
    }
}

/// All groups of one scope (the world, or a single actor), keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerGroups(OrderedMap<TriggerGroup>);

impl TriggerGroups {
    pub const fn new() -> Self {
        Self(OrderedMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TriggerGroup> {
        self.0.get(id)
    }

    pub fn insert(&mut self, id: impl Into<GroupId>, group: TriggerGroup) -> Option<TriggerGroup> {
        self.0.insert(id, group)
    }

    pub fn remove(&mut self, id: &str) -> Option<TriggerGroup> {
        self.0.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TriggerGroup)> {
        self.0.iter()
    }

    /// Groups that are switched on.
    pub fn visible(&self) -> impl Iterator<Item = (&str, &TriggerGroup)> {
        self.0.iter().filter(|(_, group)| group.visible)
    }

    /// Visible groups with at least one trigger on `event`.
    pub fn referencing(&self, event: EventKey) -> impl Iterator<Item = (&str, &TriggerGroup)> {
        self.visible().filter(move |(_, group)| group.references(event))
    }

    /// Every event referenced by a visible group.
    pub fn active_events(&self) -> BTreeSet<EventKey> {
        self.visible().flat_map(|(_, group)| group.events()).collect()
    }

    /// Checks that `label` can be used by group `id` in this scope.
    ///
    /// Labels are compared after trimming; the group's own current label does
    /// not count as a duplicate.
    pub fn validate_label(&self, id: &str, label: &str) -> Result<(), FormError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(FormError::EmptyLabel);
        }
        let taken = self
            .iter()
            .any(|(other_id, other)| other_id != id && other.label.trim() == label);
        if taken {
            return Err(FormError::DuplicateLabel(label.to_owned()));
        }
        Ok(())
    }

    /// Validates every label in the collection.
    pub fn validate(&self) -> Result<(), FormError> {
        self.iter()
            .try_for_each(|(id, group)| self.validate_label(id, &group.label))
    }

    /// Validates `group` against its siblings, then stores it under `id`.
    pub fn upsert(&mut self, id: impl Into<GroupId>, group: TriggerGroup) -> Result<(), FormError> {
        let id = id.into();
        self.validate_label(&id, &group.label)?;
        self.insert(id, group);
        Ok(())
    }
}

impl<K: Into<GroupId>> FromIterator<(K, TriggerGroup)> for TriggerGroups {
    fn from_iter<I: IntoIterator<Item = (K, TriggerGroup)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Operator;

    fn crit_group() -> TriggerGroup {
        TriggerGroup::new("Crits")
            .with_trigger("a", Trigger::on(EventKey::RollAttack).when(Operator::Eq, 20.0))
            .with_trigger("b", Trigger::on(EventKey::RollAttack).when(Operator::Eq, 1.0))
            .with_trigger("c", Trigger::on(EventKey::RollDamage))
            .with_action("x", Action::apply_condition("prone"))
    }

    #[test]
    fn events_are_distinct() {
        let events = crit_group().events();
        assert_eq!(
            events.into_iter().collect::<Vec<_>>(),
            vec![EventKey::RollAttack, EventKey::RollDamage]
        );
    }

    #[test]
    fn any_trigger_fires_the_group() {
        let group = crit_group();
        assert!(group.matches(EventKey::RollAttack, Some(1.0)));
        assert!(group.matches(EventKey::RollAttack, Some(20.0)));
        assert!(!group.matches(EventKey::RollAttack, Some(12.0)));
        assert!(group.matches(EventKey::RollDamage, None));
    }

    #[test]
    fn actor_type_filter() {
        let group = crit_group().for_actor_types(["npc"]);
        assert!(group.applies_to("npc"));
        assert!(!group.applies_to("character"));
        assert!(crit_group().applies_to("character"));
    }

    #[test]
    fn hidden_groups_are_not_active() {
        let groups: TriggerGroups = [("one", crit_group().hidden())].into_iter().collect();
        assert!(groups.active_events().is_empty());
        assert_eq!(groups.referencing(EventKey::RollAttack).count(), 0);
    }

    #[test]
    fn labels_must_be_present_and_unique() {
        let mut groups = TriggerGroups::new();
        groups.upsert("one", crit_group()).unwrap();

        assert_eq!(groups.upsert("two", TriggerGroup::new("  ")), Err(FormError::EmptyLabel));
        assert_eq!(
            groups.upsert("two", TriggerGroup::new(" Crits ")),
            Err(FormError::DuplicateLabel("Crits".into()))
        );
        assert!(groups.get("two").is_none());

        groups.upsert("one", crit_group().hidden()).unwrap();
        assert!(!groups.get("one").unwrap().visible);
    }

    #[test]
    fn visible_defaults_to_true() {
        let group: TriggerGroup = serde_json::from_str(r#"{"label": "Bare"}"#).unwrap();
        assert!(group.visible);
        assert!(group.triggers.is_empty());
    }
}
