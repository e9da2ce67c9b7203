//! Normalized game events and the host hooks that deliver them.
//!
//! Rules never refer to host hook names directly. They name an [`EventKey`],
//! and the static table in [`EventKey::hook`] decides which physical host hook
//! must be subscribed for that key to ever fire. Several keys can share one
//! hook: every HP threshold rides the pre-update-actor hook, and both rest
//! lengths ride the rest-completed hook.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Kind of game occurrence a trigger can listen for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum EventKey {
    RollAttack,
    RollAbilityCheck,
    RollSavingThrow,
    RollSkill,
    RollToolCheck,
    RollInitiative,
    RollConcentration,
    RollDeathSave,
    RollDamage,
    ZeroHp,
    HalfHp,
    LoseHp,
    GainHp,
    StartOfCombat,
    EndOfCombat,
    StartOfTurn,
    EndOfTurn,
    ShortRest,
    LongRest,
}

impl EventKey {
    /// Host hook that must be subscribed for this event to be observed.
    pub const fn hook(self) -> HookName {
        match self {
            Self::RollAttack => HookName::AttackRoll,
            Self::RollAbilityCheck => HookName::AbilityCheck,
            Self::RollSavingThrow => HookName::SavingThrow,
            Self::RollSkill => HookName::SkillCheck,
            Self::RollToolCheck => HookName::ToolCheck,
            Self::RollInitiative => HookName::Initiative,
            Self::RollConcentration => HookName::Concentration,
            Self::RollDeathSave => HookName::DeathSave,
            Self::RollDamage => HookName::DamageRoll,
            Self::ZeroHp | Self::HalfHp | Self::LoseHp | Self::GainHp => HookName::PreUpdateActor,
            Self::StartOfCombat => HookName::CombatStart,
            Self::EndOfCombat => HookName::DeleteCombat,
            Self::StartOfTurn | Self::EndOfTurn => HookName::UpdateCombat,
            Self::ShortRest | Self::LongRest => HookName::RestCompleted,
        }
    }

    /// Returns true for events produced by a completed die roll.
    pub const fn is_roll(self) -> bool {
        matches!(
            self,
            Self::RollAttack
                | Self::RollAbilityCheck
                | Self::RollSavingThrow
                | Self::RollSkill
                | Self::RollToolCheck
                | Self::RollInitiative
                | Self::RollConcentration
                | Self::RollDeathSave
                | Self::RollDamage
        )
    }
}

/// Physical host hook the engine can subscribe to.
///
/// The string form is the name the host dispatcher uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum HookName {
    #[serde(rename = "dnd5e.rollAttackV2")]
    #[strum(serialize = "dnd5e.rollAttackV2")]
    AttackRoll,
    #[serde(rename = "dnd5e.rollAbilityCheck")]
    #[strum(serialize = "dnd5e.rollAbilityCheck")]
    AbilityCheck,
    #[serde(rename = "dnd5e.rollSavingThrow")]
    #[strum(serialize = "dnd5e.rollSavingThrow")]
    SavingThrow,
    #[serde(rename = "dnd5e.rollSkillV2")]
    #[strum(serialize = "dnd5e.rollSkillV2")]
    SkillCheck,
    #[serde(rename = "dnd5e.rollToolCheckV2")]
    #[strum(serialize = "dnd5e.rollToolCheckV2")]
    ToolCheck,
    #[serde(rename = "dnd5e.rollInitiative")]
    #[strum(serialize = "dnd5e.rollInitiative")]
    Initiative,
    #[serde(rename = "dnd5e.rollConcentration")]
    #[strum(serialize = "dnd5e.rollConcentration")]
    Concentration,
    #[serde(rename = "dnd5e.rollDeathSave")]
    #[strum(serialize = "dnd5e.rollDeathSave")]
    DeathSave,
    #[serde(rename = "dnd5e.rollDamageV2")]
    #[strum(serialize = "dnd5e.rollDamageV2")]
    DamageRoll,
    #[serde(rename = "preUpdateActor")]
    #[strum(serialize = "preUpdateActor")]
    PreUpdateActor,
    #[serde(rename = "combatStart")]
    #[strum(serialize = "combatStart")]
    CombatStart,
    #[serde(rename = "deleteCombat")]
    #[strum(serialize = "deleteCombat")]
    DeleteCombat,
    #[serde(rename = "updateCombat")]
    #[strum(serialize = "updateCombat")]
    UpdateCombat,
    #[serde(rename = "dnd5e.restCompleted")]
    #[strum(serialize = "dnd5e.restCompleted")]
    RestCompleted,
}

impl HookName {
    /// Host-side hook name.
    pub fn host_name(self) -> &'static str {
        self.into()
    }

    /// Event keys delivered through this hook.
    pub fn events(self) -> impl Iterator<Item = EventKey> {
        EventKey::iter().filter(move |event| event.hook() == self)
    }

    /// Single event carried by a roll hook, `None` for every other hook.
    pub fn roll_event(self) -> Option<EventKey> {
        let mut events = self.events();
        match (events.next(), events.next()) {
            (Some(event), None) if event.is_roll() => Some(event),
            _ => None,
        }
    }
}

/// Image of a set of events under the event-to-hook table.
pub fn required_hooks<'a>(events: impl IntoIterator<Item = &'a EventKey>) -> BTreeSet<HookName> {
    events.into_iter().map(|event| event.hook()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_keys_use_camel_case_names() {
        assert_eq!(EventKey::ZeroHp.to_string(), "zeroHp");
        assert_eq!(EventKey::RollAbilityCheck.as_ref(), "rollAbilityCheck");
        assert_eq!(EventKey::from_str("longRest"), Ok(EventKey::LongRest));
        assert_eq!(
            serde_json::to_string(&EventKey::StartOfTurn).unwrap(),
            "\"startOfTurn\""
        );
    }

    #[test]
    fn hp_events_share_the_pre_update_hook() {
        let hooks = required_hooks(&[
            EventKey::ZeroHp,
            EventKey::HalfHp,
            EventKey::LoseHp,
            EventKey::GainHp,
        ]);
        assert_eq!(hooks.into_iter().collect::<Vec<_>>(), vec![HookName::PreUpdateActor]);
    }

    #[test]
    fn every_hook_carries_at_least_one_event() {
        for hook in HookName::iter() {
            assert!(hook.events().next().is_some(), "{hook} carries no event");
        }
    }

    #[test]
    fn roll_event_is_only_defined_for_roll_hooks() {
        assert_eq!(HookName::DamageRoll.roll_event(), Some(EventKey::RollDamage));
        assert_eq!(HookName::DeathSave.roll_event(), Some(EventKey::RollDeathSave));
        assert_eq!(HookName::RestCompleted.roll_event(), None);
        assert_eq!(HookName::PreUpdateActor.roll_event(), None);
    }

    #[test]
    fn host_names_round_trip() {
        for hook in HookName::iter() {
            assert_eq!(HookName::from_str(hook.host_name()), Ok(hook));
        }
    }
}
