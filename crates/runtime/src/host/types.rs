//! Host document shapes the engine reads.
//!
//! These are deliberately thin views: only the fields the engine inspects are
//! modelled, everything else stays on the host side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workflow_core::EventKey;

pub type ActorId = String;
pub type TokenId = String;

/// Handle returned by the host when a hook subscription is registered.
pub type HookId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitPoints {
    pub value: f64,
    pub max: f64,
    #[serde(default)]
    pub tempmax: f64,
}

impl HitPoints {
    pub fn new(value: f64, max: f64) -> Self {
        Self {
            value,
            max,
            tempmax: 0.0,
        }
    }

    /// Maximum including temporary max HP bonuses.
    pub fn effective_max(&self) -> f64 {
        self.max + self.tempmax
    }
}

/// An actor document as seen by the current client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorSnapshot {
    pub id: ActorId,

    /// Actor category (`character`, `npc`, `vehicle`, ...).
    #[serde(rename = "type")]
    pub actor_type: String,

    #[serde(default)]
    pub name: String,

    /// Whether the current client owns this document.
    #[serde(default = "owned_by_default")]
    pub is_owner: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<HitPoints>,
}

fn owned_by_default() -> bool {
    true
}

impl ActorSnapshot {
    pub fn new(id: impl Into<ActorId>, actor_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            actor_type: actor_type.into(),
            name: String::new(),
            is_owner: true,
            hp: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_hp(mut self, hp: HitPoints) -> Self {
        self.hp = Some(hp);
        self
    }

    /// Marks the document as owned by another client.
    pub fn unowned(mut self) -> Self {
        self.is_owner = false;
        self
    }
}

/// One die term of an evaluated roll, e.g. the `1d20` of `1d20 + 5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieTerm {
    pub faces: u32,
    #[serde(default)]
    pub results: Vec<f64>,
    pub total: f64,
}

/// An evaluated roll as delivered by a roll hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roll {
    #[serde(default)]
    pub formula: String,
    pub total: f64,
    #[serde(default)]
    pub dice: Vec<DieTerm>,
}

impl Roll {
    pub fn new(formula: impl Into<String>, total: f64) -> Self {
        Self {
            formula: formula.into(),
            total,
            dice: Vec::new(),
        }
    }

    pub fn with_die(mut self, faces: u32, result: f64) -> Self {
        self.dice.push(DieTerm {
            faces,
            results: vec![result],
            total: result,
        });
        self
    }

    /// Total of the first die term, or of the whole roll when it has no dice.
    pub fn die_total(&self) -> f64 {
        self.dice.first().map_or(self.total, |term| term.total)
    }
}

/// A resolved macro or roll table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

impl DocumentRef {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
        }
    }
}

/// Seed values the award UI opens with. The user fills in the amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardSeed {
    pub currency: BTreeMap<String, u64>,
    pub xp: u64,
}

/// Arguments a macro receives when a group runs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroContext {
    pub actor: ActorSnapshot,
    pub token: Option<TokenId>,
    pub event: EventKey,
    pub die_total: Option<f64>,
    pub rolls: Vec<Roll>,
    pub data: Value,
}
