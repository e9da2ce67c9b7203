//! Event index and hook subscription behavior.

mod common;

use std::collections::BTreeSet;

use common::{Harness, enabled_settings, groups, hero, macro_group, to_flag};
use serde_json::json;
use workflow_core::{EventKey, FormError, HookName, Operator, Trigger, TriggerGroup};
use workflow_runtime::host::memory::{MemorySettings, MemoryWorld, RecordingActionHost};
use workflow_runtime::{Topic, WorkflowError, WorkflowEvent};

fn hooks(names: &[HookName]) -> BTreeSet<HookName> {
    names.iter().copied().collect()
}

/// A group with several triggers on one event is indexed once under it.
#[test]
fn index_holds_each_visible_group_once_per_event() {
    let world_groups = groups([
        (
            "crits",
            TriggerGroup::new("Crits")
                .with_trigger("a", Trigger::on(EventKey::RollAttack).when(Operator::Eq, 20.0))
                .with_trigger("b", Trigger::on(EventKey::RollAttack).when(Operator::Eq, 1.0))
                .with_trigger("c", Trigger::on(EventKey::RollAttack)),
        ),
        (
            "down",
            macro_group("Down", Trigger::on(EventKey::ZeroHp), &["Macro.down"]),
        ),
    ]);
    let harness = Harness::started(&world_groups, MemoryWorld::new(), RecordingActionHost::new());

    let index = harness.engine.index().expect("index readable");
    let attack: Vec<_> = index
        .get(EventKey::RollAttack)
        .iter()
        .map(|g| g.id.clone())
        .collect();
    assert_eq!(attack, vec!["crits".to_owned()]);
    assert_eq!(index.get(EventKey::ZeroHp).len(), 1);
    assert_eq!(index.group_count(), 2);
}

#[test]
fn hidden_groups_contribute_nothing() {
    let world_groups = groups([(
        "off",
        macro_group("Off", Trigger::on(EventKey::RollDamage), &["Macro.x"]).hidden(),
    )]);
    let harness = Harness::started(&world_groups, MemoryWorld::new(), RecordingActionHost::new());

    assert!(harness.engine.index().unwrap().is_empty());
    assert!(harness.engine.subscribed_hooks().unwrap().is_empty());
    assert_eq!(harness.bus.live_count(), 0);
}

/// Subscribed hooks are exactly the image of the active events, including
/// events referenced only by actor groups.
#[test]
fn subscribed_hooks_match_active_events() {
    let world_groups = groups([
        (
            "crits",
            macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
        ),
        (
            "hp",
            TriggerGroup::new("HP")
                .with_trigger("a", Trigger::on(EventKey::ZeroHp))
                .with_trigger("b", Trigger::on(EventKey::LoseHp)),
        ),
        (
            "hidden",
            macro_group("Hidden", Trigger::on(EventKey::RollDamage), &["Macro.b"]).hidden(),
        ),
    ]);
    let actor_groups = groups([(
        "rest",
        macro_group("Rest", Trigger::on(EventKey::LongRest), &["Macro.c"]),
    )]);
    let world = MemoryWorld::new().with_actor(hero().with_triggers(to_flag(&actor_groups)));
    let harness = Harness::started(&world_groups, world, RecordingActionHost::new());

    let expected = hooks(&[
        HookName::AttackRoll,
        HookName::PreUpdateActor,
        HookName::RestCompleted,
    ]);
    assert_eq!(harness.engine.subscribed_hooks().unwrap(), expected);
    assert_eq!(harness.bus.subscribed(), expected);
    assert_eq!(harness.bus.live_count(), 3);
    // actor groups are not indexed
    assert!(harness.engine.index().unwrap().get(EventKey::LongRest).is_empty());
}

#[test]
fn rebuild_is_idempotent() {
    let world_groups = groups([(
        "crits",
        macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
    )]);
    let harness = Harness::started(&world_groups, MemoryWorld::new(), RecordingActionHost::new());

    let calls = harness.bus.call_count();
    harness.engine.rebuild().expect("rebuild");
    assert_eq!(harness.bus.call_count(), calls);
    assert_eq!(harness.bus.live_count(), 1);
}

#[test]
fn disabling_clears_index_and_hooks() {
    let world_groups = groups([
        (
            "crits",
            macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
        ),
        (
            "turns",
            macro_group("Turns", Trigger::on(EventKey::StartOfTurn), &["Macro.b"]),
        ),
    ]);
    let harness = Harness::started(&world_groups, MemoryWorld::new(), RecordingActionHost::new());
    assert_eq!(harness.bus.live_count(), 2);

    harness.engine.set_enabled(false).expect("disable");

    assert!(harness.engine.index().unwrap().is_empty());
    assert!(harness.engine.subscribed_hooks().unwrap().is_empty());
    assert_eq!(harness.bus.live_count(), 0);
    assert!(!harness.engine.is_enabled().unwrap());
}

#[test]
fn missing_switch_means_disabled() {
    let world_groups = groups([(
        "crits",
        macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
    )]);
    let settings = MemorySettings::new().with(
        "workflows.workflows",
        serde_json::to_value(&world_groups).unwrap(),
    );
    let harness = Harness::new(settings, MemoryWorld::new(), RecordingActionHost::new());
    harness.engine.init().expect("init");

    assert!(harness.engine.index().unwrap().is_empty());
    assert_eq!(harness.bus.live_count(), 0);
}

/// Saving an actor's groups subscribes what they need without a rebuild, and
/// never releases anything until the next rebuild.
#[test]
fn actor_saves_only_add_hooks() {
    let harness = Harness::started(
        &groups([]),
        MemoryWorld::new().with_actor(hero()),
        RecordingActionHost::new(),
    );
    assert_eq!(harness.bus.live_count(), 0);

    let damage = groups([(
        "dmg",
        macro_group("Damage", Trigger::on(EventKey::RollDamage), &["Macro.d"]),
    )]);
    harness
        .engine
        .save_actor_groups("hero", &damage)
        .expect("save actor groups");

    assert_eq!(harness.bus.subscribed(), hooks(&[HookName::DamageRoll]));
    assert!(harness.engine.index().unwrap().is_empty());

    harness
        .engine
        .save_actor_groups("hero", &groups([]))
        .expect("clear actor groups");
    assert_eq!(harness.bus.subscribed(), hooks(&[HookName::DamageRoll]));

    harness.engine.rebuild().expect("rebuild");
    assert_eq!(harness.bus.live_count(), 0);
}

#[test]
fn actor_saves_replace_the_whole_flag() {
    let harness = Harness::started(
        &groups([]),
        MemoryWorld::new().with_actor(hero()),
        RecordingActionHost::new(),
    );
    let saved = groups([(
        "one",
        macro_group("One", Trigger::on(EventKey::ShortRest), &["Macro.r"]),
    )]);
    harness.engine.save_actor_groups("hero", &saved).unwrap();

    let writes = harness.world.flag_writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], ("hero".to_owned(), json!({})));
    assert_eq!(harness.engine.actor_groups("hero").unwrap(), saved);
}

#[test]
fn actor_saves_while_disabled_subscribe_nothing() {
    let harness = Harness::new(
        MemorySettings::new().with("workflows.enable", json!(false)),
        MemoryWorld::new().with_actor(hero()),
        RecordingActionHost::new(),
    );
    harness.engine.init().unwrap();
    let damage = groups([(
        "dmg",
        macro_group("Damage", Trigger::on(EventKey::RollDamage), &["Macro.d"]),
    )]);
    harness.engine.save_actor_groups("hero", &damage).unwrap();
    assert_eq!(harness.bus.live_count(), 0);
}

#[test]
fn saving_for_an_unknown_actor_fails() {
    let harness = Harness::started(&groups([]), MemoryWorld::new(), RecordingActionHost::new());
    let err = harness
        .engine
        .save_actor_groups("nobody", &groups([]))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownActor(ref id) if id == "nobody"));
}

/// A rejected save leaves both storage and the index untouched.
#[test]
fn duplicate_labels_are_rejected_before_persisting() {
    let existing = groups([(
        "crits",
        macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
    )]);
    let harness = Harness::started(&existing, MemoryWorld::new(), RecordingActionHost::new());

    let err = harness
        .engine
        .upsert_world_group(
            "copy",
            macro_group(" Crits ", Trigger::on(EventKey::RollDamage), &["Macro.b"]),
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Form(FormError::DuplicateLabel(_))));

    let err = harness
        .engine
        .upsert_world_group("blank", TriggerGroup::new("   "))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Form(FormError::EmptyLabel)));

    assert!(harness.settings.writes().is_empty());
    assert!(harness.engine.index().unwrap().get(EventKey::RollDamage).is_empty());
    assert_eq!(harness.bus.subscribed(), hooks(&[HookName::AttackRoll]));
}

#[test]
fn world_saves_replace_then_rebuild() {
    let harness = Harness::started(&groups([]), MemoryWorld::new(), RecordingActionHost::new());

    harness
        .engine
        .upsert_world_group(
            "turns",
            macro_group("Turns", Trigger::on(EventKey::EndOfTurn), &["Macro.t"]),
        )
        .expect("upsert");

    let writes = harness.settings.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0], ("workflows.workflows".to_owned(), json!({})));
    assert_eq!(harness.engine.index().unwrap().get(EventKey::EndOfTurn).len(), 1);
    assert_eq!(harness.bus.subscribed(), hooks(&[HookName::UpdateCombat]));

    let removed = harness.engine.remove_world_group("turns").unwrap();
    assert!(removed.is_some());
    assert_eq!(harness.bus.live_count(), 0);
}

#[test]
fn dispose_releases_everything() {
    let world_groups = groups([(
        "crits",
        macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
    )]);
    let harness = Harness::started(&world_groups, MemoryWorld::new(), RecordingActionHost::new());

    harness.engine.dispose().expect("dispose");
    assert_eq!(harness.bus.live_count(), 0);
    assert!(harness.engine.index().unwrap().is_empty());
}

#[tokio::test]
async fn registry_changes_are_published() {
    let world_groups = groups([(
        "crits",
        macro_group("Crits", Trigger::on(EventKey::RollAttack), &["Macro.a"]),
    )]);
    let harness = Harness::new(
        enabled_settings(&world_groups),
        MemoryWorld::new(),
        RecordingActionHost::new(),
    );
    let mut events = harness.engine.subscribe_events(Topic::Registry);

    harness.engine.init().unwrap();

    assert_eq!(
        events.recv().await.unwrap(),
        WorkflowEvent::HookSubscribed {
            hook: HookName::AttackRoll
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        WorkflowEvent::IndexRebuilt {
            enabled: true,
            indexed_groups: 1,
            active_events: vec![EventKey::RollAttack],
        }
    );
}

/// Saves racing from several threads leave the index and the hooks agreeing
/// with whatever collection was written last.
#[test]
fn concurrent_saves_leave_a_consistent_index() {
    let harness = Harness::started(
        &groups([]),
        MemoryWorld::new().with_actor(hero()),
        RecordingActionHost::new(),
    );
    let events = [
        EventKey::RollAttack,
        EventKey::RollDamage,
        EventKey::ShortRest,
        EventKey::StartOfCombat,
    ];

    let writers: Vec<_> = events
        .into_iter()
        .enumerate()
        .map(|(i, event)| {
            let engine = harness.engine.clone();
            std::thread::spawn(move || {
                for round in 0..25 {
                    let label = format!("writer {i} round {round}");
                    let saved = groups([(
                        "only",
                        macro_group(&label, Trigger::on(event), &["Macro.a"]),
                    )]);
                    engine.save_world_groups(&saved).expect("save should succeed");
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().expect("writer thread should not panic");
    }

    let stored = harness.engine.world_groups().unwrap();
    let last = stored.get("only").expect("a collection was saved");
    let (_, trigger) = last.triggers.iter().next().expect("one trigger");
    let stored_event = trigger.event;
    let index = harness.engine.index().unwrap();
    assert_eq!(index.events(), BTreeSet::from([stored_event]));
    assert_eq!(index.get(stored_event)[0].group.label, last.label);
    assert_eq!(
        harness.engine.subscribed_hooks().unwrap(),
        hooks(&[stored_event.hook()])
    );
    assert_eq!(harness.bus.subscribed(), hooks(&[stored_event.hook()]));
}
