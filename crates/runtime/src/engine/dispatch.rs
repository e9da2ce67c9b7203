//! Dispatch core: from a fired event to executed actions.
//!
//! World groups come from the event index, actor groups are read fresh from
//! the acting document on every call. Every action of every matched group is
//! started in its own task, world groups first and in definition order within
//! a group. No action waits on another, so a failure, panic or stalled host
//! call stays with that action. The dispatch then waits for all of them,
//! each bounded by the configured action timeout.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};
use workflow_core::{Action, EventKey, GroupId, TriggerGroup};

use super::context::{EventContext, Invocation};
use super::executor::{ActionExecutor, ActionOutcome};
use super::settings::actor_groups;
use super::WorkflowEngine;
use crate::api::ActionError;
use crate::events::{GroupScope, WorkflowEvent};

/// What one dispatch did. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub groups_matched: usize,
    pub actions_performed: usize,
    pub actions_skipped: usize,
    pub actions_failed: usize,
}

impl DispatchSummary {
    pub fn merge(&mut self, other: DispatchSummary) {
        self.groups_matched += other.groups_matched;
        self.actions_performed += other.actions_performed;
        self.actions_skipped += other.actions_skipped;
        self.actions_failed += other.actions_failed;
    }
}

/// An action handed to its own task.
struct Started {
    group: GroupId,
    action_id: String,
    action: Action,
}

struct Candidate {
    scope: GroupScope,
    id: GroupId,
    group: Arc<TriggerGroup>,
}

impl WorkflowEngine {
    /// Runs every group matching `event` for the context's actor.
    ///
    /// Never fails: broken configuration and failing actions are logged and
    /// reported, and every other action still runs.
    pub async fn process_event(&self, event: EventKey, mut context: EventContext) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        let Some(actor) = context.actor.take() else {
            debug!(target: "workflows::dispatch", %event, "no acting document");
            return summary;
        };

        let mut candidates: Vec<Candidate> = match self.index() {
            Ok(index) => index
                .get(event)
                .iter()
                .map(|indexed| Candidate {
                    scope: GroupScope::World,
                    id: indexed.id.clone(),
                    group: Arc::clone(&indexed.group),
                })
                .collect(),
            Err(e) => {
                error!(target: "workflows::dispatch", %event, error = %e, "event index unavailable");
                Vec::new()
            }
        };

        match actor_groups(self.ports().world(), &actor.id) {
            Ok(groups) => candidates.extend(groups.referencing(event).map(|(id, group)| Candidate {
                scope: GroupScope::Actor,
                id: id.to_owned(),
                group: Arc::new(group.clone()),
            })),
            Err(e) => warn!(
                target: "workflows::dispatch",
                actor = %actor.id,
                error = %e,
                "ignoring actor workflows"
            ),
        }

        let invocation = Arc::new(Invocation::new(event, actor, context));
        let mut running = JoinSet::new();
        for candidate in candidates {
            if !candidate.group.applies_to(&invocation.actor.actor_type) {
                continue;
            }
            if !candidate.group.matches(event, invocation.die_total) {
                continue;
            }
            summary.groups_matched += 1;
            debug!(
                target: "workflows::dispatch",
                %event,
                actor = %invocation.actor.id,
                group = %candidate.id,
                scope = ?candidate.scope,
                "workflow fired"
            );
            self.publish(WorkflowEvent::GroupFired {
                event,
                actor: invocation.actor.id.clone(),
                scope: candidate.scope,
                group: candidate.id.clone(),
                label: candidate.group.label.clone(),
            });

            for (action_id, action) in candidate.group.actions.iter() {
                let slot = Started {
                    group: candidate.id.clone(),
                    action_id: action_id.to_owned(),
                    action: action.clone(),
                };
                let executor = self.executor().clone();
                let shared = Arc::clone(&invocation);
                running.spawn(async move {
                    let result = run_isolated(&executor, slot.action.clone(), shared).await;
                    (slot, result)
                });
            }
        }

        while let Some(joined) = running.join_next().await {
            match joined {
                Ok((slot, result)) => self.record_outcome(
                    &mut summary,
                    &invocation,
                    &slot.group,
                    &slot.action_id,
                    &slot.action,
                    result,
                ),
                Err(e) => {
                    summary.actions_failed += 1;
                    error!(target: "workflows::dispatch", %event, error = %e, "action task lost");
                }
            }
        }
        summary
    }

    fn record_outcome(
        &self,
        summary: &mut DispatchSummary,
        invocation: &Invocation,
        group: &str,
        action_id: &str,
        action: &Action,
        result: Result<ActionOutcome, ActionError>,
    ) {
        let kind = action.kind();
        match result {
            Ok(outcome) => {
                let performed = outcome == ActionOutcome::Performed;
                if performed {
                    summary.actions_performed += 1;
                } else {
                    summary.actions_skipped += 1;
                }
                self.publish(WorkflowEvent::ActionCompleted {
                    event: invocation.event,
                    actor: invocation.actor.id.clone(),
                    group: group.to_owned(),
                    action: action_id.to_owned(),
                    kind,
                    performed,
                });
            }
            Err(e) => {
                summary.actions_failed += 1;
                warn!(
                    target: "workflows::actions",
                    %kind,
                    group,
                    action = action_id,
                    actor = %invocation.actor.id,
                    error = %e,
                    "action failed"
                );
                if e.is_user_facing() {
                    self.ports().actions().notify_error(&e.to_string());
                }
                self.publish(WorkflowEvent::ActionFailed {
                    event: invocation.event,
                    actor: invocation.actor.id.clone(),
                    group: group.to_owned(),
                    action: action_id.to_owned(),
                    kind,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Runs one action in its own task and waits for it.
async fn run_isolated(
    executor: &ActionExecutor,
    action: Action,
    invocation: Arc<Invocation>,
) -> Result<ActionOutcome, ActionError> {
    let kind = action.kind();
    let executor = executor.clone();
    let task = tokio::spawn(async move { executor.run(&action, &invocation).await });
    match task.await {
        Ok(result) => result,
        Err(join) => Err(ActionError::Aborted {
            kind,
            reason: join.to_string(),
        }),
    }
}
