//! Action executor.
//!
//! Performs one [`Action`] against the host. A field left blank in the action
//! definition makes the action a no-op ([`ActionOutcome::Skipped`]); a
//! reference that no longer resolves fails only that action.

use std::time::Duration;

use tracing::debug;
use workflow_core::{
    Action, ActionKind, DEFAULT_SOUND_VOLUME, NumberInput, RollRequest, UpdateValue,
};

use super::context::Invocation;
use crate::api::ActionError;
use crate::host::{AwardSeed, HostPorts};

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Performed,
    /// The definition is incomplete, nothing was sent to the host.
    Skipped,
}

#[derive(Clone)]
pub struct ActionExecutor {
    ports: HostPorts,
    timeout: Option<Duration>,
}

impl ActionExecutor {
    pub fn new(ports: HostPorts, timeout: Option<Duration>) -> Self {
        Self { ports, timeout }
    }

    /// Runs `action`, bounded by the configured timeout.
    pub async fn run(
        &self,
        action: &Action,
        invocation: &Invocation,
    ) -> Result<ActionOutcome, ActionError> {
        match self.timeout {
            None => self.perform(action, invocation).await,
            Some(after) => tokio::time::timeout(after, self.perform(action, invocation))
                .await
                .map_err(|_| ActionError::TimedOut {
                    kind: action.kind(),
                    after,
                })?,
        }
    }

    async fn perform(
        &self,
        action: &Action,
        invocation: &Invocation,
    ) -> Result<ActionOutcome, ActionError> {
        let host = self.ports.actions();
        let actor = &invocation.actor.id;

        match action {
            Action::Macro { macro_uuid } => {
                let Some(uuid) = macro_uuid else {
                    return Ok(ActionOutcome::Skipped);
                };
                let script = host
                    .resolve_macro(uuid)
                    .await?
                    .ok_or_else(|| ActionError::MacroNotFound(uuid.clone()))?;
                let token = self.ports.world().active_token(actor)?;
                host.execute_macro(&script, invocation.macro_context(token))
                    .await?;
            }

            Action::PlaySound {
                sound_path,
                sound_volume,
            } => {
                let Some(path) = sound_path else {
                    return Ok(ActionOutcome::Skipped);
                };
                let volume = sound_volume
                    .as_ref()
                    .and_then(NumberInput::finite)
                    .unwrap_or(DEFAULT_SOUND_VOLUME);
                host.play_sound(path, volume).await?;
            }

            Action::ApplyCondition { condition_id }
            | Action::RemoveCondition { condition_id }
            | Action::ToggleCondition { condition_id } => {
                let Some(condition) = condition_id else {
                    return Ok(ActionOutcome::Skipped);
                };
                let active = match action.kind() {
                    ActionKind::ApplyCondition => Some(true),
                    ActionKind::RemoveCondition => Some(false),
                    _ => None,
                };
                host.toggle_status(actor, condition, active).await?;
            }

            Action::RollTable { table_uuid } => {
                let Some(uuid) = table_uuid else {
                    return Ok(ActionOutcome::Skipped);
                };
                let table = host
                    .resolve_table(uuid)
                    .await?
                    .ok_or_else(|| ActionError::TableNotFound(uuid.clone()))?;
                host.draw_table(&table).await?;
            }

            Action::DistributeAward => {
                host.open_award(AwardSeed::default()).await?;
            }

            Action::RequestRoll { roll_type, roll_dc } => {
                let Some(roll_type) = roll_type else {
                    return Ok(ActionOutcome::Skipped);
                };
                let request = RollRequest::parse(roll_type, roll_dc.as_ref())?;
                host.request_roll(actor, &request).await?;
            }

            Action::ActorUpdate {
                update_path,
                update_value,
            } => {
                let (Some(path), Some(raw)) = (update_path, update_value) else {
                    return Ok(ActionOutcome::Skipped);
                };
                host.update_actor(actor, path, UpdateValue::coerce(raw))
                    .await?;
            }

            Action::TokenUpdate {
                update_path,
                update_value,
            } => {
                let (Some(path), Some(raw)) = (update_path, update_value) else {
                    return Ok(ActionOutcome::Skipped);
                };
                let token = self
                    .ports
                    .world()
                    .active_token(actor)?
                    .ok_or_else(|| ActionError::NoActiveToken(actor.clone()))?;
                host.update_token(&token, path, UpdateValue::coerce(raw))
                    .await?;
            }
        }

        debug!(
            target: "workflows::actions",
            kind = %action.kind(),
            actor = %actor,
            event = %invocation.event,
            "action performed"
        );
        Ok(ActionOutcome::Performed)
    }
}
