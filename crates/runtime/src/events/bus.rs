//! Topic-based event bus implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::WorkflowEvent;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Index rebuilds and hook subscription changes
    Registry,
    /// Fired groups and action outcomes
    Dispatch,
}

struct Channels {
    registry: broadcast::Sender<WorkflowEvent>,
    dispatch: broadcast::Sender<WorkflowEvent>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<WorkflowEvent> {
        match topic {
            Topic::Registry => &self.registry,
            Topic::Dispatch => &self.dispatch,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                registry: broadcast::channel(capacity).0,
                dispatch: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: WorkflowEvent) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<WorkflowEvent> {
        self.channels.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_core::HookName;

    #[tokio::test]
    async fn events_are_routed_by_topic() {
        let bus = EventBus::with_capacity(4);
        let mut registry = bus.subscribe(Topic::Registry);
        let mut dispatch = bus.subscribe(Topic::Dispatch);

        bus.publish(WorkflowEvent::HookSubscribed {
            hook: HookName::DamageRoll,
        });

        assert_eq!(
            registry.recv().await.unwrap(),
            WorkflowEvent::HookSubscribed {
                hook: HookName::DamageRoll
            }
        );
        assert!(dispatch.try_recv().is_err());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        EventBus::new().publish(WorkflowEvent::HookUnsubscribed {
            hook: HookName::CombatStart,
        });
    }
}
