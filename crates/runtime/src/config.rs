//! Engine configuration.

use std::env;
use std::time::Duration;

/// Default upper bound on a single action.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration shared by the engine, its dispatcher and the action executor.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Settings namespace; keys are `<namespace>.enable` and
    /// `<namespace>.workflows`.
    pub settings_namespace: String,
    pub observer_buffer_size: usize,
    /// Upper bound on a single action. A dispatch returns once every action
    /// it started has finished or timed out. `None` lets an action, and the
    /// dispatch waiting on it, run forever.
    pub action_timeout: Option<Duration>,
    /// Ignore hook deliveries for documents the current client does not own.
    pub require_ownership: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            settings_namespace: "workflows".to_owned(),
            observer_buffer_size: 100,
            action_timeout: Some(DEFAULT_ACTION_TIMEOUT),
            require_ownership: true,
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(namespace) = env::var("WORKFLOWS_NAMESPACE")
            && !namespace.trim().is_empty()
        {
            config.settings_namespace = namespace.trim().to_owned();
        }

        if let Some(capacity) = read_env::<usize>("WORKFLOWS_EVENT_BUFFER") {
            config.observer_buffer_size = capacity.max(1);
        }

        // 0 disables the timeout
        if let Some(millis) = read_env::<u64>("WORKFLOWS_ACTION_TIMEOUT_MS") {
            config.action_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(require) = read_env::<bool>("WORKFLOWS_REQUIRE_OWNERSHIP") {
            config.require_ownership = require;
        }

        config
    }

    pub fn enable_key(&self) -> String {
        format!("{}.enable", self.settings_namespace)
    }

    pub fn groups_key(&self) -> String {
        format!("{}.workflows", self.settings_namespace)
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_the_namespace() {
        let config = RuntimeConfig {
            settings_namespace: "homebrew".into(),
            ..RuntimeConfig::default()
        };
        assert_eq!(config.enable_key(), "homebrew.enable");
        assert_eq!(config.groups_key(), "homebrew.workflows");
    }

    #[test]
    fn defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.groups_key(), "workflows.workflows");
        assert_eq!(config.observer_buffer_size, 100);
        assert_eq!(config.action_timeout, Some(DEFAULT_ACTION_TIMEOUT));
        assert!(config.require_ownership);
    }
}
