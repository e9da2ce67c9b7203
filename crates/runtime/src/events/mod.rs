//! Topic-based observer bus for engine activity.
//!
//! The engine publishes what it does (index rebuilds, hook changes, fired
//! groups, action outcomes) so hosts and tests can watch it without hooking
//! into the dispatcher. Publishing is best-effort.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::{GroupScope, WorkflowEvent};
