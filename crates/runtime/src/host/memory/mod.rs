//! In-process host ports for tests and local runs.
//!
//! Each adapter keeps its state behind a `std::sync::RwLock` and exposes a few
//! inspection helpers so callers can assert on what the engine did.
mod actions;
mod hooks;
mod settings;
mod world;

pub use actions::{HostCall, RecordingActionHost};
pub use hooks::MemoryHookBus;
pub use settings::MemorySettings;
pub use world::{MemoryWorld, StoredActor};
