//! Public runtime API surface.
//!
//! Error types shared by the engine, the host ports and consumers of the crate.

pub mod errors;

pub use errors::{ActionError, Result, WorkflowError};
