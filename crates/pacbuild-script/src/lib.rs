//! Variable environment and staged hook executor.
//!
//! [`VariableEnvironment`] snapshots the paths and identifiers a build
//! needs; [`HookExecutor`] extracts a named hook's body from a recipe and
//! runs it inside that environment through a POSIX-compatible shell.

pub mod environment;
pub mod error;
pub mod executor;

pub use environment::{ToolchainHints, VariableEnvironment};
pub use error::{Result, ScriptError};
pub use executor::{HookExecutor, HookResult};
