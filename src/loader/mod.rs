//! Session script and snapshot loaders
//!
//! JSON files consumed by the command-line tools and the integration tests.

pub mod script;
pub mod snapshot;

pub use script::{ScriptAction, ScriptLoader, ScriptStep, SessionScript};
pub use snapshot::SnapshotLoader;
