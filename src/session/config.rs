//! Session tuning knobs
//!
//! Loadable from a JSON file; every field has a default so a partial file (or
//! none at all) works.

use crate::core::DEFAULT_MAX_SELECTIONS;
use crate::session::logger::{OutputFormat, OutputMode, VerbosityLevel};
use crate::view::DEFAULT_GRAVEYARD_WINDOW;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How long a transient feedback message stays visible
pub const DEFAULT_FEEDBACK_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Feedback lifetime in milliseconds
    pub feedback_ttl_ms: u64,
    /// Selection maximum for prompts that do not declare one
    pub default_max_selections: usize,
    pub graveyard_window: usize,
    pub verbosity: VerbosityLevel,
    pub output_mode: OutputMode,
    pub output_format: OutputFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            feedback_ttl_ms: DEFAULT_FEEDBACK_TTL.as_millis() as u64,
            default_max_selections: DEFAULT_MAX_SELECTIONS,
            graveyard_window: DEFAULT_GRAVEYARD_WINDOW,
            verbosity: VerbosityLevel::default(),
            output_mode: OutputMode::default(),
            output_format: OutputFormat::default(),
        }
    }
}

impl SessionConfig {
    pub fn feedback_ttl(&self) -> Duration {
        Duration::from_millis(self.feedback_ttl_ms)
    }

    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file asynchronously
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }
}
