//! Match snapshot files (a single `MatchView` as JSON)

use crate::core::MatchView;
use crate::Result;
use std::path::Path;

/// Loader for match snapshots
pub struct SnapshotLoader;

impl SnapshotLoader {
    pub async fn load(path: impl AsRef<Path>) -> Result<MatchView> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<MatchView> {
        Ok(serde_json::from_str(content)?)
    }
}
