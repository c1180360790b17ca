//! Session script format (.json)
//!
//! A script describes a whole session against a scripted match service:
//!
//! ```json
//! {
//!   "matchId": "m-1",
//!   "viewer": "p1",
//!   "snapshot": { ...MatchView... },
//!   "steps": [
//!     { "step": "push", "view": { ...MatchView... } },
//!     { "step": "action", "action": { "action": "submitInitiative", "choice": 0 } },
//!     { "step": "action", "action": { "action": "nextPhase" },
//!       "outcome": { "result": "reject", "message": "Not your turn" } },
//!     { "step": "streamFailure", "message": "connection reset" }
//!   ]
//! }
//! ```

use crate::core::{BattlefieldId, InitiativeChoice, InstanceId, MatchId, MatchView, PlayerId};
use crate::service::ScriptedOutcome;
use crate::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A user-level action, replayed through the session (so gating applies)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ScriptAction {
    PlayCard {
        card_index: usize,
        #[serde(default)]
        targets: Vec<String>,
        #[serde(default)]
        destination: Option<String>,
    },
    ToggleUnit {
        instance_id: InstanceId,
    },
    MoveSelected {
        destination: String,
    },
    ReturnToBase,
    NextPhase,
    /// Request and immediately confirm
    Concede,
    ToggleMulligan {
        index: usize,
    },
    SubmitMulligan,
    SelectBattlefield {
        battlefield_id: BattlefieldId,
    },
    SubmitInitiative {
        choice: InitiativeChoice,
    },
    ToggleOption {
        id: String,
    },
    SubmitSelection,
    React {
        #[serde(default)]
        pass: bool,
    },
}

impl ScriptAction {
    /// Does this action reach the match service (and consume an outcome)?
    pub fn sends_command(&self) -> bool {
        !matches!(
            self,
            ScriptAction::ToggleUnit { .. }
                | ScriptAction::ToggleMulligan { .. }
                | ScriptAction::ToggleOption { .. }
        )
    }
}

impl fmt::Display for ScriptAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptAction::PlayCard { card_index, .. } => write!(f, "play card #{card_index}"),
            ScriptAction::ToggleUnit { instance_id } => write!(f, "toggle unit {instance_id}"),
            ScriptAction::MoveSelected { destination } => write!(f, "move selected to {destination}"),
            ScriptAction::ReturnToBase => write!(f, "return selected to base"),
            ScriptAction::NextPhase => write!(f, "next phase"),
            ScriptAction::Concede => write!(f, "concede"),
            ScriptAction::ToggleMulligan { index } => write!(f, "toggle mulligan card #{index}"),
            ScriptAction::SubmitMulligan => write!(f, "submit mulligan"),
            ScriptAction::SelectBattlefield { battlefield_id } => {
                write!(f, "select battlefield {battlefield_id}")
            }
            ScriptAction::SubmitInitiative { choice } => write!(f, "choose {choice}"),
            ScriptAction::ToggleOption { id } => write!(f, "toggle option {id}"),
            ScriptAction::SubmitSelection => write!(f, "submit selection"),
            ScriptAction::React { pass: true } => write!(f, "pass reaction"),
            ScriptAction::React { pass: false } => write!(f, "respond to reaction"),
        }
    }
}

/// One scripted event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum ScriptStep {
    /// The service pushes a new state
    Push { view: MatchView },
    /// The push stream breaks
    StreamFailure { message: String },
    /// The viewer does something; `outcome` answers the resulting command
    Action {
        action: ScriptAction,
        #[serde(default)]
        outcome: ScriptedOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionScript {
    pub match_id: MatchId,
    /// Omitted for a spectator session
    #[serde(default)]
    pub viewer: Option<PlayerId>,
    /// What the initial pull returns
    pub snapshot: MatchView,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl SessionScript {
    /// Reject scripts that cannot describe a coherent session
    pub fn validate(&self) -> Result<()> {
        if self.snapshot.match_id != self.match_id {
            return Err(SessionError::InvalidScript(format!(
                "snapshot is for match {} but the script is for {}",
                self.snapshot.match_id, self.match_id
            )));
        }
        if let Some(viewer) = &self.viewer {
            if !self.snapshot.has_player(viewer) {
                return Err(SessionError::InvalidScript(format!(
                    "viewer {viewer} is not a participant"
                )));
            }
        }
        for (i, step) in self.steps.iter().enumerate() {
            if let ScriptStep::Action { action, .. } = step {
                if self.viewer.is_none() && action.sends_command() {
                    return Err(SessionError::InvalidScript(format!(
                        "step {i}: spectator scripts cannot {action}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn push_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, ScriptStep::Push { .. }))
            .count()
    }
}

/// Loader for session scripts
pub struct ScriptLoader;

impl ScriptLoader {
    /// Load and validate a script file
    pub async fn load(path: impl AsRef<Path>) -> Result<SessionScript> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse(&content)
    }

    /// Parse and validate a script from JSON text
    pub fn parse(content: &str) -> Result<SessionScript> {
        let script: SessionScript = serde_json::from_str(content)?;
        script.validate()?;
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "matchId": "m-1",
        "viewer": "p1",
        "snapshot": {
            "matchId": "m-1",
            "status": "setup",
            "players": [{"playerId": "p1"}, {"playerId": "p2"}]
        },
        "steps": [
            {"step": "action", "action": {"action": "submitInitiative", "choice": 2}},
            {"step": "action", "action": {"action": "nextPhase"},
             "outcome": {"result": "reject", "message": "Not your turn"}},
            {"step": "streamFailure", "message": "reset"}
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script = ScriptLoader::parse(SCRIPT).unwrap();
        assert_eq!(script.viewer, Some(PlayerId::new("p1")));
        assert_eq!(script.steps.len(), 3);
        assert_eq!(
            script.steps[0],
            ScriptStep::Action {
                action: ScriptAction::SubmitInitiative {
                    choice: InitiativeChoice::Shield
                },
                outcome: ScriptedOutcome::Accept,
            }
        );
        assert!(matches!(
            &script.steps[1],
            ScriptStep::Action { outcome: ScriptedOutcome::Reject { message }, .. } if message == "Not your turn"
        ));
        assert_eq!(script.push_count(), 0);
    }

    #[test]
    fn test_viewer_must_participate() {
        let bad = SCRIPT.replace(r#""viewer": "p1""#, r#""viewer": "p9""#);
        assert!(matches!(
            ScriptLoader::parse(&bad),
            Err(SessionError::InvalidScript(_))
        ));
    }

    #[test]
    fn test_spectator_cannot_send_commands() {
        let bad = SCRIPT.replace(r#""viewer": "p1","#, "");
        let err = ScriptLoader::parse(&bad).unwrap_err();
        assert!(err.to_string().contains("spectator scripts cannot choose Shield"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ScriptLoader::parse("{\"matchId\": 1"),
            Err(SessionError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = ScriptLoader::load("does/not/exist.json").await;
        assert!(matches!(result, Err(SessionError::IoError(_))));
    }
}
