//! Interface to the authoritative match service
//!
//! The match service owns the rules and the state. The client talks to it in
//! three ways:
//! 1. Pull: one-shot fetch of a full [`MatchView`]
//! 2. Push: long-lived subscription emitting a new `MatchView` on every change
//! 3. Command: one-shot request applying a player action
//!
//! Commands only report success or failure. The refreshed state always comes
//! through the push stream.

pub mod scripted;

pub use scripted::{ScriptedMatchService, ScriptedOutcome};

use crate::core::{
    BattlefieldId, InitiativeChoice, InstanceId, MatchId, MatchView, PlayerId, PromptId,
};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tokio::sync::mpsc;

/// One item delivered by a push subscription
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A complete new authoritative state
    Update(MatchView),
    /// The stream broke; no further updates will follow
    Failed(String),
}

/// Receiving end of a push subscription
///
/// Dropping it releases the subscription.
#[derive(Debug)]
pub struct PushStream {
    rx: mpsc::UnboundedReceiver<PushEvent>,
}

impl PushStream {
    pub fn new(rx: mpsc::UnboundedReceiver<PushEvent>) -> Self {
        PushStream { rx }
    }

    /// Create a connected sender/stream pair
    pub fn channel() -> (mpsc::UnboundedSender<PushEvent>, PushStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, PushStream::new(rx))
    }

    /// Wait for the next event; `None` once the service closed the stream
    pub async fn next(&mut self) -> Option<PushEvent> {
        self.rx.recv().await
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<PushEvent> {
        self.rx.try_recv().ok()
    }
}

/// Groups of commands sharing one in-flight guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandFamily {
    PlayCard,
    MoveUnit,
    AdvancePhase,
    Concede,
    Mulligan,
    Battlefield,
    Initiative,
    PromptSelection,
    Reaction,
}

impl fmt::Display for CommandFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommandFamily::PlayCard => "play card",
            CommandFamily::MoveUnit => "move unit",
            CommandFamily::AdvancePhase => "advance phase",
            CommandFamily::Concede => "concede",
            CommandFamily::Mulligan => "mulligan",
            CommandFamily::Battlefield => "battlefield selection",
            CommandFamily::Initiative => "initiative choice",
            CommandFamily::PromptSelection => "selection",
            CommandFamily::Reaction => "reaction",
        };
        write!(f, "{label}")
    }
}

/// A player action sent to the match service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    PlayCard {
        match_id: MatchId,
        player_id: PlayerId,
        card_index: usize,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        targets: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        destination_id: Option<String>,
    },
    MoveUnit {
        match_id: MatchId,
        player_id: PlayerId,
        unit_instance_id: InstanceId,
        destination_id: String,
    },
    NextPhase {
        match_id: MatchId,
        player_id: PlayerId,
    },
    ConcedeMatch {
        match_id: MatchId,
        player_id: PlayerId,
    },
    SubmitMulligan {
        match_id: MatchId,
        player_id: PlayerId,
        indices: Vec<usize>,
    },
    SelectBattlefield {
        match_id: MatchId,
        player_id: PlayerId,
        battlefield_id: BattlefieldId,
    },
    SubmitInitiativeChoice {
        match_id: MatchId,
        player_id: PlayerId,
        choice: InitiativeChoice,
    },
    SubmitTargetSelection {
        match_id: MatchId,
        player_id: PlayerId,
        prompt_id: PromptId,
        selection_ids: Vec<String>,
    },
    SubmitDiscardSelection {
        match_id: MatchId,
        player_id: PlayerId,
        prompt_id: PromptId,
        selection_ids: Vec<String>,
    },
    RespondToReaction {
        match_id: MatchId,
        player_id: PlayerId,
        pass: bool,
    },
}

impl Command {
    pub fn family(&self) -> CommandFamily {
        match self {
            Command::PlayCard { .. } => CommandFamily::PlayCard,
            Command::MoveUnit { .. } => CommandFamily::MoveUnit,
            Command::NextPhase { .. } => CommandFamily::AdvancePhase,
            Command::ConcedeMatch { .. } => CommandFamily::Concede,
            Command::SubmitMulligan { .. } => CommandFamily::Mulligan,
            Command::SelectBattlefield { .. } => CommandFamily::Battlefield,
            Command::SubmitInitiativeChoice { .. } => CommandFamily::Initiative,
            Command::SubmitTargetSelection { .. } | Command::SubmitDiscardSelection { .. } => {
                CommandFamily::PromptSelection
            }
            Command::RespondToReaction { .. } => CommandFamily::Reaction,
        }
    }

    pub fn match_id(&self) -> &MatchId {
        match self {
            Command::PlayCard { match_id, .. }
            | Command::MoveUnit { match_id, .. }
            | Command::NextPhase { match_id, .. }
            | Command::ConcedeMatch { match_id, .. }
            | Command::SubmitMulligan { match_id, .. }
            | Command::SelectBattlefield { match_id, .. }
            | Command::SubmitInitiativeChoice { match_id, .. }
            | Command::SubmitTargetSelection { match_id, .. }
            | Command::SubmitDiscardSelection { match_id, .. }
            | Command::RespondToReaction { match_id, .. } => match_id,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        match self {
            Command::PlayCard { player_id, .. }
            | Command::MoveUnit { player_id, .. }
            | Command::NextPhase { player_id, .. }
            | Command::ConcedeMatch { player_id, .. }
            | Command::SubmitMulligan { player_id, .. }
            | Command::SelectBattlefield { player_id, .. }
            | Command::SubmitInitiativeChoice { player_id, .. }
            | Command::SubmitTargetSelection { player_id, .. }
            | Command::SubmitDiscardSelection { player_id, .. }
            | Command::RespondToReaction { player_id, .. } => player_id,
        }
    }

    /// Prompt this command answers, if it is addressed by prompt id
    pub fn prompt_id(&self) -> Option<&PromptId> {
        match self {
            Command::SubmitTargetSelection { prompt_id, .. }
            | Command::SubmitDiscardSelection { prompt_id, .. } => Some(prompt_id),
            _ => None,
        }
    }
}

/// Acknowledgement of a command
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandAck {
    pub fn ok() -> Self {
        CommandAck {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        CommandAck {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// The authoritative match service
///
/// Implementations are driven from a single thread; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait MatchService {
    /// Observer-scoped pull
    async fn fetch_match(&self, match_id: &MatchId) -> Result<MatchView>;

    /// Self-scoped pull (includes the player's own hand)
    async fn fetch_player_view(&self, match_id: &MatchId, player_id: &PlayerId) -> Result<MatchView>;

    /// Observer-scoped push subscription
    fn subscribe_match(&self, match_id: &MatchId) -> Result<PushStream>;

    /// Self-scoped push subscription
    fn subscribe_player_view(&self, match_id: &MatchId, player_id: &PlayerId) -> Result<PushStream>;

    /// Apply a player action
    async fn send(&self, command: &Command) -> Result<CommandAck>;
}

impl<T: MatchService> MatchService for Rc<T> {
    async fn fetch_match(&self, match_id: &MatchId) -> Result<MatchView> {
        (**self).fetch_match(match_id).await
    }

    async fn fetch_player_view(&self, match_id: &MatchId, player_id: &PlayerId) -> Result<MatchView> {
        (**self).fetch_player_view(match_id, player_id).await
    }

    fn subscribe_match(&self, match_id: &MatchId) -> Result<PushStream> {
        (**self).subscribe_match(match_id)
    }

    fn subscribe_player_view(&self, match_id: &MatchId, player_id: &PlayerId) -> Result<PushStream> {
        (**self).subscribe_player_view(match_id, player_id)
    }

    async fn send(&self, command: &Command) -> Result<CommandAck> {
        (**self).send(command).await
    }
}
