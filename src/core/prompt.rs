//! Pending decisions and the initiative duel options

use crate::core::{BattlefieldId, PlayerId, PromptId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection maximum used when a prompt payload does not declare one
pub const DEFAULT_MAX_SELECTIONS: usize = 2;

/// Decision categories the client knows how to present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Initiative duel (three-option opening decision)
    CoinFlip,
    /// Choosing which battlefield to bring into the match
    BattlefieldDraft,
    Mulligan,
    DiscardSelection,
    TargetSelection,
    /// Accept/pass inside a priority window
    ReactionResponse,
}

impl PromptKind {
    /// Wire tag used by the match service
    pub fn tag(&self) -> &'static str {
        match self {
            PromptKind::CoinFlip => "coin_flip",
            PromptKind::BattlefieldDraft => "battlefield_selection",
            PromptKind::Mulligan => "mulligan",
            PromptKind::DiscardSelection => "discard_selection",
            PromptKind::TargetSelection => "target_selection",
            PromptKind::ReactionResponse => "reaction_response",
        }
    }

    /// Parse a wire tag; unknown tags yield `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "coin_flip" => Some(PromptKind::CoinFlip),
            "battlefield_selection" => Some(PromptKind::BattlefieldDraft),
            "mulligan" => Some(PromptKind::Mulligan),
            "discard_selection" => Some(PromptKind::DiscardSelection),
            "target_selection" => Some(PromptKind::TargetSelection),
            "reaction_response" => Some(PromptKind::ReactionResponse),
            _ => None,
        }
    }

    /// Does an unresolved prompt of this kind block ordinary game actions?
    pub fn blocks_actions(&self) -> bool {
        matches!(self, PromptKind::Mulligan | PromptKind::BattlefieldDraft)
    }

    /// Does this prompt take a multi-select answer?
    pub fn is_multi_select(&self) -> bool {
        matches!(
            self,
            PromptKind::Mulligan | PromptKind::DiscardSelection | PromptKind::TargetSelection
        )
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PromptKind::CoinFlip => "initiative duel",
            PromptKind::BattlefieldDraft => "battlefield selection",
            PromptKind::Mulligan => "mulligan",
            PromptKind::DiscardSelection => "discard",
            PromptKind::TargetSelection => "target selection",
            PromptKind::ReactionResponse => "reaction",
        };
        write!(f, "{label}")
    }
}

/// A pending decision owned by one player
///
/// The type stays a raw string on the wire so that tags this client does not
/// know still deserialize; such prompts are simply never presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub id: PromptId,

    #[serde(rename = "type")]
    pub prompt_type: String,

    pub owner_player_id: PlayerId,

    #[serde(default)]
    pub payload: serde_json::Value,

    #[serde(default)]
    pub resolved: bool,
}

impl Prompt {
    pub fn new(id: impl Into<PromptId>, kind: PromptKind, owner: impl Into<PlayerId>) -> Self {
        Prompt {
            id: id.into(),
            prompt_type: kind.tag().to_string(),
            owner_player_id: owner.into(),
            payload: serde_json::Value::Null,
            resolved: false,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Known kind, or `None` for tags this client does not understand
    pub fn kind(&self) -> Option<PromptKind> {
        PromptKind::from_tag(&self.prompt_type)
    }

    pub fn is_pending_for(&self, player: &PlayerId) -> bool {
        !self.resolved && &self.owner_player_id == player
    }

    /// Server-declared selection maximum (`maxSelections`)
    ///
    /// `None` when the payload has no usable integer there; the caller picks
    /// the default.
    pub fn max_selections(&self) -> Option<usize> {
        self.payload
            .get("maxSelections")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
    }

    /// Selectable ids offered by discard/target prompts (`options`)
    pub fn options(&self) -> Vec<String> {
        string_array(&self.payload, "options")
    }

    /// Battlefields offered by a battlefield draft (`battlefieldIds`)
    pub fn battlefield_choices(&self) -> Vec<BattlefieldId> {
        string_array(&self.payload, "battlefieldIds")
            .into_iter()
            .map(BattlefieldId::from)
            .collect()
    }

    /// Short description of what opened a reaction prompt (`trigger`)
    pub fn trigger(&self) -> Option<&str> {
        self.payload.get("trigger").and_then(|v| v.as_str())
    }
}

fn string_array(payload: &serde_json::Value, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The three symmetric initiative duel options
///
/// `Blade` beats `Bow`, `Bow` beats `Shield`, `Shield` beats `Blade`.
/// The outcome is decided by the match service; the client only needs the
/// relation to explain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum InitiativeChoice {
    Blade = 0,
    Bow = 1,
    Shield = 2,
}

impl InitiativeChoice {
    pub const ALL: [InitiativeChoice; 3] = [
        InitiativeChoice::Blade,
        InitiativeChoice::Bow,
        InitiativeChoice::Shield,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(InitiativeChoice::Blade),
            1 => Some(InitiativeChoice::Bow),
            2 => Some(InitiativeChoice::Shield),
            _ => None,
        }
    }

    /// Does `self` win against `other`?
    pub fn beats(self, other: InitiativeChoice) -> bool {
        (self.value() + 1) % 3 == other.value()
    }

    /// The option this one loses to
    pub fn beaten_by(self) -> InitiativeChoice {
        InitiativeChoice::ALL[((self.value() + 2) % 3) as usize]
    }
}

impl From<InitiativeChoice> for u8 {
    fn from(choice: InitiativeChoice) -> u8 {
        choice.value()
    }
}

impl TryFrom<u8> for InitiativeChoice {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        InitiativeChoice::from_value(value)
            .ok_or_else(|| format!("invalid initiative choice {value} (expected 0, 1 or 2)"))
    }
}

impl fmt::Display for InitiativeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitiativeChoice::Blade => write!(f, "Blade"),
            InitiativeChoice::Bow => write!(f, "Bow"),
            InitiativeChoice::Shield => write!(f, "Shield"),
        }
    }
}

impl std::str::FromStr for InitiativeChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blade" | "0" => Ok(InitiativeChoice::Blade),
            "bow" | "1" => Ok(InitiativeChoice::Bow),
            "shield" | "2" => Ok(InitiativeChoice::Shield),
            _ => Err(format!(
                "invalid initiative choice '{s}' (expected: blade/0, bow/1, shield/2)"
            )),
        }
    }
}
