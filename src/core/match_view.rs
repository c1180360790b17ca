//! Authoritative match state as emitted by the match service
//!
//! A `MatchView` is created and replaced by the match service only. The client
//! never patches one in place: every pull or push delivers a complete new
//! value, which the session stores behind an `Arc`.

use crate::core::{BattlefieldId, CardInstance, MatchId, PlayerId, PlayerState, Prompt};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for participants
    Waiting,
    /// Opening decisions (initiative, battlefields, mulligans)
    Setup,
    InProgress,
    Completed,
    Abandoned,
    #[serde(other)]
    Unknown,
}

impl MatchStatus {
    /// Is the match still being played (setup included)?
    pub fn is_live(&self) -> bool {
        matches!(self, MatchStatus::Setup | MatchStatus::InProgress)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Abandoned)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchStatus::Waiting => "waiting",
            MatchStatus::Setup => "setup",
            MatchStatus::InProgress => "in progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Abandoned => "abandoned",
            MatchStatus::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Reactive sub-phase in which one participant holds the right to act
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityWindow {
    pub holder_player_id: PlayerId,
    /// What opened the window (e.g. "spell_cast", "showdown")
    #[serde(default)]
    pub trigger: String,
}

/// A battlefield in play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battlefield {
    pub battlefield_id: BattlefieldId,
    pub owner_id: PlayerId,
    /// Unset until a conquest resolves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<PlayerId>,
    #[serde(default)]
    pub contested_by: Vec<PlayerId>,
    pub card: CardInstance,
}

/// Control state of a battlefield, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlefieldControl {
    Unclaimed,
    Controlled,
    Contested,
}

impl Battlefield {
    pub fn is_unclaimed(&self) -> bool {
        self.controller.is_none()
    }

    pub fn is_contested(&self) -> bool {
        !self.contested_by.is_empty()
    }

    pub fn is_controlled_by(&self, player: &PlayerId) -> bool {
        self.controller.as_ref() == Some(player)
    }

    pub fn control(&self) -> BattlefieldControl {
        if self.is_contested() {
            BattlefieldControl::Contested
        } else if self.is_unclaimed() {
            BattlefieldControl::Unclaimed
        } else {
            BattlefieldControl::Controlled
        }
    }
}

/// Combat in progress on a battlefield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatContext {
    pub battlefield_id: BattlefieldId,
    pub attacker_id: PlayerId,
    pub defender_id: PlayerId,
}

/// Complete authoritative state of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub match_id: MatchId,

    pub status: MatchStatus,

    /// Phase label owned by the match service
    #[serde(default)]
    pub phase: String,

    #[serde(default)]
    pub turn_number: u32,

    /// One entry per participant, stable order for the whole match
    pub players: Vec<PlayerState>,

    #[serde(default)]
    pub prompts: Vec<Prompt>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_window: Option<PriorityWindow>,

    #[serde(default)]
    pub battlefields: Vec<Battlefield>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatContext>,
}

impl MatchView {
    pub fn new(match_id: impl Into<MatchId>, status: MatchStatus, players: Vec<PlayerState>) -> Self {
        MatchView {
            match_id: match_id.into(),
            status,
            phase: String::new(),
            turn_number: 0,
            players,
            prompts: Vec::new(),
            priority_window: None,
            battlefields: Vec::new(),
            combat: None,
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.player_id == id)
    }

    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.player(id).is_some()
    }

    /// Every participant except `id`, in match order
    pub fn opponents_of<'a>(&'a self, id: &'a PlayerId) -> impl Iterator<Item = &'a PlayerState> {
        self.players.iter().filter(move |p| &p.player_id != id)
    }

    pub fn battlefield(&self, id: &BattlefieldId) -> Option<&Battlefield> {
        self.battlefields.iter().find(|b| &b.battlefield_id == id)
    }

    /// Unresolved prompts, in service order
    pub fn pending_prompts(&self) -> impl Iterator<Item = &Prompt> {
        self.prompts.iter().filter(|p| !p.resolved)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == MatchStatus::InProgress
    }

    /// Does `id` hold the current priority window?
    pub fn holds_priority(&self, id: &PlayerId) -> bool {
        self.priority_window
            .as_ref()
            .is_some_and(|w| &w.holder_player_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "matchId": "m-1",
            "status": "in_progress",
            "phase": "action",
            "turnNumber": 3,
            "players": [
                {"playerId": "p1", "name": "Alice", "victoryPoints": 2, "canAct": true},
                {"playerId": "p2", "name": "Bob", "handSize": 4}
            ],
            "prompts": [
                {"id": "pr-1", "type": "mulligan", "ownerPlayerId": "p2", "resolved": true}
            ],
            "priorityWindow": {"holderPlayerId": "p1", "trigger": "spell_cast"},
            "battlefields": [
                {
                    "battlefieldId": "bf-1",
                    "ownerId": "p1",
                    "contestedBy": ["p2"],
                    "card": {"instanceId": "bf-card-1", "cardId": "OGN-275"}
                }
            ]
        })
    }

    #[test]
    fn test_match_view_from_wire() {
        let view: MatchView = serde_json::from_value(sample_json()).unwrap();

        assert_eq!(view.match_id.as_str(), "m-1");
        assert!(view.is_in_progress());
        assert_eq!(view.turn_number, 3);
        assert_eq!(view.players.len(), 2);
        assert!(view.holds_priority(&PlayerId::new("p1")));
        assert_eq!(view.pending_prompts().count(), 0);
        assert!(view.combat.is_none());

        let bf = view.battlefield(&BattlefieldId::new("bf-1")).unwrap();
        assert!(bf.is_unclaimed());
        assert_eq!(bf.control(), BattlefieldControl::Contested);
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let mut raw = sample_json();
        raw["status"] = json!("paused");
        let view: MatchView = serde_json::from_value(raw).unwrap();
        assert_eq!(view.status, MatchStatus::Unknown);
        assert!(!view.status.is_live());
    }

    #[test]
    fn test_opponents_keep_match_order() {
        let view = MatchView::new(
            "m-2",
            MatchStatus::InProgress,
            vec![
                PlayerState::new("p1", "A"),
                PlayerState::new("p2", "B"),
                PlayerState::new("p3", "C"),
            ],
        );
        let me = PlayerId::new("p2");
        let names: Vec<_> = view.opponents_of(&me).map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_battlefield_control() {
        let mut bf = Battlefield {
            battlefield_id: BattlefieldId::new("bf-2"),
            owner_id: PlayerId::new("p1"),
            controller: None,
            contested_by: Vec::new(),
            card: CardInstance::new("bf-card-2", "OGN-280", "Altar"),
        };
        assert_eq!(bf.control(), BattlefieldControl::Unclaimed);

        bf.controller = Some(PlayerId::new("p2"));
        assert_eq!(bf.control(), BattlefieldControl::Controlled);
        assert!(bf.is_controlled_by(&PlayerId::new("p2")));
    }
}
