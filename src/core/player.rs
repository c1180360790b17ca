//! Per-participant state

use crate::core::{CardInstance, InstanceId, ManaPool, PlayerId, ResourcePool};
use serde::{Deserialize, Serialize};

/// A player's permanents, split into the three fixed categories
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Combat units (legends and leaders included)
    #[serde(default)]
    pub units: Vec<CardInstance>,
    #[serde(default)]
    pub gear: Vec<CardInstance>,
    #[serde(default)]
    pub enchantments: Vec<CardInstance>,
}

impl Board {
    pub fn unit(&self, id: &InstanceId) -> Option<&CardInstance> {
        self.units.iter().find(|u| &u.instance_id == id)
    }

    pub fn has_unit(&self, id: &InstanceId) -> bool {
        self.unit(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.units.len() + self.gear.len() + self.enchantments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// State of one participant
///
/// Visibility is asymmetric: `hand` is only populated for the viewing player.
/// For everybody else only `hand_size` is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub player_id: PlayerId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub victory_points: u32,

    #[serde(default)]
    pub mana_pool: ManaPool,

    #[serde(default)]
    pub board: Board,

    #[serde(default)]
    pub graveyard: Vec<CardInstance>,

    #[serde(default)]
    pub exile: Vec<CardInstance>,

    /// Channeled runes, unordered, 0..=12 entries
    #[serde(default)]
    pub channeled_runes: Vec<CardInstance>,

    #[serde(default)]
    pub resources: ResourcePool,

    /// Full hand contents; `None` whenever this record is not the viewer's own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<CardInstance>>,

    #[serde(default)]
    pub hand_size: u32,

    #[serde(default)]
    pub deck_size: u32,

    /// Does this player currently hold the right to act?
    #[serde(default)]
    pub can_act: bool,
}

impl PlayerState {
    pub fn new(player_id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        PlayerState {
            player_id: player_id.into(),
            name: name.into(),
            victory_points: 0,
            mana_pool: ManaPool::default(),
            board: Board::default(),
            graveyard: Vec::new(),
            exile: Vec::new(),
            channeled_runes: Vec::new(),
            resources: ResourcePool::default(),
            hand: None,
            hand_size: 0,
            deck_size: 0,
            can_act: false,
        }
    }

    /// Hand contents, empty when hidden
    pub fn hand_cards(&self) -> &[CardInstance] {
        self.hand.as_deref().unwrap_or(&[])
    }

    /// Hand size, preferring the visible contents when present
    pub fn visible_hand_size(&self) -> u32 {
        match &self.hand {
            Some(cards) => cards.len() as u32,
            None => self.hand_size,
        }
    }

    /// Strip hand contents, keeping only the count
    pub fn redact_hand(&mut self) {
        self.hand_size = self.visible_hand_size();
        self.hand = None;
    }

    pub fn is_hand_hidden(&self) -> bool {
        self.hand.is_none()
    }
}
