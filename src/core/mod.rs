//! Match state types as reported by the match service

pub mod card;
pub mod mana;
pub mod match_view;
pub mod player;
pub mod prompt;
pub mod types;

pub use card::{CardInstance, CardLocation, Zone, LEADER_TAG, LEGEND_TAG};
pub use mana::{ManaPool, ResourcePool};
pub use match_view::{
    Battlefield, BattlefieldControl, CombatContext, MatchStatus, MatchView, PriorityWindow,
};
pub use player::{Board, PlayerState};
pub use prompt::{InitiativeChoice, Prompt, PromptKind, DEFAULT_MAX_SELECTIONS};
pub use types::{
    BattlefieldId, CardId, Destination, InstanceId, MatchId, PlayerId, PromptId, BASE_DESTINATION,
};
