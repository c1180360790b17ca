//! Player-scoped and observer-scoped projections of a match
//!
//! A projection is a redacted copy of the authoritative [`MatchView`]. Hands
//! of every player other than the viewer are stripped down to `hand_size`
//! even if the underlying state carried full card objects, so nothing hidden
//! can leak into the display layer through a projection.

use crate::core::{CardInstance, MatchView, PlayerId, PlayerState, Prompt};
use crate::view::slots::{
    extract_special_units, graveyard_window, rune_slots, BoardListing, GraveyardWindow, RuneSlots,
};
use crate::{Result, SessionError};
use std::sync::Arc;

/// Whose eyes a projection is built for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A participant: own hand visible, everyone else's hidden
    Player(PlayerId),
    /// A spectator: every hand hidden
    Observer,
}

impl Scope {
    pub fn viewer(&self) -> Option<&PlayerId> {
        match self {
            Scope::Player(id) => Some(id),
            Scope::Observer => None,
        }
    }
}

/// Redacted copy of `view` for `scope`
pub fn project(view: &MatchView, scope: &Scope) -> MatchView {
    let mut projected = view.clone();
    for player in projected.players.iter_mut() {
        if scope.viewer() != Some(&player.player_id) {
            player.redact_hand();
        }
    }
    projected
}

/// Read-only, already redacted view of a match for one scope
///
/// Cheap to clone: the redacted state sits behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedView {
    state: Arc<MatchView>,
    scope: Scope,
}

impl ScopedView {
    /// Self-scoped projection; fails if `viewer` is not a participant
    pub fn for_player(view: &MatchView, viewer: &PlayerId) -> Result<Self> {
        if !view.has_player(viewer) {
            return Err(SessionError::PlayerNotFound(viewer.to_string()));
        }
        let scope = Scope::Player(viewer.clone());
        Ok(ScopedView {
            state: Arc::new(project(view, &scope)),
            scope,
        })
    }

    /// Observer-scoped projection (all hands hidden)
    pub fn for_observer(view: &MatchView) -> Self {
        ScopedView {
            state: Arc::new(project(view, &Scope::Observer)),
            scope: Scope::Observer,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn viewer(&self) -> Option<&PlayerId> {
        self.scope.viewer()
    }

    /// The redacted match state
    pub fn state(&self) -> &MatchView {
        &self.state
    }

    /// The viewer's own record (full hand); `None` for observers
    pub fn me(&self) -> Option<&PlayerState> {
        self.viewer().and_then(|id| self.state.player(id))
    }

    /// Every other participant, hands redacted
    pub fn opponents(&self) -> Vec<&PlayerState> {
        match self.viewer() {
            Some(id) => self.state.opponents_of(id).collect(),
            None => self.state.players.iter().collect(),
        }
    }

    /// First opponent in match order (the only one in a duel)
    pub fn opponent(&self) -> Option<&PlayerState> {
        self.opponents().into_iter().next()
    }

    pub fn hand(&self) -> &[CardInstance] {
        self.me().map(|p| p.hand_cards()).unwrap_or(&[])
    }

    /// Does the viewer currently hold the action right?
    pub fn can_act(&self) -> bool {
        self.me().is_some_and(|p| p.can_act)
    }

    pub fn board_listing<'a>(&'a self, player: &'a PlayerState) -> BoardListing<'a> {
        extract_special_units(&player.board)
    }

    pub fn rune_slots<'a>(&'a self, player: &'a PlayerState) -> RuneSlots<'a> {
        rune_slots(&player.channeled_runes)
    }

    pub fn graveyard<'a>(&'a self, player: &'a PlayerState, size: usize) -> GraveyardWindow<'a> {
        graveyard_window(&player.graveyard, size)
    }

    /// Unresolved prompts owned by the viewer
    pub fn my_pending_prompts(&self) -> Vec<&Prompt> {
        match self.viewer() {
            Some(id) => self
                .state
                .pending_prompts()
                .filter(|p| &p.owner_player_id == id)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchStatus;

    fn full_hand(prefix: &str, n: usize) -> Vec<CardInstance> {
        (0..n)
            .map(|i| CardInstance::new(format!("{prefix}-{i}"), "OGN-100", "Card"))
            .collect()
    }

    /// Authoritative state in which the service leaked both hands
    fn leaky_match() -> MatchView {
        let mut p1 = PlayerState::new("p1", "Alice");
        p1.hand = Some(full_hand("a", 3));
        p1.can_act = true;
        let mut p2 = PlayerState::new("p2", "Bob");
        p2.hand = Some(full_hand("b", 5));
        MatchView::new("m-1", MatchStatus::InProgress, vec![p1, p2])
    }

    #[test]
    fn test_self_scope_hides_opponent_hand() {
        let view = ScopedView::for_player(&leaky_match(), &PlayerId::new("p1")).unwrap();

        assert_eq!(view.hand().len(), 3);
        assert!(view.can_act());

        let opp = view.opponent().unwrap();
        assert_eq!(opp.player_id.as_str(), "p2");
        assert!(opp.hand.is_none());
        assert!(opp.hand_cards().is_empty());
        assert_eq!(opp.hand_size, 5);
    }

    #[test]
    fn test_observer_scope_hides_every_hand() {
        let view = ScopedView::for_observer(&leaky_match());

        assert!(view.me().is_none());
        assert!(!view.can_act());
        assert_eq!(view.opponents().len(), 2);
        for player in &view.state().players {
            assert!(player.hand.is_none(), "{} hand leaked", player.player_id);
        }
        assert_eq!(view.state().players[0].hand_size, 3);
        assert_eq!(view.state().players[1].hand_size, 5);
    }

    #[test]
    fn test_projection_keeps_public_zones() {
        let mut state = leaky_match();
        state.players[1].graveyard = full_hand("gy", 2);
        state.players[1].board.units = full_hand("u", 1);

        let view = ScopedView::for_player(&state, &PlayerId::new("p1")).unwrap();
        let opp = view.opponent().unwrap();
        assert_eq!(opp.graveyard.len(), 2);
        assert_eq!(opp.board.units.len(), 1);
    }

    #[test]
    fn test_unknown_viewer_is_an_error() {
        let result = ScopedView::for_player(&leaky_match(), &PlayerId::new("p9"));
        assert!(matches!(result, Err(SessionError::PlayerNotFound(_))));
    }
}
