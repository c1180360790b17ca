//! Fixed-shape display structures derived from raw match collections
//!
//! Everything in here is a pure function of its input: no session state, no
//! allocation beyond the returned value.

use crate::core::{BattlefieldId, Board, CardInstance, InstanceId, MatchView, PlayerId};
use rustc_hash::FxHashSet;

/// Number of rune positions shown for every player
pub const RUNE_SLOT_COUNT: usize = 12;

/// Graveyard cards shown before the rest are collapsed
pub const DEFAULT_GRAVEYARD_WINDOW: usize = 5;

/// Twelve positional rune slots
///
/// Always exactly [`RUNE_SLOT_COUNT`] entries. Position `i` holds the i-th
/// channeled rune, or `None` past the owner's rune count. Extra runes beyond
/// twelve are not shown.
#[derive(Debug, Clone, PartialEq)]
pub struct RuneSlots<'a> {
    slots: [Option<&'a CardInstance>; RUNE_SLOT_COUNT],
}

impl<'a> RuneSlots<'a> {
    pub fn from_runes(runes: &'a [CardInstance]) -> Self {
        let mut slots = [None; RUNE_SLOT_COUNT];
        for (slot, rune) in slots.iter_mut().zip(runes.iter()) {
            *slot = Some(rune);
        }
        RuneSlots { slots }
    }

    pub fn slots(&self) -> &[Option<&'a CardInstance>; RUNE_SLOT_COUNT] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&'a CardInstance> {
        self.slots.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled() == 0
    }

    /// Number of occupied positions
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'a CardInstance>> + '_ {
        self.slots.iter().copied()
    }
}

/// Build the rune grid for a channeled-rune list
pub fn rune_slots(runes: &[CardInstance]) -> RuneSlots<'_> {
    RuneSlots::from_runes(runes)
}

/// Board split into dedicated special slots and generic listings
///
/// The legend and the leader are shown in their own slots and never appear in
/// the generic `units`/`gear`/`enchantments` lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardListing<'a> {
    pub legend: Option<&'a CardInstance>,
    pub leader: Option<&'a CardInstance>,
    pub units: Vec<&'a CardInstance>,
    pub gear: Vec<&'a CardInstance>,
    pub enchantments: Vec<&'a CardInstance>,
}

impl<'a> BoardListing<'a> {
    /// Instance ids pulled into the dedicated slots
    pub fn special_ids(&self) -> FxHashSet<&'a InstanceId> {
        self.legend
            .iter()
            .chain(self.leader.iter())
            .map(|c| &c.instance_id)
            .collect()
    }
}

/// Split a board into legend/leader slots and generic listings
///
/// The first object carrying each tag wins its slot. An object tagged both
/// legend and leader fills the legend slot only.
pub fn extract_special_units(board: &Board) -> BoardListing<'_> {
    let all = board
        .units
        .iter()
        .chain(board.gear.iter())
        .chain(board.enchantments.iter());

    let mut legend = None;
    let mut leader = None;
    for card in all {
        if legend.is_none() && card.is_legend() {
            legend = Some(card);
        } else if leader.is_none() && card.is_leader() && !card.is_legend() {
            leader = Some(card);
        }
    }

    let mut excluded: FxHashSet<&InstanceId> = FxHashSet::default();
    excluded.extend(legend.map(|c| &c.instance_id));
    excluded.extend(leader.map(|c| &c.instance_id));

    BoardListing {
        legend,
        leader,
        units: exclude(&board.units, &excluded),
        gear: exclude(&board.gear, &excluded),
        enchantments: exclude(&board.enchantments, &excluded),
    }
}

/// Cards whose instance id is not in `excluded`, in original order
pub fn exclude<'a>(cards: &'a [CardInstance], excluded: &FxHashSet<&InstanceId>) -> Vec<&'a CardInstance> {
    cards
        .iter()
        .filter(|c| !excluded.contains(&c.instance_id))
        .collect()
}

/// Most recent graveyard cards plus a count of the collapsed remainder
#[derive(Debug, Clone, PartialEq)]
pub struct GraveyardWindow<'a> {
    /// Newest first
    pub recent: Vec<&'a CardInstance>,
    pub hidden: usize,
}

/// Show the last `size` graveyard cards, newest first
///
/// The graveyard list is ordered oldest to newest.
pub fn graveyard_window(graveyard: &[CardInstance], size: usize) -> GraveyardWindow<'_> {
    let shown = size.min(graveyard.len());
    GraveyardWindow {
        recent: graveyard.iter().rev().take(shown).collect(),
        hidden: graveyard.len() - shown,
    }
}

/// Units standing on a battlefield, grouped by owner in match order
pub fn units_on_battlefield<'a>(
    view: &'a MatchView,
    battlefield: &BattlefieldId,
) -> Vec<(&'a PlayerId, Vec<&'a CardInstance>)> {
    view.players
        .iter()
        .map(|p| {
            let units = p
                .board
                .units
                .iter()
                .filter(|u| u.battlefield_id() == Some(battlefield))
                .collect::<Vec<_>>();
            (&p.player_id, units)
        })
        .filter(|(_, units)| !units.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardLocation, MatchStatus, PlayerState};

    fn runes(n: usize) -> Vec<CardInstance> {
        (0..n)
            .map(|i| CardInstance::new(format!("r-{i}"), "RUNE-FURY", "Fury Rune"))
            .collect()
    }

    #[test]
    fn test_rune_slots_always_twelve() {
        for n in 0..=RUNE_SLOT_COUNT {
            let list = runes(n);
            let slots = rune_slots(&list);
            assert_eq!(slots.len(), RUNE_SLOT_COUNT);
            assert_eq!(slots.filled(), n);
            for i in 0..RUNE_SLOT_COUNT {
                if i < n {
                    assert_eq!(slots.get(i).map(|r| r.instance_id.as_str()), Some(format!("r-{i}").as_str()));
                } else {
                    assert!(slots.get(i).is_none(), "slot {i} should be empty for {n} runes");
                }
            }
        }
    }

    #[test]
    fn test_rune_slots_truncate_overflow() {
        let list = runes(15);
        let slots = rune_slots(&list);
        assert_eq!(slots.len(), RUNE_SLOT_COUNT);
        assert_eq!(slots.filled(), RUNE_SLOT_COUNT);
        assert!(slots.get(12).is_none());
    }

    #[test]
    fn test_special_units_excluded_from_listing() {
        let board = Board {
            units: vec![
                CardInstance::new("u-1", "OGN-001", "Jinx").with_tag("leader"),
                CardInstance::new("u-2", "OGN-002", "Recruit"),
            ],
            gear: vec![CardInstance::new("g-1", "OGN-003", "Blade")],
            enchantments: vec![CardInstance::new("l-1", "OGN-004", "Loose Cannon").with_tag("legend")],
        };

        let listing = extract_special_units(&board);

        assert_eq!(listing.leader.map(|c| c.instance_id.as_str()), Some("u-1"));
        assert_eq!(listing.legend.map(|c| c.instance_id.as_str()), Some("l-1"));
        assert_eq!(listing.units.len(), 1);
        assert_eq!(listing.units[0].instance_id.as_str(), "u-2");
        assert_eq!(listing.gear.len(), 1);
        assert!(listing.enchantments.is_empty());
        assert_eq!(listing.special_ids().len(), 2);
    }

    #[test]
    fn test_no_specials_keeps_everything() {
        let board = Board {
            units: vec![CardInstance::new("u-1", "OGN-002", "Recruit")],
            ..Board::default()
        };
        let listing = extract_special_units(&board);
        assert!(listing.legend.is_none());
        assert!(listing.leader.is_none());
        assert_eq!(listing.units.len(), 1);
    }

    #[test]
    fn test_graveyard_window() {
        let yard: Vec<_> = (0..8)
            .map(|i| CardInstance::new(format!("d-{i}"), "OGN-010", "Fallen"))
            .collect();

        let window = graveyard_window(&yard, 3);
        let ids: Vec<_> = window.recent.iter().map(|c| c.instance_id.as_str()).collect();
        assert_eq!(ids, vec!["d-7", "d-6", "d-5"]);
        assert_eq!(window.hidden, 5);

        let small = graveyard_window(&yard[..2], DEFAULT_GRAVEYARD_WINDOW);
        assert_eq!(small.recent.len(), 2);
        assert_eq!(small.hidden, 0);

        let empty = graveyard_window(&[], DEFAULT_GRAVEYARD_WINDOW);
        assert!(empty.recent.is_empty());
    }

    #[test]
    fn test_units_on_battlefield() {
        let mut p1 = PlayerState::new("p1", "A");
        p1.board.units = vec![
            CardInstance::new("u-1", "OGN-001", "Scout").with_location(CardLocation::battlefield("bf-1")),
            CardInstance::new("u-2", "OGN-001", "Scout"),
        ];
        let mut p2 = PlayerState::new("p2", "B");
        p2.board.units = vec![CardInstance::new("u-3", "OGN-005", "Brute")
            .with_location(CardLocation::battlefield("bf-2"))];
        let view = MatchView::new("m-1", MatchStatus::InProgress, vec![p1, p2]);

        let on_bf1 = units_on_battlefield(&view, &BattlefieldId::new("bf-1"));
        assert_eq!(on_bf1.len(), 1);
        assert_eq!(on_bf1[0].0.as_str(), "p1");
        assert_eq!(on_bf1[0].1.len(), 1);
    }
}
