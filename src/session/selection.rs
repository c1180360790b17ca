//! Board unit selection for movement

use crate::core::{CardInstance, Destination, InstanceId, PlayerState};

/// Result of a selection toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected,
    Deselected,
    /// Not one of the viewer's units; nothing changed
    Ignored,
}

/// At most one selected unit of the viewing player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSelection {
    selected: Option<InstanceId>,
}

impl UnitSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&InstanceId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &InstanceId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Select `id`, or deselect it if it is already selected
    ///
    /// Only units in `me.board.units` are selectable; gear and enchantments
    /// never are.
    pub fn toggle(&mut self, me: &PlayerState, id: &InstanceId) -> SelectionChange {
        if self.is_selected(id) {
            self.selected = None;
            return SelectionChange::Deselected;
        }
        if !me.board.has_unit(id) {
            return SelectionChange::Ignored;
        }
        self.selected = Some(id.clone());
        SelectionChange::Selected
    }

    /// The selected unit as it appears in `me`
    pub fn selected_unit<'a>(&self, me: &'a PlayerState) -> Option<&'a CardInstance> {
        self.selected.as_ref().and_then(|id| me.board.unit(id))
    }

    /// Is "return to base" available for the current selection?
    pub fn can_return_to_base(&self, me: &PlayerState) -> bool {
        self.selected_unit(me)
            .map(CardInstance::is_on_battlefield)
            .unwrap_or(false)
    }

    /// Can the selection be moved to `destination`?
    pub fn can_move_to(&self, me: &PlayerState, destination: &Destination) -> bool {
        match destination {
            Destination::Base => self.can_return_to_base(me),
            Destination::Battlefield(id) => self
                .selected_unit(me)
                .map(|u| u.battlefield_id() != Some(id))
                .unwrap_or(false),
        }
    }

    /// Drop the selection if the unit left the viewer's board
    ///
    /// Returns true if the selection was cleared.
    pub fn sync(&mut self, me: Option<&PlayerState>) -> bool {
        let Some(id) = &self.selected else {
            return false;
        };
        let present = me.map(|p| p.board.has_unit(id)).unwrap_or(false);
        if !present {
            self.selected = None;
        }
        !present
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
