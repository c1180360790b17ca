//! Display-ready derivations of the authoritative match state

pub mod scope;
pub mod slots;

pub use scope::{project, Scope, ScopedView};
pub use slots::{
    exclude, extract_special_units, graveyard_window, rune_slots, units_on_battlefield,
    BoardListing, GraveyardWindow, RuneSlots, DEFAULT_GRAVEYARD_WINDOW, RUNE_SLOT_COUNT,
};
