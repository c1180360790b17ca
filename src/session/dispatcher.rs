//! Command gating and in-flight bookkeeping
//!
//! Every command belongs to a [`CommandFamily`]. While a command of a family
//! is outstanding, further commands of that family are rejected locally
//! without touching the network. Entries carry the session generation that
//! issued them so a completion arriving after a match switch cannot release
//! a guard it does not own.

use crate::core::{MatchId, MatchView, PlayerId, PromptKind};
use crate::service::CommandFamily;
use rustc_hash::FxHashMap;
use std::fmt;

/// Why a game action is not allowed right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateReason {
    /// No authoritative state yet (or the session failed)
    NotLoaded,
    /// The session has no viewing player
    Spectating,
    /// Match is completed or abandoned
    NotLive,
    /// Match has not reached the in-progress phase
    NotInProgress,
    /// Service says the viewer cannot act
    CannotAct,
    /// A mulligan or battlefield draft must be answered first
    BlockingPrompt(PromptKind),
}

impl fmt::Display for GateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateReason::NotLoaded => write!(f, "Match is still loading"),
            GateReason::Spectating => write!(f, "Spectators cannot act"),
            GateReason::NotLive => write!(f, "Match is over"),
            GateReason::NotInProgress => write!(f, "Match has not started"),
            GateReason::CannotAct => write!(f, "Not your turn"),
            GateReason::BlockingPrompt(kind) => write!(f, "Resolve the {kind} first"),
        }
    }
}

/// Local refusal to dispatch; no network call was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A command of this family is still outstanding
    InFlight(CommandFamily),
    Gate(GateReason),
    /// Move requested without a selected unit
    NoSelection,
    /// The selected unit cannot go there
    InvalidDestination,
    /// The answered prompt is not the active, pending one
    PromptNotActive,
    /// Card index outside the viewer's hand
    NoSuchCard(usize),
    /// Answer not among the options the prompt offers
    InvalidChoice,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InFlight(family) => write!(f, "Already sending {family}"),
            Rejection::Gate(reason) => write!(f, "{reason}"),
            Rejection::NoSelection => write!(f, "Select a unit first"),
            Rejection::InvalidDestination => write!(f, "Unit cannot move there"),
            Rejection::PromptNotActive => write!(f, "Nothing to answer"),
            Rejection::NoSuchCard(index) => write!(f, "No card at hand position {index}"),
            Rejection::InvalidChoice => write!(f, "Not one of the offered choices"),
        }
    }
}

/// How a dispatch attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The service accepted the command
    Succeeded,
    /// Refused locally
    Rejected(Rejection),
    /// The service refused it or the round trip failed
    Failed(String),
    /// Completed after the session moved on; state left untouched
    Stale,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Succeeded)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DispatchOutcome::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

/// Gating rules a command family is subject to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Play, move, next phase
    Game,
    /// Answers to prompts
    PromptResponse,
    Concede,
}

impl ActionClass {
    pub fn of(family: CommandFamily) -> Self {
        match family {
            CommandFamily::PlayCard | CommandFamily::MoveUnit | CommandFamily::AdvancePhase => {
                ActionClass::Game
            }
            CommandFamily::Concede => ActionClass::Concede,
            CommandFamily::Mulligan
            | CommandFamily::Battlefield
            | CommandFamily::Initiative
            | CommandFamily::PromptSelection
            | CommandFamily::Reaction => ActionClass::PromptResponse,
        }
    }
}

/// Check whether `viewer` may issue a command of `class` against `view`
///
/// Prompt responses only need a live match here; whether the prompt itself
/// is pending is the resolver's call.
pub fn check_gate(
    class: ActionClass,
    view: Option<&MatchView>,
    viewer: Option<&PlayerId>,
) -> Result<(), GateReason> {
    let view = view.ok_or(GateReason::NotLoaded)?;
    let viewer = viewer.ok_or(GateReason::Spectating)?;
    if !view.status.is_live() {
        return Err(GateReason::NotLive);
    }
    if class != ActionClass::Game {
        return Ok(());
    }

    if !view.is_in_progress() {
        return Err(GateReason::NotInProgress);
    }
    let me = view.player(viewer).ok_or(GateReason::Spectating)?;
    if !me.can_act {
        return Err(GateReason::CannotAct);
    }
    let blocking = view
        .pending_prompts()
        .filter(|p| &p.owner_player_id == viewer)
        .filter_map(|p| p.kind())
        .find(|k| k.blocks_actions());
    if let Some(kind) = blocking {
        return Err(GateReason::BlockingPrompt(kind));
    }
    Ok(())
}

/// Outstanding command families, tagged with the issuing generation
#[derive(Debug, Clone, Default)]
pub struct InFlightTable {
    entries: FxHashMap<CommandFamily, u64>,
}

impl InFlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `family` for `generation`
    pub fn try_acquire(&mut self, family: CommandFamily, generation: u64) -> Result<(), Rejection> {
        if self.entries.contains_key(&family) {
            return Err(Rejection::InFlight(family));
        }
        self.entries.insert(family, generation);
        Ok(())
    }

    /// Release `family` if it is still held by `generation`
    pub fn release(&mut self, family: CommandFamily, generation: u64) -> bool {
        if self.entries.get(&family) == Some(&generation) {
            self.entries.remove(&family);
            true
        } else {
            false
        }
    }

    pub fn is_in_flight(&self, family: CommandFamily) -> bool {
        self.entries.contains_key(&family)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything (match switch or close)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Proof that the viewer asked to concede
///
/// Obtained from `MatchSession::request_concede` and consumed by
/// `MatchSession::confirm_concede`. Not cloneable, so one request yields at
/// most one concede.
#[derive(Debug, PartialEq, Eq)]
pub struct ConcedeConfirmation {
    pub(crate) match_id: MatchId,
    pub(crate) generation: u64,
}

impl ConcedeConfirmation {
    pub(crate) fn new(match_id: MatchId, generation: u64) -> Self {
        ConcedeConfirmation {
            match_id,
            generation,
        }
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }
}
