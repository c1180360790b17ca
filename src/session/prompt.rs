//! Prompt resolution state machine
//!
//! At most one prompt is presented to a viewer at a time: the highest
//! priority unresolved prompt they own, by [`PROMPT_PRIORITY`]. Prompts with
//! a type tag this client does not know are never presented.
//!
//! Each presented prompt moves between `Pending` and `Resolving`.
//! `Resolving` covers the command round trip and blocks resubmission. When
//! the command returns, accepted or not, the prompt is `Pending` again. Only
//! a push resolves it: once the service marks it `resolved` or stops listing
//! it, it is no longer presented. A push that still lists it unresolved (an
//! initiative duel rematch, possibly with an identical payload) leaves it
//! answerable.

use crate::core::{MatchView, PlayerId, Prompt, PromptId, PromptKind};
use smallvec::SmallVec;

/// Presentation order when several prompts are pending at once
pub const PROMPT_PRIORITY: [PromptKind; 6] = [
    PromptKind::CoinFlip,
    PromptKind::BattlefieldDraft,
    PromptKind::Mulligan,
    PromptKind::DiscardSelection,
    PromptKind::TargetSelection,
    PromptKind::ReactionResponse,
];

/// Position of `kind` in [`PROMPT_PRIORITY`] (0 = most urgent)
pub fn priority_rank(kind: PromptKind) -> usize {
    PROMPT_PRIORITY
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(PROMPT_PRIORITY.len())
}

/// Highest-priority unresolved prompt owned by `viewer`
///
/// Ties keep service order.
pub fn select_active<'a>(prompts: &'a [Prompt], viewer: &PlayerId) -> Option<&'a Prompt> {
    prompts
        .iter()
        .filter(|p| p.is_pending_for(viewer))
        .filter_map(|p| p.kind().map(|kind| (priority_rank(kind), p)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, p)| p)
}

/// What the prompt area shows for a viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptDisplay<'a> {
    Active(&'a Prompt),
    /// Nothing for the viewer, but another player still has to decide
    AwaitingOpponent,
    /// No pending prompts at all
    Idle,
}

pub fn prompt_display<'a>(view: &'a MatchView, viewer: &PlayerId) -> PromptDisplay<'a> {
    if let Some(prompt) = select_active(&view.prompts, viewer) {
        return PromptDisplay::Active(prompt);
    }
    let others_pending = view
        .pending_prompts()
        .any(|p| &p.owner_player_id != viewer && p.kind().is_some());
    if others_pending {
        PromptDisplay::AwaitingOpponent
    } else {
        PromptDisplay::Idle
    }
}

/// Local lifecycle of the presented prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPhase {
    Pending,
    /// Answer in flight
    Resolving,
}

/// Outcome of a multi-select toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Maximum reached; selection unchanged
    Full,
}

/// Bounded insertion-ordered selection set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelect<T> {
    selected: SmallVec<[T; 4]>,
    max: usize,
}

impl<T: PartialEq + Clone> MultiSelect<T> {
    pub fn new(max: usize) -> Self {
        MultiSelect {
            selected: SmallVec::new(),
            max,
        }
    }

    /// Remove `item` if selected, otherwise add it unless the set is full
    pub fn toggle(&mut self, item: T) -> Toggle {
        if let Some(pos) = self.selected.iter().position(|s| *s == item) {
            self.selected.remove(pos);
            Toggle::Removed
        } else if self.selected.len() >= self.max {
            Toggle::Full
        } else {
            self.selected.push(item);
            Toggle::Added
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.selected.contains(item)
    }

    pub fn selected(&self) -> &[T] {
        &self.selected
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.selected.to_vec()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

/// Prompt-local input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    /// Single-shot answers (initiative, battlefield, reaction)
    Single,
    /// Hand indices (mulligan)
    Indices(MultiSelect<usize>),
    /// Option ids (discard, target)
    Ids(MultiSelect<String>),
}

impl PromptInput {
    fn for_prompt(kind: PromptKind, prompt: &Prompt, default_max: usize) -> Self {
        let max = prompt.max_selections().unwrap_or(default_max);
        match kind {
            PromptKind::Mulligan => PromptInput::Indices(MultiSelect::new(max)),
            PromptKind::DiscardSelection | PromptKind::TargetSelection => {
                PromptInput::Ids(MultiSelect::new(max))
            }
            _ => PromptInput::Single,
        }
    }
}

/// The prompt currently presented, with its local state
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePrompt {
    pub prompt: Prompt,
    pub kind: PromptKind,
    pub phase: PromptPhase,
    pub input: PromptInput,
}

impl ActivePrompt {
    pub fn id(&self) -> &PromptId {
        &self.prompt.id
    }

    /// Can an answer be submitted right now?
    pub fn accepts_answer(&self) -> bool {
        self.phase == PromptPhase::Pending
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        match &self.input {
            PromptInput::Indices(sel) => sel.to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn selected_ids(&self) -> Vec<String> {
        match &self.input {
            PromptInput::Ids(sel) => sel.to_vec(),
            _ => Vec::new(),
        }
    }
}

/// What a [`PromptResolver::sync`] call changed
#[derive(Debug, Clone, PartialEq)]
pub enum PromptChange {
    Unchanged,
    /// A different prompt is now presented (input reset)
    Presented(PromptId),
    /// The presented prompt was resolved or went away
    Cleared,
}

/// Tracks the prompt presented to one viewer
#[derive(Debug, Clone)]
pub struct PromptResolver {
    viewer: PlayerId,
    default_max: usize,
    active: Option<ActivePrompt>,
}

impl PromptResolver {
    pub fn new(viewer: PlayerId, default_max: usize) -> Self {
        PromptResolver {
            viewer,
            default_max,
            active: None,
        }
    }

    pub fn viewer(&self) -> &PlayerId {
        &self.viewer
    }

    pub fn active(&self) -> Option<&ActivePrompt> {
        self.active.as_ref()
    }

    pub fn active_kind(&self) -> Option<PromptKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Re-evaluate against a new authoritative state
    pub fn sync(&mut self, view: &MatchView) -> PromptChange {
        let Some(selected) = select_active(&view.prompts, &self.viewer) else {
            return match self.active.take() {
                Some(_) => PromptChange::Cleared,
                None => PromptChange::Unchanged,
            };
        };
        // select_active only yields known kinds
        let Some(kind) = selected.kind() else {
            return PromptChange::Unchanged;
        };

        if let Some(active) = self.active.as_mut() {
            if active.prompt.id == selected.id {
                active.prompt = selected.clone();
                return PromptChange::Unchanged;
            }
        }

        self.active = Some(ActivePrompt {
            prompt: selected.clone(),
            kind,
            phase: PromptPhase::Pending,
            input: PromptInput::for_prompt(kind, selected, self.default_max),
        });
        PromptChange::Presented(selected.id.clone())
    }

    /// Toggle a hand index on the active mulligan
    ///
    /// `None` when no pending multi-select prompt takes indices.
    pub fn toggle_index(&mut self, index: usize) -> Option<Toggle> {
        let active = self.active.as_mut().filter(|a| a.accepts_answer())?;
        match &mut active.input {
            PromptInput::Indices(sel) => Some(sel.toggle(index)),
            _ => None,
        }
    }

    /// Toggle an option id on the active discard/target prompt
    ///
    /// Ids outside the prompt's `options` list (when it has one) are ignored.
    pub fn toggle_id(&mut self, id: impl Into<String>) -> Option<Toggle> {
        let id = id.into();
        let active = self.active.as_mut().filter(|a| a.accepts_answer())?;
        let options = active.prompt.options();
        if !options.is_empty() && !options.contains(&id) {
            return None;
        }
        match &mut active.input {
            PromptInput::Ids(sel) => Some(sel.toggle(id)),
            _ => None,
        }
    }

    /// `Pending -> Resolving` for the active prompt if it is `id` and of `kind`
    pub fn begin_resolving(&mut self, id: &PromptId) -> bool {
        match self.active.as_mut() {
            Some(active) if &active.prompt.id == id && active.accepts_answer() => {
                active.phase = PromptPhase::Resolving;
                true
            }
            _ => false,
        }
    }

    /// Settle a `Resolving` prompt after its command returned
    ///
    /// The prompt is answerable again either way until a push resolves it.
    /// An accepted answer clears the input; a failed one keeps it for the
    /// retry. Ignored if the prompt is no longer presented.
    pub fn finish_resolving(&mut self, id: &PromptId, accepted: bool) {
        let default_max = self.default_max;
        if let Some(active) = self.active.as_mut() {
            if &active.prompt.id != id || active.phase != PromptPhase::Resolving {
                return;
            }
            active.phase = PromptPhase::Pending;
            if accepted {
                active.input = PromptInput::for_prompt(active.kind, &active.prompt, default_max);
            }
        }
    }

    /// Does an unresolved blocking prompt (mulligan, battlefield draft) exist
    /// for the viewer in `view`?
    pub fn has_blocking_prompt(view: &MatchView, viewer: &PlayerId) -> bool {
        view.pending_prompts()
            .filter(|p| &p.owner_player_id == viewer)
            .filter_map(|p| p.kind())
            .any(|k| k.blocks_actions())
    }

    /// Drop all local prompt state
    pub fn reset(&mut self) {
        self.active = None;
    }
}
