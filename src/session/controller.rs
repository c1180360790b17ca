//! Match session controller
//!
//! [`MatchSession`] owns everything the client knows about one match for one
//! viewer: the reconciled state, the presented prompt, the selected unit, the
//! in-flight command table and the feedback slot. It is driven from a single
//! thread. All methods take `&self`; state sits in `Cell`/`RefCell` and no
//! borrow is held across an `.await`, so several operations can be awaited
//! concurrently (e.g. with `tokio::join!`) without tripping the borrow checker
//! at runtime.

/// Verbose diagnostics that compile away without the `verbose-logging` feature
macro_rules! log_if_verbose {
    ($self:expr, $category:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.logger.verbose($category, &format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::core::{
    BattlefieldId, Destination, InitiativeChoice, InstanceId, MatchId, MatchView, PlayerId,
    PromptId, PromptKind,
};
use crate::service::{Command, CommandFamily, MatchService, PushEvent, PushStream};
use crate::session::config::SessionConfig;
use crate::session::dispatcher::{
    check_gate, ActionClass, ConcedeConfirmation, DispatchOutcome, GateReason, InFlightTable,
    Rejection,
};
use crate::session::feedback::{Feedback, FeedbackKind, FeedbackSlot};
use crate::session::logger::{category, SessionLogger};
use crate::session::prompt::{
    prompt_display, ActivePrompt, PromptChange, PromptDisplay, PromptResolver, Toggle,
};
use crate::session::reconciler::{Applied, Source, StateReconciler};
use crate::session::selection::{SelectionChange, UnitSelection};
use crate::view::ScopedView;
use crate::{Result, SessionError};
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tokio::sync::Notify;

/// Coarse session state for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    Ready,
    Failed(String),
}

/// What the prompt area should show
#[derive(Debug, Clone, PartialEq)]
pub enum PromptStatus {
    Active(ActivePrompt),
    AwaitingOpponent,
    Idle,
}

/// Client-side controller for one match and one viewer
pub struct MatchSession<S: MatchService> {
    service: S,
    config: SessionConfig,
    logger: SessionLogger,
    viewer: Option<PlayerId>,
    /// Bumped on match switch and close; completions from older generations
    /// are discarded
    generation: Cell<u64>,
    reconciler: RefCell<StateReconciler>,
    prompts: RefCell<Option<PromptResolver>>,
    selection: RefCell<UnitSelection>,
    in_flight: RefCell<InFlightTable>,
    feedback: RefCell<FeedbackSlot>,
    stream: RefCell<Option<PushStream>>,
    /// Bumped whenever the stream is dropped or replaced
    stream_epoch: Cell<u64>,
    /// Wakes a waiting `next_event` so it lets go of a replaced stream
    stream_reset: Notify,
}

impl<S: MatchService> MatchSession<S> {
    /// Session for a participant (self-scoped pull and push)
    pub fn for_player(
        service: S,
        match_id: impl Into<MatchId>,
        player_id: impl Into<PlayerId>,
        config: SessionConfig,
    ) -> Self {
        Self::new(service, match_id.into(), Some(player_id.into()), config)
    }

    /// Spectator session (observer-scoped pull and push, no actions)
    pub fn observer(service: S, match_id: impl Into<MatchId>, config: SessionConfig) -> Self {
        Self::new(service, match_id.into(), None, config)
    }

    fn new(service: S, match_id: MatchId, viewer: Option<PlayerId>, config: SessionConfig) -> Self {
        let mut logger = SessionLogger::with_verbosity(config.verbosity);
        logger.set_output_mode(config.output_mode);
        logger.set_output_format(config.output_format);

        let prompts = viewer
            .as_ref()
            .map(|v| PromptResolver::new(v.clone(), config.default_max_selections));
        let feedback = FeedbackSlot::new(config.feedback_ttl());

        MatchSession {
            service,
            logger,
            generation: Cell::new(0),
            reconciler: RefCell::new(StateReconciler::new(match_id, viewer.clone())),
            prompts: RefCell::new(prompts),
            selection: RefCell::new(UnitSelection::new()),
            in_flight: RefCell::new(InFlightTable::new()),
            feedback: RefCell::new(feedback),
            stream: RefCell::new(None),
            stream_epoch: Cell::new(0),
            stream_reset: Notify::new(),
            viewer,
            config,
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Subscribe to pushes, then pull once to bridge until the first push
    ///
    /// A failure of either source leaves the session in the failed state and
    /// is also returned.
    pub async fn open(&self) -> Result<()> {
        let generation = self.generation.get();
        let match_id = self.match_id();

        let subscribed = match &self.viewer {
            Some(player) => self.service.subscribe_player_view(&match_id, player),
            None => self.service.subscribe_match(&match_id),
        };
        let stream = match subscribed {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(e.user_message());
                return Err(e);
            }
        };
        *self.stream.borrow_mut() = Some(stream);
        self.logger
            .verbose(category::RECONCILE, &format!("subscribed to match {match_id}"));

        let pulled = match &self.viewer {
            Some(player) => self.service.fetch_player_view(&match_id, player).await,
            None => self.service.fetch_match(&match_id).await,
        };
        if self.generation.get() != generation {
            log_if_verbose!(self, category::RECONCILE, "discarding pull for {match_id}");
            return Ok(());
        }

        match pulled {
            Ok(view) => {
                self.apply(Source::Pull, view);
                Ok(())
            }
            Err(e) => {
                self.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Apply every push already queued, without waiting
    ///
    /// Returns how many events were handled.
    pub fn pump(&self) -> usize {
        let mut handled = 0;
        loop {
            let event = match self.stream.borrow_mut().as_mut() {
                Some(stream) => stream.try_next(),
                None => None,
            };
            let Some(event) = event else {
                break;
            };
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next push and apply it
    ///
    /// `None` when there is no live stream, the stream ended, or the stream
    /// was replaced (reconnect, match switch, close) while waiting. A
    /// replaced stream is dropped here and its event is never applied.
    pub async fn next_event(&self) -> Option<Applied> {
        let epoch = self.stream_epoch.get();
        let mut stream = self.stream.borrow_mut().take()?;
        let event = tokio::select! {
            event = stream.next() => event,
            _ = self.stream_reset.notified() => return None,
        };
        if self.stream_epoch.get() != epoch {
            return None;
        }

        match event {
            Some(event) => {
                *self.stream.borrow_mut() = Some(stream);
                Some(self.handle_event(event))
            }
            None => {
                self.fail("Match stream closed".to_string());
                None
            }
        }
    }

    /// Move to another match: releases the current stream, forgets all
    /// derived state, discards outstanding completions and opens the new match
    pub async fn switch_match(&self, match_id: impl Into<MatchId>) -> Result<()> {
        let match_id = match_id.into();
        self.release();
        *self.reconciler.borrow_mut() = StateReconciler::new(match_id.clone(), self.viewer.clone());
        if let Some(resolver) = self.prompts.borrow_mut().as_mut() {
            resolver.reset();
        }
        self.selection.borrow_mut().clear();
        self.feedback.borrow_mut().clear();
        self.logger
            .normal(category::RECONCILE, &format!("switched to match {match_id}"));
        self.open().await
    }

    /// Drop the stream and pull again; the pull shows until the new stream
    /// delivers
    pub async fn reconnect(&self) -> Result<()> {
        self.drop_stream();
        self.reconciler.borrow_mut().reconnect();
        self.logger.normal(category::RECONCILE, "reconnecting");
        self.open().await
    }

    /// Release the push subscription; later completions are discarded
    pub fn close(&self) {
        self.release();
        self.logger.verbose(category::RECONCILE, "session closed");
    }

    fn release(&self) {
        self.generation.set(self.generation.get() + 1);
        self.drop_stream();
        self.in_flight.borrow_mut().clear();
    }

    fn drop_stream(&self) {
        self.stream_epoch.set(self.stream_epoch.get() + 1);
        self.stream.borrow_mut().take();
        self.stream_reset.notify_waiters();
    }

    fn handle_event(&self, event: PushEvent) -> Applied {
        match event {
            PushEvent::Update(view) => self.apply(Source::Push, view),
            PushEvent::Failed(message) => {
                self.fail(message);
                Applied::Ignored
            }
        }
    }

    fn apply(&self, source: Source, view: MatchView) -> Applied {
        let applied = {
            let mut reconciler = self.reconciler.borrow_mut();
            match source {
                Source::Pull => reconciler.on_pull(view),
                Source::Push => reconciler.on_push(view),
            }
        };
        log_if_verbose!(self, category::RECONCILE, "{source:?} update: {applied:?}");
        if applied == Applied::Replaced {
            self.sync_derived();
        }
        applied
    }

    fn fail(&self, message: String) {
        self.logger
            .minimal(category::RECONCILE, &format!("session failed: {message}"));
        self.reconciler.borrow_mut().fail(message);
        self.drop_stream();
    }

    /// Re-derive the prompt and selection from the current state
    fn sync_derived(&self) {
        let Some(view) = self.current() else {
            return;
        };

        if let Some(resolver) = self.prompts.borrow_mut().as_mut() {
            match resolver.sync(&view) {
                PromptChange::Unchanged => {}
                PromptChange::Presented(id) => {
                    let kind = resolver.active_kind().map(|k| k.to_string()).unwrap_or_default();
                    self.logger
                        .normal(category::PROMPT, &format!("presenting {kind} prompt {id}"));
                }
                PromptChange::Cleared => {
                    self.logger.verbose(category::PROMPT, "no prompt to present");
                }
            }
        }

        let me = self.viewer.as_ref().and_then(|v| view.player(v));
        if self.selection.borrow_mut().sync(me) {
            self.logger
                .verbose(category::SELECTION, "selected unit left the board");
        }
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn viewer(&self) -> Option<&PlayerId> {
        self.viewer.as_ref()
    }

    pub fn match_id(&self) -> MatchId {
        self.reconciler.borrow().match_id().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn status(&self) -> SessionStatus {
        let reconciler = self.reconciler.borrow();
        if let Some(message) = reconciler.failure() {
            SessionStatus::Failed(message.to_string())
        } else if reconciler.current().is_some() {
            SessionStatus::Ready
        } else {
            SessionStatus::Loading
        }
    }

    /// Has any push arrived since the session was opened or reconnected?
    pub fn in_push_mode(&self) -> bool {
        self.reconciler.borrow().in_push_mode()
    }

    pub fn revision(&self) -> u64 {
        self.reconciler.borrow().revision()
    }

    /// Current authoritative state, unredacted
    pub fn current(&self) -> Option<Arc<MatchView>> {
        self.reconciler.borrow().current().cloned()
    }

    /// Viewer's projection (own hand visible)
    pub fn self_view(&self) -> Option<ScopedView> {
        self.reconciler.borrow().self_view().cloned()
    }

    /// Projection with every hand hidden
    pub fn observer_view(&self) -> Option<ScopedView> {
        self.reconciler.borrow().observer_view().cloned()
    }

    /// Self view for participants, observer view for spectators
    pub fn scoped_view(&self) -> Option<ScopedView> {
        match self.viewer {
            Some(_) => self.self_view(),
            None => self.observer_view(),
        }
    }

    pub fn active_prompt(&self) -> Option<ActivePrompt> {
        self.prompts
            .borrow()
            .as_ref()
            .and_then(|r| r.active())
            .cloned()
    }

    pub fn prompt_status(&self) -> PromptStatus {
        if let Some(active) = self.active_prompt() {
            return PromptStatus::Active(active);
        }
        let Some(view) = self.current() else {
            return PromptStatus::Idle;
        };
        let others_waiting = match &self.viewer {
            Some(viewer) => prompt_display(&view, viewer) == PromptDisplay::AwaitingOpponent,
            None => view.pending_prompts().any(|p| p.kind().is_some()),
        };
        if others_waiting {
            PromptStatus::AwaitingOpponent
        } else {
            PromptStatus::Idle
        }
    }

    pub fn selected_unit(&self) -> Option<InstanceId> {
        self.selection.borrow().selected().cloned()
    }

    /// Is "return to base" available for the selected unit?
    pub fn can_return_to_base(&self) -> bool {
        let view = self.self_view();
        match view.as_ref().and_then(|v| v.me()) {
            Some(me) => self.selection.borrow().can_return_to_base(me),
            None => false,
        }
    }

    pub fn is_in_flight(&self, family: CommandFamily) -> bool {
        self.in_flight.borrow().is_in_flight(family)
    }

    /// Is a command of `family` allowed right now? Drives affordance state.
    pub fn is_enabled(&self, family: CommandFamily) -> bool {
        self.precheck(family).is_ok()
    }

    /// Feedback message visible right now
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback.borrow().visible().cloned()
    }

    /// Sleep until the visible message's deadline, then clear it
    ///
    /// Returns false when nothing was visible or a newer message replaced it
    /// in the meantime.
    pub async fn expire_feedback(&self) -> bool {
        let Some((id, deadline)) = self.feedback.borrow().deadline() else {
            return false;
        };
        tokio::time::sleep_until(deadline).await;
        self.feedback.borrow_mut().expire(id)
    }

    // ---------------------------------------------------------------------
    // Local input
    // ---------------------------------------------------------------------

    /// Select or deselect one of the viewer's units
    pub fn toggle_unit(&self, id: &InstanceId) -> SelectionChange {
        let view = self.self_view();
        let Some(me) = view.as_ref().and_then(|v| v.me()) else {
            return SelectionChange::Ignored;
        };
        let change = self.selection.borrow_mut().toggle(me, id);
        log_if_verbose!(self, category::SELECTION, "toggle {id}: {change:?}");
        change
    }

    pub fn clear_selection(&self) {
        self.selection.borrow_mut().clear();
    }

    /// Toggle a hand card on the active mulligan
    pub fn toggle_mulligan_card(&self, index: usize) -> Option<Toggle> {
        let hand_size = self.self_view().map(|v| v.hand().len()).unwrap_or(0);
        if index >= hand_size {
            return None;
        }
        self.prompts.borrow_mut().as_mut()?.toggle_index(index)
    }

    /// Toggle an option on the active discard or target prompt
    pub fn toggle_option(&self, id: impl Into<String>) -> Option<Toggle> {
        self.prompts.borrow_mut().as_mut()?.toggle_id(id)
    }

    // ---------------------------------------------------------------------
    // Game actions
    // ---------------------------------------------------------------------

    /// Play the card at `card_index` in the viewer's hand
    pub async fn play_card(
        &self,
        card_index: usize,
        targets: Vec<String>,
        destination: Option<Destination>,
    ) -> DispatchOutcome {
        let player_id = match self.precheck(CommandFamily::PlayCard) {
            Ok(player) => player,
            Err(r) => return self.reject(r),
        };
        let name = self
            .self_view()
            .and_then(|v| v.hand().get(card_index).map(|c| c.name.clone()));
        let Some(name) = name else {
            return self.reject(Rejection::NoSuchCard(card_index));
        };

        let command = Command::PlayCard {
            match_id: self.match_id(),
            player_id,
            card_index,
            targets,
            destination_id: destination.map(|d| d.wire_id().to_string()),
        };
        self.dispatch(command, format!("Played {name}")).await
    }

    /// Move the selected unit to a battlefield or back to base
    ///
    /// The selection is cleared once the service accepts the move.
    pub async fn move_selected(&self, destination: Destination) -> DispatchOutcome {
        let player_id = match self.precheck(CommandFamily::MoveUnit) {
            Ok(player) => player,
            Err(r) => return self.reject(r),
        };
        let Some(unit_id) = self.selected_unit() else {
            return self.reject(Rejection::NoSelection);
        };
        let allowed = {
            let view = self.self_view();
            match view.as_ref().and_then(|v| v.me()) {
                Some(me) => self.selection.borrow().can_move_to(me, &destination),
                None => false,
            }
        };
        if !allowed {
            return self.reject(Rejection::InvalidDestination);
        }

        let success = match &destination {
            Destination::Base => "Unit returned to base".to_string(),
            Destination::Battlefield(id) => format!("Unit moved to {id}"),
        };
        let command = Command::MoveUnit {
            match_id: self.match_id(),
            player_id,
            unit_instance_id: unit_id.clone(),
            destination_id: destination.wire_id().to_string(),
        };
        let outcome = self.dispatch(command, success).await;
        if outcome.is_success() {
            let mut selection = self.selection.borrow_mut();
            if selection.is_selected(&unit_id) {
                selection.clear();
            }
        }
        outcome
    }

    pub async fn return_selected_to_base(&self) -> DispatchOutcome {
        self.move_selected(Destination::Base).await
    }

    pub async fn next_phase(&self) -> DispatchOutcome {
        let player_id = match self.precheck(CommandFamily::AdvancePhase) {
            Ok(player) => player,
            Err(r) => return self.reject(r),
        };
        let command = Command::NextPhase {
            match_id: self.match_id(),
            player_id,
        };
        self.dispatch(command, "Phase advanced".to_string()).await
    }

    /// First step of conceding; the token must be passed to
    /// [`Self::confirm_concede`]
    pub fn request_concede(&self) -> std::result::Result<ConcedeConfirmation, Rejection> {
        self.precheck(CommandFamily::Concede)?;
        self.logger.verbose(category::COMMAND, "concede requested");
        Ok(ConcedeConfirmation::new(self.match_id(), self.generation.get()))
    }

    pub async fn confirm_concede(&self, confirmation: ConcedeConfirmation) -> DispatchOutcome {
        if confirmation.generation != self.generation.get() || confirmation.match_id != self.match_id() {
            return DispatchOutcome::Stale;
        }
        let player_id = match self.precheck(CommandFamily::Concede) {
            Ok(player) => player,
            Err(r) => return self.reject(r),
        };
        let command = Command::ConcedeMatch {
            match_id: confirmation.match_id,
            player_id,
        };
        self.dispatch(command, "Match conceded".to_string()).await
    }

    // ---------------------------------------------------------------------
    // Prompt answers
    // ---------------------------------------------------------------------

    pub async fn submit_initiative(&self, choice: InitiativeChoice) -> DispatchOutcome {
        self.answer_prompt(
            CommandFamily::Initiative,
            &[PromptKind::CoinFlip],
            format!("Chose {choice}"),
            |match_id, player_id, _| {
                Ok(Command::SubmitInitiativeChoice {
                    match_id,
                    player_id,
                    choice,
                })
            },
        )
        .await
    }

    pub async fn select_battlefield(&self, battlefield_id: BattlefieldId) -> DispatchOutcome {
        let success = format!("Selected {battlefield_id}");
        self.answer_prompt(
            CommandFamily::Battlefield,
            &[PromptKind::BattlefieldDraft],
            success,
            |match_id, player_id, active| {
                let offered = active.prompt.battlefield_choices();
                if !offered.is_empty() && !offered.contains(&battlefield_id) {
                    return Err(Rejection::InvalidChoice);
                }
                Ok(Command::SelectBattlefield {
                    match_id,
                    player_id,
                    battlefield_id,
                })
            },
        )
        .await
    }

    /// Submit the toggled hand indices (empty keeps the whole hand)
    pub async fn submit_mulligan(&self) -> DispatchOutcome {
        self.answer_prompt(
            CommandFamily::Mulligan,
            &[PromptKind::Mulligan],
            "Mulligan submitted".to_string(),
            |match_id, player_id, active| {
                Ok(Command::SubmitMulligan {
                    match_id,
                    player_id,
                    indices: active.selected_indices(),
                })
            },
        )
        .await
    }

    /// Submit the toggled ids of the active discard or target prompt
    pub async fn submit_selection(&self) -> DispatchOutcome {
        self.answer_prompt(
            CommandFamily::PromptSelection,
            &[PromptKind::DiscardSelection, PromptKind::TargetSelection],
            "Selection submitted".to_string(),
            |match_id, player_id, active| {
                let prompt_id = active.id().clone();
                let selection_ids = active.selected_ids();
                Ok(match active.kind {
                    PromptKind::DiscardSelection => Command::SubmitDiscardSelection {
                        match_id,
                        player_id,
                        prompt_id,
                        selection_ids,
                    },
                    _ => Command::SubmitTargetSelection {
                        match_id,
                        player_id,
                        prompt_id,
                        selection_ids,
                    },
                })
            },
        )
        .await
    }

    /// Accept (`pass == false`) or pass on the open reaction window
    pub async fn respond_to_reaction(&self, pass: bool) -> DispatchOutcome {
        let success = if pass { "Passed" } else { "Responded" };
        self.answer_prompt(
            CommandFamily::Reaction,
            &[PromptKind::ReactionResponse],
            success.to_string(),
            |match_id, player_id, _| {
                Ok(Command::RespondToReaction {
                    match_id,
                    player_id,
                    pass,
                })
            },
        )
        .await
    }

    /// Shared path for prompt answers: guard, gate, check the active prompt,
    /// move it to `Resolving`, send, then settle it
    async fn answer_prompt<F>(
        &self,
        family: CommandFamily,
        kinds: &[PromptKind],
        success: String,
        build: F,
    ) -> DispatchOutcome
    where
        F: FnOnce(MatchId, PlayerId, &ActivePrompt) -> std::result::Result<Command, Rejection>,
    {
        let player_id = match self.precheck(family) {
            Ok(player) => player,
            Err(r) => return self.reject(r),
        };
        let match_id = self.match_id();

        let prepared: Option<(PromptId, std::result::Result<Command, Rejection>)> = self
            .prompts
            .borrow()
            .as_ref()
            .and_then(|r| r.active())
            .filter(|a| kinds.contains(&a.kind) && a.accepts_answer())
            .map(|a| (a.id().clone(), build(match_id, player_id, a)));
        let Some((prompt_id, built)) = prepared else {
            return self.reject(Rejection::PromptNotActive);
        };
        let command = match built {
            Ok(command) => command,
            Err(r) => return self.reject(r),
        };

        if let Some(resolver) = self.prompts.borrow_mut().as_mut() {
            resolver.begin_resolving(&prompt_id);
        }
        let outcome = self.dispatch(command, success).await;
        if outcome != DispatchOutcome::Stale {
            if let Some(resolver) = self.prompts.borrow_mut().as_mut() {
                resolver.finish_resolving(&prompt_id, outcome.is_success());
            }
        }
        outcome
    }

    // ---------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------

    /// In-flight guard and gating predicate; yields the acting player
    fn precheck(&self, family: CommandFamily) -> std::result::Result<PlayerId, Rejection> {
        if self.in_flight.borrow().is_in_flight(family) {
            return Err(Rejection::InFlight(family));
        }
        let current = self.current();
        check_gate(ActionClass::of(family), current.as_deref(), self.viewer.as_ref())
            .map_err(Rejection::Gate)?;
        self.viewer
            .clone()
            .ok_or(Rejection::Gate(GateReason::Spectating))
    }

    fn reject(&self, rejection: Rejection) -> DispatchOutcome {
        self.logger
            .verbose(category::COMMAND, &format!("rejected locally: {rejection}"));
        if !matches!(rejection, Rejection::InFlight(_)) {
            self.feedback
                .borrow_mut()
                .show(FeedbackKind::Info, rejection.to_string());
        }
        DispatchOutcome::Rejected(rejection)
    }

    async fn dispatch(&self, command: Command, success: String) -> DispatchOutcome {
        let family = command.family();
        let generation = self.generation.get();
        if let Err(r) = self.in_flight.borrow_mut().try_acquire(family, generation) {
            return self.reject(r);
        }
        log_if_verbose!(self, category::COMMAND, "sending {family}");

        let result = self.service.send(&command).await;

        if self.generation.get() != generation {
            self.logger.verbose(
                category::COMMAND,
                &format!("{family} completed after the session moved on; ignored"),
            );
            return DispatchOutcome::Stale;
        }
        self.in_flight.borrow_mut().release(family, generation);

        let failure = match result {
            Ok(ack) if ack.success => {
                self.logger
                    .normal(category::COMMAND, &format!("{family} accepted"));
                self.feedback.borrow_mut().show(FeedbackKind::Success, success);
                return DispatchOutcome::Succeeded;
            }
            Ok(ack) => ack
                .message
                .unwrap_or_else(|| format!("The match service refused the {family}")),
            Err(SessionError::Command(message)) => message,
            Err(e) => e.user_message(),
        };

        self.logger
            .minimal(category::COMMAND, &format!("{family} failed: {failure}"));
        self.feedback
            .borrow_mut()
            .show(FeedbackKind::Failure, failure.clone());
        DispatchOutcome::Failed(failure)
    }
}

impl<S: MatchService> std::fmt::Debug for MatchSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchSession")
            .field("match_id", &self.match_id())
            .field("viewer", &self.viewer)
            .field("generation", &self.generation.get())
            .field("status", &self.status())
            .finish()
    }
}
