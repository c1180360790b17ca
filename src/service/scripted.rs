//! In-memory match service driven by the host
//!
//! Serves a fixed snapshot for pulls, lets the host publish push events to
//! every live subscriber, records every command it receives, and answers
//! commands from a queue of scripted outcomes (success when the queue is
//! empty). Used by the replay tool and by tests.

use crate::core::{MatchId, MatchView, PlayerId};
use crate::service::{Command, CommandAck, MatchService, PushEvent, PushStream};
use crate::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Scripted answer to the next command
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ScriptedOutcome {
    /// Command accepted
    #[default]
    Accept,
    /// Service answered `success: false`
    Reject { message: String },
    /// Transport or engine error
    Error { message: String },
}

struct Subscriber {
    match_id: MatchId,
    player_id: Option<PlayerId>,
    tx: UnboundedSender<PushEvent>,
}

/// Host-driven [`MatchService`] implementation
#[derive(Default)]
pub struct ScriptedMatchService {
    snapshot: RefCell<Option<MatchView>>,
    fetch_failure: RefCell<Option<String>>,
    subscribers: RefCell<Vec<Subscriber>>,
    outcomes: RefCell<VecDeque<ScriptedOutcome>>,
    sent: RefCell<Vec<Command>>,
    latency: Cell<Option<Duration>>,
    fetch_count: Cell<usize>,
}

impl ScriptedMatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service whose pulls return `snapshot`
    pub fn with_snapshot(snapshot: MatchView) -> Self {
        let service = Self::new();
        service.set_snapshot(snapshot);
        service
    }

    pub fn set_snapshot(&self, snapshot: MatchView) {
        *self.snapshot.borrow_mut() = Some(snapshot);
    }

    /// Make every subsequent pull fail with `message`
    pub fn fail_fetches(&self, message: impl Into<String>) {
        *self.fetch_failure.borrow_mut() = Some(message.into());
    }

    /// Delay every command round trip by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.latency.set(Some(latency));
    }

    /// Queue the answer for the next command
    pub fn push_outcome(&self, outcome: ScriptedOutcome) {
        self.outcomes.borrow_mut().push_back(outcome);
    }

    /// Drop every queued outcome
    pub fn clear_outcomes(&self) {
        self.outcomes.borrow_mut().clear();
    }

    /// Deliver `view` to every live subscriber of its match
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, view: &MatchView) -> usize {
        self.broadcast(&view.match_id, PushEvent::Update(view.clone()))
    }

    /// Break every live stream of `match_id`
    pub fn publish_failure(&self, match_id: &MatchId, message: impl Into<String>) -> usize {
        self.broadcast(match_id, PushEvent::Failed(message.into()))
    }

    fn broadcast(&self, match_id: &MatchId, event: PushEvent) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|s| !s.tx.is_closed());
        subscribers
            .iter()
            .filter(|s| &s.match_id == match_id)
            .filter(|s| s.tx.send(event.clone()).is_ok())
            .count()
    }

    /// Live subscriptions for `match_id` (released streams are not counted)
    pub fn subscriber_count(&self, match_id: &MatchId) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|s| &s.match_id == match_id && !s.tx.is_closed())
            .count()
    }

    /// Live self-scoped subscriptions for a player
    pub fn player_subscriber_count(&self, match_id: &MatchId, player_id: &PlayerId) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|s| {
                &s.match_id == match_id
                    && s.player_id.as_ref() == Some(player_id)
                    && !s.tx.is_closed()
            })
            .count()
    }

    /// Every command received so far, in arrival order
    pub fn sent_commands(&self) -> Vec<Command> {
        self.sent.borrow().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.get()
    }

    fn fetch(&self, match_id: &MatchId) -> Result<MatchView> {
        self.fetch_count.set(self.fetch_count.get() + 1);
        if let Some(message) = self.fetch_failure.borrow().as_ref() {
            return Err(SessionError::Fetch(message.clone()));
        }
        match self.snapshot.borrow().as_ref() {
            Some(view) if &view.match_id == match_id => Ok(view.clone()),
            _ => Err(SessionError::MatchNotFound(match_id.to_string())),
        }
    }

    fn subscribe(&self, match_id: &MatchId, player_id: Option<&PlayerId>) -> PushStream {
        let (tx, stream) = PushStream::channel();
        self.subscribers.borrow_mut().push(Subscriber {
            match_id: match_id.clone(),
            player_id: player_id.cloned(),
            tx,
        });
        stream
    }
}

impl MatchService for ScriptedMatchService {
    async fn fetch_match(&self, match_id: &MatchId) -> Result<MatchView> {
        self.fetch(match_id)
    }

    async fn fetch_player_view(&self, match_id: &MatchId, player_id: &PlayerId) -> Result<MatchView> {
        let view = self.fetch(match_id)?;
        if !view.has_player(player_id) {
            return Err(SessionError::PlayerNotFound(player_id.to_string()));
        }
        Ok(view)
    }

    fn subscribe_match(&self, match_id: &MatchId) -> Result<PushStream> {
        Ok(self.subscribe(match_id, None))
    }

    fn subscribe_player_view(&self, match_id: &MatchId, player_id: &PlayerId) -> Result<PushStream> {
        Ok(self.subscribe(match_id, Some(player_id)))
    }

    async fn send(&self, command: &Command) -> Result<CommandAck> {
        self.sent.borrow_mut().push(command.clone());

        if let Some(latency) = self.latency.get() {
            tokio::time::sleep(latency).await;
        }

        let outcome = self.outcomes.borrow_mut().pop_front().unwrap_or_default();
        match outcome {
            ScriptedOutcome::Accept => Ok(CommandAck::ok()),
            ScriptedOutcome::Reject { message } => Ok(CommandAck::rejected(message)),
            ScriptedOutcome::Error { message } => Err(SessionError::Command(message)),
        }
    }
}
