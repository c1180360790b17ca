//! Pull/push state reconciliation
//!
//! Two slots hold the most recent pulled snapshot and the most recent pushed
//! update. The current state is always `resolve(pulled, pushed)`, i.e. the
//! push when one has arrived, otherwise the pull. Once the first push lands
//! the session is in push mode for good: a late pull is stored but never
//! shown. Only [`StateReconciler::reconnect`] leaves push mode.

use crate::core::{MatchId, MatchView, PlayerId};
use crate::view::ScopedView;
use std::sync::Arc;

/// Which source delivered an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Pull,
    Push,
}

/// Observable state of the reconciler
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileStatus<'a> {
    /// Neither a pull nor a push has arrived yet
    Loading,
    /// Authoritative state available
    Ready(&'a Arc<MatchView>),
    /// A source failed; nothing is shown
    Failed(&'a str),
}

/// Result of feeding one update to the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The current view was replaced
    Replaced,
    /// Stored but not shown (a pull after the first push)
    Shadowed,
    /// Dropped: wrong match, or the reconciler already failed
    Ignored,
}

/// Pick the authoritative value: the push when present, else the pull
pub fn resolve<'a, T>(pulled: Option<&'a T>, pushed: Option<&'a T>) -> Option<&'a T> {
    pushed.or(pulled)
}

/// Owner of the authoritative match state for one session
#[derive(Debug, Clone)]
pub struct StateReconciler {
    match_id: MatchId,
    viewer: Option<PlayerId>,
    latest_pulled: Option<Arc<MatchView>>,
    latest_push: Option<Arc<MatchView>>,
    failure: Option<String>,
    revision: u64,
    self_view: Option<ScopedView>,
    observer_view: Option<ScopedView>,
}

impl StateReconciler {
    /// Reconciler for `match_id`, projecting for `viewer` (or observers only)
    pub fn new(match_id: MatchId, viewer: Option<PlayerId>) -> Self {
        StateReconciler {
            match_id,
            viewer,
            latest_pulled: None,
            latest_push: None,
            failure: None,
            revision: 0,
            self_view: None,
            observer_view: None,
        }
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub fn viewer(&self) -> Option<&PlayerId> {
        self.viewer.as_ref()
    }

    /// Has at least one push arrived since creation or the last reconnect?
    pub fn in_push_mode(&self) -> bool {
        self.latest_push.is_some()
    }

    /// Bumped every time the current view is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn status(&self) -> ReconcileStatus<'_> {
        if let Some(message) = &self.failure {
            return ReconcileStatus::Failed(message);
        }
        match self.current() {
            Some(view) => ReconcileStatus::Ready(view),
            None => ReconcileStatus::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status(), ReconcileStatus::Loading)
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Current authoritative state; `None` while loading or after a failure
    pub fn current(&self) -> Option<&Arc<MatchView>> {
        if self.failure.is_some() {
            return None;
        }
        resolve(self.latest_pulled.as_ref(), self.latest_push.as_ref())
    }

    /// Projection for the viewing player
    pub fn self_view(&self) -> Option<&ScopedView> {
        self.current().and(self.self_view.as_ref())
    }

    /// Projection with every hand hidden
    pub fn observer_view(&self) -> Option<&ScopedView> {
        self.current().and(self.observer_view.as_ref())
    }

    /// Store a pulled snapshot
    pub fn on_pull(&mut self, view: MatchView) -> Applied {
        self.accept(Source::Pull, view)
    }

    /// Store a pushed update
    pub fn on_push(&mut self, view: MatchView) -> Applied {
        self.accept(Source::Push, view)
    }

    /// Record a fetch or stream failure; terminal until [`Self::reconnect`]
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.failure.is_none() {
            self.failure = Some(message.into());
        }
    }

    /// Forget both slots and any failure so a fresh pull can bridge the gap
    /// until the new stream delivers
    pub fn reconnect(&mut self) {
        self.latest_pulled = None;
        self.latest_push = None;
        self.failure = None;
        self.self_view = None;
        self.observer_view = None;
    }

    fn accept(&mut self, source: Source, view: MatchView) -> Applied {
        if self.failure.is_some() || view.match_id != self.match_id {
            return Applied::Ignored;
        }

        let view = Arc::new(view);
        let shown = match source {
            Source::Pull => {
                self.latest_pulled = Some(Arc::clone(&view));
                !self.in_push_mode()
            }
            Source::Push => {
                self.latest_push = Some(Arc::clone(&view));
                true
            }
        };

        if !shown {
            return Applied::Shadowed;
        }

        self.revision += 1;
        self.self_view = self
            .viewer
            .as_ref()
            .and_then(|viewer| ScopedView::for_player(&view, viewer).ok());
        self.observer_view = Some(ScopedView::for_observer(&view));
        Applied::Replaced
    }
}
