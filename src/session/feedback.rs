//! Transient, auto-expiring user feedback
//!
//! One message is visible at a time; a newer message replaces the older one
//! and takes over the expiry deadline.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Failure,
    Info,
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeedbackKind::Success => "ok",
            FeedbackKind::Failure => "error",
            FeedbackKind::Info => "info",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Sequence number, unique per slot
    pub id: u64,
    pub kind: FeedbackKind,
    pub text: String,
    pub created_at: Instant,
    pub expires_at: Instant,
}

impl Feedback {
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.text)
    }
}

/// Holder of the single visible feedback message
#[derive(Debug, Clone)]
pub struct FeedbackSlot {
    ttl: Duration,
    next_id: u64,
    current: Option<Feedback>,
}

impl FeedbackSlot {
    pub fn new(ttl: Duration) -> Self {
        FeedbackSlot {
            ttl,
            next_id: 1,
            current: None,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Show `text`, replacing whatever is visible; returns the message id
    pub fn show(&mut self, kind: FeedbackKind, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let created_at = Instant::now();
        self.current = Some(Feedback {
            id,
            kind,
            text: text.into(),
            created_at,
            expires_at: created_at + self.ttl,
        });
        id
    }

    /// Visible message at `now`
    pub fn visible_at(&self, now: Instant) -> Option<&Feedback> {
        self.current.as_ref().filter(|f| f.is_visible_at(now))
    }

    pub fn visible(&self) -> Option<&Feedback> {
        self.visible_at(Instant::now())
    }

    /// Expiry of the current message, if any
    pub fn deadline(&self) -> Option<(u64, Instant)> {
        self.current.as_ref().map(|f| (f.id, f.expires_at))
    }

    /// Clear message `id` if it is still the current one
    ///
    /// A timer armed for a superseded message does nothing.
    pub fn expire(&mut self, id: u64) -> bool {
        if self.current.as_ref().map(|f| f.id) == Some(id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_message_expires_after_ttl() {
        let mut slot = FeedbackSlot::new(Duration::from_secs(4));
        slot.show(FeedbackKind::Success, "Unit moved");
        assert_eq!(slot.visible().map(|f| f.text.as_str()), Some("Unit moved"));

        tokio::time::advance(Duration::from_millis(3999)).await;
        assert!(slot.visible().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(slot.visible().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_supersedes_old_timer() {
        let mut slot = FeedbackSlot::new(Duration::from_secs(4));
        let first = slot.show(FeedbackKind::Failure, "Not your turn");
        tokio::time::advance(Duration::from_secs(2)).await;
        let second = slot.show(FeedbackKind::Info, "Waiting for opponent");

        assert!(!slot.expire(first));
        assert_eq!(slot.visible().map(|f| f.id), Some(second));

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(slot.visible().is_some(), "second message has its own deadline");
        assert!(slot.expire(second));
        assert!(slot.visible().is_none());
    }

    #[test]
    fn test_display() {
        let mut slot = FeedbackSlot::new(Duration::from_secs(4));
        slot.show(FeedbackKind::Failure, "Engine offline");
        let shown = slot.current.as_ref().unwrap();
        assert_eq!(shown.to_string(), "[error] Engine offline");
    }
}
