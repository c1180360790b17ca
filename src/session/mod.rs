//! Client-side match session
//!
//! Bottom-up: the [`reconciler`] merges pull and push into one state, the
//! [`prompt`] resolver and the unit [`selection`] derive from it, and the
//! [`controller`] dispatches commands and surfaces [`feedback`].

pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod feedback;
pub mod logger;
pub mod prompt;
pub mod reconciler;
pub mod replay;
pub mod selection;
pub mod summary;

pub use config::{SessionConfig, DEFAULT_FEEDBACK_TTL};
pub use controller::{MatchSession, PromptStatus, SessionStatus};
pub use dispatcher::{
    check_gate, ActionClass, ConcedeConfirmation, DispatchOutcome, GateReason, InFlightTable,
    Rejection,
};
pub use feedback::{Feedback, FeedbackKind, FeedbackSlot};
pub use logger::{LogEntry, OutputFormat, OutputMode, SessionLogger, VerbosityLevel};
pub use prompt::{
    prompt_display, select_active, ActivePrompt, MultiSelect, PromptChange, PromptDisplay,
    PromptInput, PromptPhase, PromptResolver, Toggle, PROMPT_PRIORITY,
};
pub use reconciler::{resolve, Applied, ReconcileStatus, StateReconciler};
pub use replay::{replay, ReplayFrame, ReplayReport, StepResult};
pub use selection::{SelectionChange, UnitSelection};
