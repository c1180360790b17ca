//! Drive a session from a [`SessionScript`]
//!
//! The script's snapshot answers the initial pull, push steps are published
//! through a [`ScriptedMatchService`], and action steps go through the same
//! session methods a UI would call, so gating and in-flight guards apply.

use crate::core::Destination;
use crate::loader::{ScriptAction, ScriptStep, SessionScript};
use crate::service::ScriptedMatchService;
use crate::session::config::SessionConfig;
use crate::session::controller::{MatchSession, PromptStatus, SessionStatus};
use crate::session::dispatcher::DispatchOutcome;
use crate::session::prompt::Toggle;
use crate::session::selection::SelectionChange;
use crate::session::summary;
use crate::Result;
use std::fmt;
use std::rc::Rc;

/// What one step did
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    Opened,
    Pushed,
    StreamFailed,
    Dispatched(DispatchOutcome),
    Selection(SelectionChange),
    /// `None` when no multi-select prompt took the toggle
    Toggled(Option<Toggle>),
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepResult::Opened => write!(f, "opened"),
            StepResult::Pushed => write!(f, "state updated"),
            StepResult::StreamFailed => write!(f, "stream failed"),
            StepResult::Dispatched(DispatchOutcome::Succeeded) => write!(f, "accepted"),
            StepResult::Dispatched(DispatchOutcome::Rejected(r)) => write!(f, "not sent: {r}"),
            StepResult::Dispatched(DispatchOutcome::Failed(m)) => write!(f, "failed: {m}"),
            StepResult::Dispatched(DispatchOutcome::Stale) => write!(f, "stale"),
            StepResult::Selection(change) => write!(f, "{change:?}"),
            StepResult::Toggled(Some(toggle)) => write!(f, "{toggle:?}"),
            StepResult::Toggled(None) => write!(f, "ignored"),
        }
    }
}

/// Session state after one step
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayFrame {
    /// 0 is the initial open; script steps start at 1
    pub step: usize,
    pub description: String,
    pub result: StepResult,
    pub status: SessionStatus,
    pub prompt: PromptStatus,
    pub feedback: Option<String>,
    /// Text rendering of the viewer's projection, when loaded
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub frames: Vec<ReplayFrame>,
    /// Commands that actually reached the match service
    pub commands_sent: usize,
}

impl ReplayReport {
    pub fn last(&self) -> Option<&ReplayFrame> {
        self.frames.last()
    }
}

/// Run `script` to completion
///
/// Fails only if the initial pull fails; everything after that is recorded
/// in the frames.
pub async fn replay(script: &SessionScript, config: SessionConfig) -> Result<ReplayReport> {
    let service = Rc::new(ScriptedMatchService::with_snapshot(script.snapshot.clone()));
    let graveyard_window = config.graveyard_window;
    let session = match &script.viewer {
        Some(viewer) => MatchSession::for_player(
            Rc::clone(&service),
            script.match_id.clone(),
            viewer.clone(),
            config,
        ),
        None => MatchSession::observer(Rc::clone(&service), script.match_id.clone(), config),
    };

    session.open().await?;
    let mut frames = vec![frame(&session, 0, "open".to_string(), StepResult::Opened, graveyard_window)];

    for (i, step) in script.steps.iter().enumerate() {
        let (description, result) = match step {
            ScriptStep::Push { view } => {
                service.publish(view);
                session.pump();
                (format!("push (turn {}, {})", view.turn_number, view.status), StepResult::Pushed)
            }
            ScriptStep::StreamFailure { message } => {
                service.publish_failure(&script.match_id, message.clone());
                session.pump();
                (format!("stream failure: {message}"), StepResult::StreamFailed)
            }
            ScriptStep::Action { action, outcome } => {
                let sent_before = service.sent_commands().len();
                if action.sends_command() {
                    service.push_outcome(outcome.clone());
                }
                let result = perform(&session, action).await;
                // A locally rejected action must not leave its outcome for the next one
                if service.sent_commands().len() == sent_before {
                    service.clear_outcomes();
                }
                (action.to_string(), result)
            }
        };
        frames.push(frame(&session, i + 1, description, result, graveyard_window));
    }

    session.close();
    Ok(ReplayReport {
        frames,
        commands_sent: service.sent_commands().len(),
    })
}

async fn perform(session: &MatchSession<Rc<ScriptedMatchService>>, action: &ScriptAction) -> StepResult {
    let outcome = match action {
        ScriptAction::ToggleUnit { instance_id } => {
            return StepResult::Selection(session.toggle_unit(instance_id));
        }
        ScriptAction::ToggleMulligan { index } => {
            return StepResult::Toggled(session.toggle_mulligan_card(*index));
        }
        ScriptAction::ToggleOption { id } => {
            return StepResult::Toggled(session.toggle_option(id.clone()));
        }
        ScriptAction::PlayCard {
            card_index,
            targets,
            destination,
        } => {
            let destination = destination.as_deref().map(Destination::from_wire);
            session.play_card(*card_index, targets.clone(), destination).await
        }
        ScriptAction::MoveSelected { destination } => {
            session.move_selected(Destination::from_wire(destination)).await
        }
        ScriptAction::ReturnToBase => session.return_selected_to_base().await,
        ScriptAction::NextPhase => session.next_phase().await,
        ScriptAction::Concede => match session.request_concede() {
            Ok(confirmation) => session.confirm_concede(confirmation).await,
            Err(rejection) => DispatchOutcome::Rejected(rejection),
        },
        ScriptAction::SubmitMulligan => session.submit_mulligan().await,
        ScriptAction::SelectBattlefield { battlefield_id } => {
            session.select_battlefield(battlefield_id.clone()).await
        }
        ScriptAction::SubmitInitiative { choice } => session.submit_initiative(*choice).await,
        ScriptAction::SubmitSelection => session.submit_selection().await,
        ScriptAction::React { pass } => session.respond_to_reaction(*pass).await,
    };
    StepResult::Dispatched(outcome)
}

fn frame(
    session: &MatchSession<Rc<ScriptedMatchService>>,
    step: usize,
    description: String,
    result: StepResult,
    graveyard_window: usize,
) -> ReplayFrame {
    ReplayFrame {
        step,
        description,
        result,
        status: session.status(),
        prompt: session.prompt_status(),
        feedback: session.feedback().map(|f| f.to_string()),
        summary: session
            .scoped_view()
            .map(|view| summary::render(&view, graveyard_window)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ScriptLoader;
    use crate::session::logger::OutputMode;

    fn quiet() -> SessionConfig {
        SessionConfig::default().with_output_mode(OutputMode::Memory)
    }

    #[tokio::test]
    async fn test_rejected_action_does_not_consume_outcome() {
        let script = ScriptLoader::parse(
            r#"{
                "matchId": "m-1",
                "viewer": "p1",
                "snapshot": {"matchId": "m-1", "status": "in_progress",
                             "players": [{"playerId": "p1", "canAct": false}, {"playerId": "p2"}]},
                "steps": [
                    {"step": "action", "action": {"action": "nextPhase"},
                     "outcome": {"result": "reject", "message": "Not your turn"}},
                    {"step": "push", "view": {"matchId": "m-1", "status": "in_progress",
                             "players": [{"playerId": "p1", "canAct": true}, {"playerId": "p2"}]}},
                    {"step": "action", "action": {"action": "nextPhase"}}
                ]
            }"#,
        )
        .unwrap();

        let report = replay(&script, quiet()).await.unwrap();
        assert_eq!(report.frames.len(), 4);
        assert!(matches!(
            report.frames[1].result,
            StepResult::Dispatched(DispatchOutcome::Rejected(_))
        ));
        assert_eq!(
            report.frames[3].result,
            StepResult::Dispatched(DispatchOutcome::Succeeded)
        );
        assert_eq!(report.commands_sent, 1);
    }

    #[tokio::test]
    async fn test_stream_failure_frame() {
        let script = ScriptLoader::parse(
            r#"{
                "matchId": "m-1",
                "snapshot": {"matchId": "m-1", "status": "setup", "players": [{"playerId": "p1"}]},
                "steps": [{"step": "streamFailure", "message": "connection reset"}]
            }"#,
        )
        .unwrap();

        let report = replay(&script, quiet()).await.unwrap();
        let last = report.last().unwrap();
        assert_eq!(last.status, SessionStatus::Failed("connection reset".to_string()));
        assert!(last.summary.is_none());
        assert_eq!(report.frames[0].status, SessionStatus::Ready);
    }
}
