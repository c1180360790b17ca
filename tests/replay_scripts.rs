//! Replay the session scripts under test_sessions/
//!
//! The scripts run through the same session methods a UI calls, so the
//! frames reflect gating, in-flight guards and prompt phases.

use match_session::{
    core::{MatchStatus, PlayerId, PromptKind},
    loader::{ScriptLoader, SnapshotLoader},
    session::{
        replay, summary, DispatchOutcome, OutputMode, PromptPhase, PromptStatus, Rejection,
        SelectionChange, SessionConfig, SessionStatus, StepResult,
    },
    view::{ScopedView, DEFAULT_GRAVEYARD_WINDOW},
    Result,
};
use std::path::PathBuf;

fn quiet() -> SessionConfig {
    SessionConfig::default().with_output_mode(OutputMode::Memory)
}

fn prompt_phase(status: &PromptStatus) -> Option<(PromptKind, PromptPhase)> {
    match status {
        PromptStatus::Active(active) => Some((active.kind, active.phase)),
        _ => None,
    }
}

#[tokio::test]
async fn test_initiative_script() -> Result<()> {
    let script = ScriptLoader::load(PathBuf::from("test_sessions/initiative.json")).await?;
    assert_eq!(script.push_count(), 3);

    let report = replay(&script, quiet()).await?;
    assert_eq!(report.frames.len(), 8);

    let phases: Vec<_> = report.frames.iter().map(|f| prompt_phase(&f.prompt)).collect();
    assert_eq!(
        phases,
        vec![
            Some((PromptKind::CoinFlip, PromptPhase::Pending)),
            Some((PromptKind::CoinFlip, PromptPhase::Pending)),
            Some((PromptKind::CoinFlip, PromptPhase::Pending)),
            Some((PromptKind::CoinFlip, PromptPhase::Pending)),
            Some((PromptKind::BattlefieldDraft, PromptPhase::Pending)),
            Some((PromptKind::BattlefieldDraft, PromptPhase::Pending)),
            Some((PromptKind::BattlefieldDraft, PromptPhase::Pending)),
            None,
        ]
    );

    // The unchanged rematch push leaves the duel answerable
    assert_eq!(
        report.frames[3].result,
        StepResult::Dispatched(DispatchOutcome::Succeeded)
    );
    assert_eq!(
        report.frames[5].result,
        StepResult::Dispatched(DispatchOutcome::Rejected(Rejection::InvalidChoice))
    );
    let last = report.last().expect("frames");
    assert_eq!(last.prompt, PromptStatus::Idle);
    assert_eq!(report.commands_sent, 3);
    Ok(())
}

#[tokio::test]
async fn test_move_to_base_script() -> Result<()> {
    let script = ScriptLoader::load(PathBuf::from("test_sessions/move_to_base.json")).await?;
    let report = replay(&script, quiet()).await?;

    let results: Vec<_> = report.frames.iter().map(|f| f.result.clone()).collect();
    assert_eq!(
        results,
        vec![
            StepResult::Opened,
            StepResult::Selection(SelectionChange::Ignored),
            StepResult::Selection(SelectionChange::Selected),
            StepResult::Dispatched(DispatchOutcome::Failed("Engine offline".to_string())),
            StepResult::Dispatched(DispatchOutcome::Succeeded),
            StepResult::Pushed,
            StepResult::Dispatched(DispatchOutcome::Succeeded),
            StepResult::StreamFailed,
        ]
    );

    let failed = &report.frames[3];
    assert_eq!(failed.feedback.as_deref(), Some("[error] Engine offline"));

    let moved = &report.frames[4];
    assert_eq!(moved.feedback.as_deref(), Some("[ok] Unit returned to base"));

    let pushed = report.frames[5].summary.as_deref().unwrap_or_default();
    assert!(pushed.contains("Units: Scout [2], Raider [3]"));
    assert!(!pushed.contains("@bf-1"));

    let last = report.last().expect("frames");
    assert_eq!(last.status, SessionStatus::Failed("connection reset".to_string()));
    assert_eq!(report.commands_sent, 3);
    Ok(())
}

#[tokio::test]
async fn test_viewer_override_must_be_a_participant() -> Result<()> {
    let mut script = ScriptLoader::load(PathBuf::from("test_sessions/move_to_base.json")).await?;
    script.viewer = Some(PlayerId::new("p9"));
    assert!(script.validate().is_err());

    script.viewer = Some(PlayerId::new("p2"));
    assert!(script.validate().is_ok());
    Ok(())
}

#[tokio::test]
async fn test_config_file() -> Result<()> {
    let config = SessionConfig::load(PathBuf::from("test_sessions/quiet.config.json")).await?;
    assert_eq!(config.feedback_ttl().as_millis(), 2500);
    assert_eq!(config.output_mode, OutputMode::Memory);
    assert_eq!(config.graveyard_window, DEFAULT_GRAVEYARD_WINDOW);
    Ok(())
}

#[tokio::test]
async fn test_inspect_snapshot_as_player() -> Result<()> {
    let snapshot = SnapshotLoader::load(PathBuf::from("test_sessions/midgame_snapshot.json")).await?;
    assert_eq!(snapshot.status, MatchStatus::InProgress);

    let view = ScopedView::for_player(&snapshot, &PlayerId::new("p1"))?;
    let text = summary::render(&view, DEFAULT_GRAVEYARD_WINDOW);

    assert!(text.starts_with("Match m-300 | in progress | turn 8 | combat"));
    assert!(text.contains("Priority: Bob (spell_cast)"));
    assert!(text.contains("Combat at bf-1: Alice attacks Bob"));
    assert!(text.contains("Hand: 0:Strike, 1:Ward"));
    assert!(text.contains("Runes: [ooo.........] 3/12"));
    assert!(text.contains("Legend: Jinx | Leader: Vi [5]"));
    assert!(text.contains("Units: Scout [2] (exhausted) @bf-1"));
    assert!(text.contains("Gear: Long Sword"));
    assert!(text.contains("Graveyard: Flash, Spark"));
    assert!(text.contains("Sunken Temple (bf-1) - contested by Bob"));
    assert!(text.contains("Prompt: waiting for opponent"));

    // The opponent's leaked hand is reduced to a count
    assert!(text.contains("Hand: 3 cards"));
    assert!(!text.contains("Secret Plan"));
    Ok(())
}

#[tokio::test]
async fn test_inspect_snapshot_as_spectator() -> Result<()> {
    let snapshot = SnapshotLoader::load(PathBuf::from("test_sessions/midgame_snapshot.json")).await?;
    let view = ScopedView::for_observer(&snapshot);
    let text = summary::render(&view, DEFAULT_GRAVEYARD_WINDOW);

    assert!(!text.contains("(you)"));
    assert!(!text.contains("Strike"));
    assert!(text.contains("Hand: 2 cards"));
    assert!(text.contains("Prompt: 1 pending for players"));
    Ok(())
}
