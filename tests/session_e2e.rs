//! End-to-end tests for the match session
//!
//! Each test drives a `MatchSession` against a `ScriptedMatchService`: the
//! service answers the initial pull, the test publishes pushes and queues
//! command outcomes, and the assertions look at what the session derived and
//! what it sent.

use match_session::{
    core::{
        CardInstance, CardLocation, Destination, InstanceId, MatchId, MatchStatus, MatchView,
        PlayerId, PlayerState,
    },
    service::{Command, CommandFamily, ScriptedMatchService, ScriptedOutcome},
    session::{
        DispatchOutcome, FeedbackKind, MatchSession, OutputMode, Rejection, SelectionChange,
        SessionConfig, SessionStatus,
    },
    Result,
};
use std::rc::Rc;
use std::time::Duration;

type Session = MatchSession<Rc<ScriptedMatchService>>;

fn config() -> SessionConfig {
    SessionConfig::default().with_output_mode(OutputMode::Memory)
}

fn unit(id: &str, name: &str) -> CardInstance {
    CardInstance::new(id, "OGN-010", name)
}

/// Two-player match, p1 to act, one unit at base and one on bf-1
fn board_state() -> MatchView {
    let mut p1 = PlayerState::new("p1", "Alice");
    p1.can_act = true;
    p1.hand = Some(vec![CardInstance::new("h-1", "OGN-001", "Strike")]);
    p1.hand_size = 1;
    p1.board.units.push(unit("u-1", "Scout"));
    p1.board
        .units
        .push(unit("u-2", "Raider").with_location(CardLocation::battlefield("bf-1")));

    let mut p2 = PlayerState::new("p2", "Bob");
    p2.hand_size = 4;
    p2.board.units.push(unit("e-1", "Brute"));

    let mut view = MatchView::new("m-1", MatchStatus::InProgress, vec![p1, p2]);
    view.turn_number = 3;
    view.phase = "action".to_string();
    view
}

async fn open(view: MatchView) -> Result<(Rc<ScriptedMatchService>, Session)> {
    let service = Rc::new(ScriptedMatchService::with_snapshot(view));
    let session = MatchSession::for_player(Rc::clone(&service), "m-1", "p1", config());
    session.open().await?;
    Ok((service, session))
}

#[tokio::test]
async fn test_pull_then_push_becomes_authoritative() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    assert_eq!(session.status(), SessionStatus::Ready);
    assert_eq!(session.current().map(|v| v.turn_number), Some(3));
    assert!(!session.in_push_mode());

    let mut next = board_state();
    next.turn_number = 4;
    assert_eq!(service.publish(&next), 1);
    assert_eq!(session.pump(), 1);

    assert!(session.in_push_mode());
    assert_eq!(session.current().map(|v| v.turn_number), Some(4));
    Ok(())
}

#[tokio::test]
async fn test_next_event_waits_for_push() -> Result<()> {
    let (service, session) = open(board_state()).await?;

    let mut next = board_state();
    next.turn_number = 9;
    let (applied, _) = tokio::join!(session.next_event(), async {
        tokio::task::yield_now().await;
        service.publish(&next)
    });

    assert!(applied.is_some());
    assert_eq!(session.current().map(|v| v.turn_number), Some(9));
    Ok(())
}

#[tokio::test]
async fn test_reconnect_bridges_with_a_fresh_pull() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    let mut pushed = board_state();
    pushed.turn_number = 7;
    service.publish(&pushed);
    session.pump();
    assert!(session.in_push_mode());

    service.set_snapshot(pushed);
    session.reconnect().await?;

    assert!(!session.in_push_mode());
    assert_eq!(session.current().map(|v| v.turn_number), Some(7));
    assert_eq!(service.subscriber_count(&MatchId::new("m-1")), 1);
    assert_eq!(service.fetch_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_reconnect_while_waiting_releases_old_stream() -> Result<()> {
    let (service, session) = open(board_state()).await?;

    let (waited, reconnected) = tokio::join!(session.next_event(), async {
        tokio::task::yield_now().await;
        session.reconnect().await
    });
    reconnected?;

    assert!(waited.is_none());
    assert_eq!(session.status(), SessionStatus::Ready);
    assert_eq!(service.subscriber_count(&MatchId::new("m-1")), 1);

    // One push reaches one stream and is applied once
    let before = session.revision();
    let mut next = board_state();
    next.turn_number = 5;
    assert_eq!(service.publish(&next), 1);
    assert_eq!(session.pump(), 1);
    assert_eq!(session.revision(), before + 1);
    assert_eq!(session.current().map(|v| v.turn_number), Some(5));
    Ok(())
}

#[tokio::test]
async fn test_opponent_hand_is_redacted_even_if_leaked() -> Result<()> {
    let (service, session) = open(board_state()).await?;

    let mut leaky = board_state();
    leaky.players[1].hand = Some(vec![
        CardInstance::new("x-1", "OGN-050", "Hidden Card"),
        CardInstance::new("x-2", "OGN-051", "Other Secret"),
    ]);
    service.publish(&leaky);
    session.pump();

    let view = session.self_view().expect("self view after push");
    let opponent = view.opponent().expect("opponent");
    assert!(opponent.hand.is_none());
    assert_eq!(opponent.visible_hand_size(), 2);
    assert_eq!(view.hand().len(), 1);

    let observer = session.observer_view().expect("observer view");
    assert!(observer.state().players.iter().all(|p| p.hand.is_none()));
    Ok(())
}

#[tokio::test]
async fn test_move_selected_unit_back_to_base() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    let raider = InstanceId::new("u-2");

    assert_eq!(session.toggle_unit(&raider), SelectionChange::Selected);
    assert!(session.can_return_to_base());

    let outcome = session.return_selected_to_base().await;
    assert_eq!(outcome, DispatchOutcome::Succeeded);
    similar_asserts::assert_eq!(
        service.sent_commands(),
        vec![Command::MoveUnit {
            match_id: MatchId::new("m-1"),
            player_id: PlayerId::new("p1"),
            unit_instance_id: raider.clone(),
            destination_id: "base".to_string(),
        }]
    );
    assert_eq!(session.selected_unit(), None);
    assert_eq!(
        session.feedback().map(|f| f.text),
        Some("Unit returned to base".to_string())
    );

    // Authoritative state: the unit is back at base
    let mut moved = board_state();
    moved.players[0].board.units[1].location = None;
    service.publish(&moved);
    session.pump();

    session.toggle_unit(&raider);
    assert!(!session.can_return_to_base());
    assert_eq!(
        session.return_selected_to_base().await,
        DispatchOutcome::Rejected(Rejection::InvalidDestination)
    );
    assert_eq!(service.sent_commands().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_move_requires_a_selection() -> Result<()> {
    let (service, session) = open(board_state()).await?;

    let outcome = session
        .move_selected(Destination::from_wire("bf-1"))
        .await;
    assert_eq!(outcome, DispatchOutcome::Rejected(Rejection::NoSelection));
    assert!(service.sent_commands().is_empty());

    // Opponent units and unknown ids are never selectable
    assert_eq!(
        session.toggle_unit(&InstanceId::new("e-1")),
        SelectionChange::Ignored
    );
    Ok(())
}

#[tokio::test]
async fn test_selection_cleared_when_unit_leaves_board() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    session.toggle_unit(&InstanceId::new("u-1"));
    assert!(session.selected_unit().is_some());

    let mut without = board_state();
    without.players[0].board.units.remove(0);
    service.publish(&without);
    session.pump();

    assert_eq!(session.selected_unit(), None);
    Ok(())
}

#[tokio::test]
async fn test_failed_move_keeps_selection_and_releases_guard() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    service.push_outcome(ScriptedOutcome::Error {
        message: "Engine offline".to_string(),
    });
    session.toggle_unit(&InstanceId::new("u-1"));

    let outcome = session.move_selected(Destination::from_wire("bf-1")).await;
    assert_eq!(outcome, DispatchOutcome::Failed("Engine offline".to_string()));
    assert_eq!(session.selected_unit(), Some(InstanceId::new("u-1")));
    assert!(!session.is_in_flight(CommandFamily::MoveUnit));

    let feedback = session.feedback().expect("failure feedback");
    assert_eq!(feedback.kind, FeedbackKind::Failure);

    // No automatic retry
    assert_eq!(service.sent_commands().len(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_phase_advance_is_rejected_locally() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    service.set_latency(Duration::from_millis(200));

    let (first, second) = tokio::join!(session.next_phase(), session.next_phase());

    assert_eq!(first, DispatchOutcome::Succeeded);
    assert_eq!(
        second,
        DispatchOutcome::Rejected(Rejection::InFlight(CommandFamily::AdvancePhase))
    );
    assert_eq!(service.sent_commands().len(), 1);
    assert!(!session.is_in_flight(CommandFamily::AdvancePhase));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_other_families_are_not_blocked() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    service.set_latency(Duration::from_millis(200));
    session.toggle_unit(&InstanceId::new("u-1"));

    let (phase, moved) = tokio::join!(
        session.next_phase(),
        session.move_selected(Destination::from_wire("bf-1"))
    );
    assert!(phase.is_success());
    assert!(moved.is_success());
    assert_eq!(service.sent_commands().len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_feedback_expires_after_four_seconds() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    service.push_outcome(ScriptedOutcome::Reject {
        message: "Not enough mana".to_string(),
    });

    session.play_card(0, vec![], None).await;
    assert_eq!(
        session.feedback().map(|f| f.text),
        Some("Not enough mana".to_string())
    );

    tokio::time::advance(Duration::from_millis(3900)).await;
    assert!(session.feedback().is_some());

    assert!(session.expire_feedback().await);
    assert!(session.feedback().is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_completion_after_match_switch_is_discarded() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    service.set_latency(Duration::from_millis(500));

    let mut other = board_state();
    other.match_id = MatchId::new("m-2");
    service.set_snapshot(other);

    let (outcome, switched) = tokio::join!(session.next_phase(), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.switch_match("m-2").await
    });
    switched?;

    assert_eq!(outcome, DispatchOutcome::Stale);
    assert_eq!(session.match_id(), MatchId::new("m-2"));
    assert!(!session.is_in_flight(CommandFamily::AdvancePhase));
    assert!(session.feedback().is_none());
    assert_eq!(service.subscriber_count(&MatchId::new("m-1")), 0);
    assert_eq!(service.subscriber_count(&MatchId::new("m-2")), 1);
    Ok(())
}

#[tokio::test]
async fn test_close_releases_subscription() -> Result<()> {
    let (service, session) = open(board_state()).await?;
    assert_eq!(service.subscriber_count(&MatchId::new("m-1")), 1);

    session.close();
    assert_eq!(service.subscriber_count(&MatchId::new("m-1")), 0);
    assert_eq!(session.pump(), 0);
    Ok(())
}

#[tokio::test]
async fn test_finished_match_disables_everything() -> Result<()> {
    let mut done = board_state();
    done.status = MatchStatus::Completed;
    let (service, session) = open(done).await?;

    for family in [
        CommandFamily::PlayCard,
        CommandFamily::MoveUnit,
        CommandFamily::AdvancePhase,
        CommandFamily::Concede,
        CommandFamily::Initiative,
    ] {
        assert!(!session.is_enabled(family), "{family} should be disabled");
    }
    assert!(session.request_concede().is_err());
    assert!(service.sent_commands().is_empty());
    Ok(())
}
