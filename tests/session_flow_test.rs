//! End-to-end session flow: arming, ticking, cancellation, and the
//! capability gate, driven on tokio's paused clock so every tick is
//! deterministic.

use std::time::Duration;

use postura::{
    EngineEvent, EngineSettings, MockDetectionSource, SessionController, SessionStatus,
};
use tokio::time;

const TICK: Duration = Duration::from_secs(1);

fn controller(seed: u64) -> SessionController {
    SessionController::new(
        &EngineSettings::default(),
        Box::new(MockDetectionSource::new(seed)),
    )
}

fn granted_controller(seed: u64) -> SessionController {
    let controller = controller(seed);
    let capture = controller.capture();
    capture.request();
    capture.grant();
    controller
}

/// Let the sampler task catch up with the clock.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn advance_ticks(n: u32) {
    for _ in 0..n {
        time::advance(TICK).await;
        settle().await;
    }
}

#[tokio::test(start_paused = true)]
async fn three_ticks_then_stop() {
    let controller = granted_controller(42);
    controller.start_session().await.unwrap();
    settle().await;

    advance_ticks(3).await;
    let record = controller.end_session().await.unwrap();

    assert_eq!(record.duration_secs, 3);
    assert_eq!(record.samples, 3);
    assert!((60.0..=100.0).contains(&record.avg_score));
    assert!((60..=100).contains(&record.best_score));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, SessionStatus::Stopped);
    assert_eq!(snapshot.elapsed_secs, 3);
    assert!((60..=100).contains(&snapshot.score));
    // The mock advises every tick; only the most recent three are retained.
    assert_eq!(snapshot.feedback.len(), 3);
    assert!(snapshot.current_detection.is_some());
}

#[tokio::test(start_paused = true)]
async fn double_start_does_not_double_tick_rate() {
    let controller = granted_controller(1);
    controller.start_session().await.unwrap();
    settle().await;

    assert!(controller.start_session().await.is_err());

    advance_ticks(2).await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.elapsed_secs, 2);
}

#[tokio::test(start_paused = true)]
async fn restart_replays_no_stale_tick() {
    let controller = granted_controller(2);
    controller.start_session().await.unwrap();
    settle().await;
    advance_ticks(2).await;
    controller.end_session().await.unwrap();

    // Restart immediately: the old ticker must be fully disarmed.
    controller.start_session().await.unwrap();
    settle().await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, SessionStatus::Running);
    assert_eq!(snapshot.elapsed_secs, 0);

    advance_ticks(1).await;
    assert_eq!(controller.snapshot().await.elapsed_secs, 1);

    let record = controller.end_session().await.unwrap();
    assert_eq!(record.duration_secs, 1);
}

#[tokio::test(start_paused = true)]
async fn denied_capability_refuses_start() {
    let controller = controller(3);
    let capture = controller.capture();
    capture.request();
    capture.deny();

    let mut events = controller.subscribe();
    assert!(controller.start_session().await.is_err());

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, SessionStatus::Idle);
    assert_eq!(snapshot.elapsed_secs, 0);

    // Nothing ever ticks while refused.
    advance_ticks(2).await;
    assert_eq!(controller.snapshot().await.elapsed_secs, 0);

    match events.try_recv() {
        Ok(EngineEvent::CapabilityDenied { reason }) => {
            assert!(reason.contains("denied"));
        }
        other => panic!("expected CapabilityDenied, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn capability_loss_stops_sampling() {
    let controller = granted_controller(4);
    controller.start_session().await.unwrap();
    settle().await;
    advance_ticks(1).await;

    controller.capture().revoke();
    advance_ticks(2).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, SessionStatus::Stopped);
    assert_eq!(snapshot.elapsed_secs, 1);

    // The self-stopped session can still be finalized into a record.
    let record = controller.end_session().await.unwrap();
    assert_eq!(record.duration_secs, 1);
}

#[tokio::test(start_paused = true)]
async fn end_without_start_is_refused_but_cancel_is_idempotent() {
    let controller = granted_controller(5);
    assert!(controller.end_session().await.is_err());
    controller.cancel_session().await.unwrap();
    controller.cancel_session().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn session_completion_lands_in_history() {
    let controller = granted_controller(6);
    controller.start_session().await.unwrap();
    settle().await;
    advance_ticks(5).await;
    controller.end_session().await.unwrap();

    let history = controller.history();
    let summary = history.summary().await;
    assert_eq!(summary.sessions, 1);
    assert_eq!(summary.total_active_secs, 5);
    assert_eq!(summary.streak_days, 1);

    let breakdown = history.detection_breakdown().await;
    let total_samples: u64 = breakdown.iter().map(|share| share.samples).sum();
    assert_eq!(total_samples, 5);
}

#[tokio::test(start_paused = true)]
async fn score_events_flow_while_running() {
    let controller = granted_controller(7);
    let mut events = controller.subscribe();
    controller.start_session().await.unwrap();
    settle().await;
    advance_ticks(1).await;

    let mut saw_score = false;
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::ScoreUpdated { score } = event {
            assert!((60..=100).contains(&score));
            saw_score = true;
        }
    }
    assert!(saw_score);

    controller.end_session().await.unwrap();
}
