//! Image Session Integration Tests
//!
//! Lifecycle and concurrency behavior of the image-analysis orchestrator:
//! reset on artifact selection, primary idempotence, advanced
//! last-issued-wins ordering, stale-epoch discarding, and overlay
//! visibility rules.

use std::sync::Arc;
use std::time::Duration;

use veriscope::{
    AnalysisError, AppError, AppState, ClientConfig, ImageSession, Label, SlotStatus,
};

use crate::support::{artifact, report, server_error, MockBackend};

fn session(backend: &Arc<MockBackend>) -> ImageSession {
    ImageSession::new(backend.clone())
}

// ============================================================================
// Guards
// ============================================================================

#[tokio::test]
async fn primary_without_artifact_is_a_validation_error() {
    let backend = MockBackend::new();
    let session = session(&backend);

    let err = session.run_primary_analysis().await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(backend.analyze_calls(), 0);
}

// ============================================================================
// Primary lifecycle
// ============================================================================

#[tokio::test]
async fn primary_success_end_to_end() {
    let backend = MockBackend::new();
    backend.script_analyze(0, Ok(report(0.82)));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    session.run_primary_analysis().await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.primary_status, SlotStatus::Success);
    let result = snapshot.primary_report.unwrap();
    assert_eq!(result.label, Label::Real);
    assert!((result.real_confidence_pct() - 82.0).abs() < 1e-6);
    assert!((result.fake_confidence_pct() - 18.0).abs() < 1e-6);
    assert!(snapshot.primary_error.is_none());
}

#[tokio::test]
async fn primary_failure_lands_in_error_state() {
    let backend = MockBackend::new();
    backend.script_analyze(0, Err(server_error("model crashed")));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    session.run_primary_analysis().await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.primary_status, SlotStatus::Error);
    assert!(snapshot.primary_error.unwrap().contains("model crashed"));
    assert!(snapshot.primary_report.is_none());
}

#[tokio::test]
async fn primary_retrigger_while_loading_issues_one_call() {
    let backend = MockBackend::new();
    backend.script_analyze(50, Ok(report(0.7)));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    let (first, second) = tokio::join!(
        session.run_primary_analysis(),
        session.run_primary_analysis()
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(backend.analyze_calls(), 1);
    assert_eq!(session.snapshot().await.primary_status, SlotStatus::Success);
}

#[tokio::test]
async fn primary_can_rerun_after_failure() {
    let backend = MockBackend::new();
    backend.script_analyze(0, Err(AnalysisError::network_failure("connection refused")));
    backend.script_analyze(0, Ok(report(0.9)));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    session.run_primary_analysis().await.unwrap();
    assert_eq!(session.snapshot().await.primary_status, SlotStatus::Error);

    session.run_primary_analysis().await.unwrap();
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.primary_status, SlotStatus::Success);
    assert!(snapshot.primary_error.is_none());
    assert_eq!(backend.analyze_calls(), 2);
}

// ============================================================================
// Artifact selection
// ============================================================================

#[tokio::test]
async fn selecting_a_new_artifact_resets_the_session() {
    let backend = MockBackend::new();
    backend.script_analyze(0, Ok(report(0.3)));
    backend.script_advanced(0, Ok("adv-heatmap".to_string()));
    let session = session(&backend);

    session.select_artifact(artifact("first.png")).await;
    session.run_primary_analysis().await.unwrap();
    session.run_advanced_analysis().await.unwrap();

    let before = session.snapshot().await;
    assert_eq!(before.primary_status, SlotStatus::Success);
    assert_eq!(before.advanced_status, SlotStatus::Success);
    assert!(before.advanced_visible);

    session.select_artifact(artifact("second.png")).await;

    let after = session.snapshot().await;
    assert_eq!(after.artifact.unwrap().file_name, "second.png");
    assert_eq!(after.primary_status, SlotStatus::Idle);
    assert!(after.primary_report.is_none());
    assert!(after.primary_error.is_none());
    assert_eq!(after.advanced_status, SlotStatus::Idle);
    assert!(after.advanced_heatmap.is_none());
    assert!(!after.advanced_visible);
    assert!(!after.basic_heatmap_visible);
}

#[tokio::test]
async fn primary_response_for_a_replaced_artifact_is_discarded() {
    let backend = MockBackend::new();
    backend.script_analyze(50, Ok(report(0.9)));
    let backend_ref = backend.clone();
    let session = Arc::new(session(&backend));

    session.select_artifact(artifact("first.png")).await;

    let racer = session.clone();
    let (run, _) = tokio::join!(racer.run_primary_analysis(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.select_artifact(artifact("second.png")).await;
    });
    run.unwrap();

    // The slow response resolved after the reselection and must not leak
    // into the fresh session.
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.artifact.unwrap().file_name, "second.png");
    assert_eq!(snapshot.primary_status, SlotStatus::Idle);
    assert!(snapshot.primary_report.is_none());
    assert_eq!(backend_ref.analyze_calls(), 1);
}

// ============================================================================
// Advanced sub-machine
// ============================================================================

#[tokio::test]
async fn advanced_marks_overlay_visible_while_loading() {
    let backend = MockBackend::new();
    backend.script_advanced(100, Ok("adv".to_string()));
    let session = Arc::new(session(&backend));

    session.select_artifact(artifact("photo.png")).await;

    let runner = session.clone();
    let (run, _) = tokio::join!(runner.run_advanced_analysis(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mid_flight = session.snapshot().await;
        assert_eq!(mid_flight.advanced_status, SlotStatus::Loading);
        assert!(mid_flight.advanced_visible);
    });
    run.unwrap();

    assert_eq!(session.snapshot().await.advanced_status, SlotStatus::Success);
}

#[tokio::test]
async fn advanced_last_issued_wins_when_first_resolves_late() {
    let backend = MockBackend::new();
    backend.script_advanced(100, Ok("first".to_string()));
    backend.script_advanced(10, Ok("second".to_string()));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    let (a, b) = tokio::join!(
        session.run_advanced_analysis(),
        session.run_advanced_analysis()
    );
    a.unwrap();
    b.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.advanced_heatmap.as_deref(), Some("second"));
    assert_eq!(snapshot.advanced_status, SlotStatus::Success);
    assert!(snapshot.advanced_visible);
    assert_eq!(backend.advanced_calls(), 2);
}

#[tokio::test]
async fn advanced_last_issued_wins_when_first_resolves_early() {
    let backend = MockBackend::new();
    backend.script_advanced(10, Ok("first".to_string()));
    backend.script_advanced(100, Ok("second".to_string()));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    let (a, b) = tokio::join!(
        session.run_advanced_analysis(),
        session.run_advanced_analysis()
    );
    a.unwrap();
    b.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.advanced_heatmap.as_deref(), Some("second"));
    assert_eq!(snapshot.advanced_status, SlotStatus::Success);
}

#[tokio::test]
async fn advanced_failure_hides_overlay_and_allows_retry() {
    let backend = MockBackend::new();
    backend.script_advanced(0, Err(server_error("heatmap generation failed")));
    backend.script_advanced(0, Ok("adv".to_string()));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    session.run_advanced_analysis().await.unwrap();

    let failed = session.snapshot().await;
    assert_eq!(failed.advanced_status, SlotStatus::Error);
    assert!(!failed.advanced_visible);
    assert!(failed.advanced_heatmap.is_none());

    // Retry from the terminal error state is always allowed.
    session.run_advanced_analysis().await.unwrap();
    let retried = session.snapshot().await;
    assert_eq!(retried.advanced_status, SlotStatus::Success);
    assert!(retried.advanced_visible);
    assert_eq!(retried.advanced_heatmap.as_deref(), Some("adv"));
}

// ============================================================================
// Overlay exclusivity
// ============================================================================

#[tokio::test]
async fn overlays_are_mutually_exclusive() {
    let backend = MockBackend::new();
    backend.script_analyze(0, Ok(report(0.8)));
    backend.script_advanced(0, Ok("adv".to_string()));
    let session = session(&backend);

    session.select_artifact(artifact("photo.png")).await;
    session.run_primary_analysis().await.unwrap();

    session.toggle_basic_heatmap().await;
    assert!(session.snapshot().await.basic_heatmap_visible);

    session.run_advanced_analysis().await.unwrap();
    let snapshot = session.snapshot().await;
    assert!(snapshot.advanced_visible);
    assert!(!snapshot.basic_heatmap_visible);

    session.toggle_basic_heatmap().await;
    let snapshot = session.snapshot().await;
    assert!(snapshot.basic_heatmap_visible);
    assert!(!snapshot.advanced_visible);
}

// ============================================================================
// AppState wiring
// ============================================================================

#[tokio::test]
async fn app_state_routes_operations_to_the_injected_backend() {
    let backend = MockBackend::new();
    backend.script_analyze(0, Ok(report(0.82)));
    let state = AppState::with_backend(ClientConfig::default(), backend.clone());

    state.image_session().select_artifact(artifact("photo.png")).await;
    state.image_session().run_primary_analysis().await.unwrap();

    let snapshot = state.image_session().snapshot().await;
    assert_eq!(snapshot.primary_status, SlotStatus::Success);
    assert_eq!(backend.analyze_calls(), 1);
}
