//! End-to-end polling loop scenarios with scripted collaborators

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{ManualClock, RecordingMessenger, ScriptedApi, test_config};
use review_notifier::{
    Cursor, Error, HttpStatusApi, LoopState, Monitor, StatusVocabulary, monitor::diagnostic_message,
};
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn monitor(
    api: &ScriptedApi,
    messenger: &RecordingMessenger,
    clock: &ManualClock,
) -> Monitor<ScriptedApi, RecordingMessenger, ManualClock> {
    Monitor::new(&test_config(), api.clone(), messenger.clone(), clock.clone())
}

#[tokio::test]
async fn scenario_a_empty_list_advances_cursor_silently() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_ok(json!({"homeworks": [], "current_date": 2000}));

    let mut monitor = monitor(&api, &messenger, &clock)
        .with_cursor(Cursor(1000))
        .with_last_seen("reviewing");

    assert_eq!(monitor.tick().await, LoopState::Running);

    assert!(messenger.sent().is_empty());
    assert_eq!(monitor.cursor(), Cursor(2000));
    assert_eq!(monitor.last_seen(), Some("reviewing"));
    assert_eq!(api.cursors(), vec![Cursor(1000)]);
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(600)]);
}

#[tokio::test]
async fn scenario_b_status_change_is_delivered_once() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_ok(json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 3000
    }));

    let mut monitor = monitor(&api, &messenger, &clock)
        .with_cursor(Cursor(1000))
        .with_last_seen("reviewing");

    assert_eq!(monitor.tick().await, LoopState::Running);

    let verdict = StatusVocabulary::default()
        .verdict("approved")
        .unwrap()
        .to_string();
    assert_eq!(
        messenger.sent(),
        vec![(
            "424242".to_string(),
            format!("Status of review \"hw1\" changed. {verdict}")
        )]
    );
    assert_eq!(monitor.cursor(), Cursor(3000));
    assert_eq!(monitor.last_seen(), Some("approved"));
}

#[tokio::test]
async fn scenario_c_network_error_is_reported_and_polling_continues() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_err(Error::network("connection refused"));
    api.push_ok(json!({"homeworks": [], "current_date": 1600}));

    let mut monitor = monitor(&api, &messenger, &clock).with_cursor(Cursor(1000));

    assert_eq!(monitor.tick().await, LoopState::Degraded);
    assert_eq!(monitor.cursor(), Cursor(1000));
    assert_eq!(
        messenger.texts(),
        vec!["Program failure: network error: connection refused".to_string()]
    );
    assert_eq!(clock.sleeps().len(), 1);

    assert_eq!(monitor.tick().await, LoopState::Running);
    assert_eq!(monitor.cursor(), Cursor(1600));
    assert_eq!(api.cursors(), vec![Cursor(1000), Cursor(1000)]);
}

#[tokio::test]
async fn scenario_d_server_error_carries_code_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "internal"})))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.endpoint = format!("{}/api/user_api/homework_statuses/", server.uri());
    let messenger = RecordingMessenger::new();
    let clock = ManualClock::at(1000);
    let mut monitor = Monitor::new(
        &config,
        HttpStatusApi::new(&config).unwrap(),
        messenger.clone(),
        clock.clone(),
    );

    assert_eq!(monitor.tick().await, LoopState::Degraded);
    assert_eq!(monitor.tick().await, LoopState::Degraded);

    let texts = messenger.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("500"), "{}", texts[0]);
    assert!(texts[0].contains("internal"), "{}", texts[0]);
    assert_eq!(monitor.cursor(), Cursor(1000));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_identical_status_notifies_once() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    for date in [1100, 1200, 1300] {
        api.push_ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
            "current_date": date
        }));
    }

    let mut monitor = monitor(&api, &messenger, &clock).with_cursor(Cursor(1000));
    for _ in 0..3 {
        assert_eq!(monitor.tick().await, LoopState::Running);
    }

    assert_eq!(messenger.sent().len(), 1);
    assert_eq!(monitor.cursor(), Cursor(1300));
    assert_eq!(
        api.cursors(),
        vec![Cursor(1000), Cursor(1100), Cursor(1200)]
    );
}

#[tokio::test]
async fn missing_homeworks_sends_only_a_diagnostic() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_ok(json!({"current_date": 2000}));

    let mut monitor = monitor(&api, &messenger, &clock)
        .with_cursor(Cursor(1000))
        .with_last_seen("reviewing");

    assert_eq!(monitor.tick().await, LoopState::Degraded);
    assert_eq!(
        messenger.texts(),
        vec!["Program failure: invalid response schema: homeworks-not-a-list".to_string()]
    );
    assert_eq!(monitor.cursor(), Cursor(1000));
    assert_eq!(monitor.last_seen(), Some("reviewing"));
}

#[tokio::test]
async fn broken_older_record_does_not_block_newest_status() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_ok(json!({
        "homeworks": [
            {"homework_name": "hw2", "status": "approved"},
            {"homework_name": null, "status": "approved"}
        ],
        "current_date": 2000
    }));

    let mut monitor = monitor(&api, &messenger, &clock)
        .with_cursor(Cursor(1000))
        .with_last_seen("reviewing");

    assert_eq!(monitor.tick().await, LoopState::Running);

    let texts = messenger.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Status of review \"hw2\" changed."), "{}", texts[0]);
    assert_eq!(monitor.cursor(), Cursor(2000));
    assert_eq!(monitor.last_seen(), Some("approved"));
}

#[tokio::test]
async fn unknown_status_never_produces_a_status_message() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_ok(json!({
        "homeworks": [{"homework_name": "hw1", "status": "on_hold"}],
        "current_date": 2000
    }));

    let mut monitor = monitor(&api, &messenger, &clock).with_cursor(Cursor(1000));

    assert_eq!(monitor.tick().await, LoopState::Degraded);
    let texts = messenger.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Program failure: unknown review status"));
    assert!(!texts[0].contains("changed"));
    assert_eq!(monitor.cursor(), Cursor(1000));
    assert_eq!(monitor.last_seen(), None);
}

#[tokio::test]
async fn missing_current_date_leaves_cursor_unchanged() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_ok(json!({"homeworks": []}));

    let mut monitor = monitor(&api, &messenger, &clock).with_cursor(Cursor(1000));

    assert_eq!(monitor.tick().await, LoopState::Running);
    assert_eq!(monitor.cursor(), Cursor(1000));
}

#[tokio::test]
async fn failed_delivery_is_retried_next_cycle() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    let change = json!({
        "homeworks": [{"homework_name": "hw1", "status": "rejected"}],
        "current_date": 2000
    });
    api.push_ok(change.clone());
    api.push_ok(change);
    // Status update and its diagnostic both fail
    messenger.fail_next(2);

    let mut monitor = monitor(&api, &messenger, &clock)
        .with_cursor(Cursor(1000))
        .with_last_seen("reviewing");

    assert_eq!(monitor.tick().await, LoopState::Degraded);
    assert!(messenger.sent().is_empty());
    assert_eq!(monitor.last_seen(), Some("reviewing"));
    assert_eq!(monitor.cursor(), Cursor(1000));

    assert_eq!(monitor.tick().await, LoopState::Running);
    let texts = messenger.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("Status of review \"hw1\" changed."));
    assert_eq!(monitor.last_seen(), Some("rejected"));
    assert_eq!(monitor.cursor(), Cursor(2000));
    assert_eq!(messenger.attempts(), 3);
}

#[tokio::test]
async fn cursor_starts_at_clock_time() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(1_700_000_000));

    let mut monitor = monitor(&api, &messenger, &clock);
    assert_eq!(monitor.cursor(), Cursor(1_700_000_000));

    monitor.run_cycle().await;
    assert_eq!(api.cursors(), vec![Cursor(1_700_000_000)]);
    assert!(clock.sleeps().is_empty(), "run_cycle must not sleep");
}

#[tokio::test]
async fn diagnostic_text_matches_rendered_error() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_err(Error::malformed("expected value at line 1 column 1"));

    let mut monitor = monitor(&api, &messenger, &clock);
    monitor.run_cycle().await;

    let expected = diagnostic_message(&Error::malformed("expected value at line 1 column 1"));
    assert_eq!(messenger.texts(), vec![expected]);
}

#[tokio::test]
async fn run_stops_when_cancelled_during_sleep() {
    let (api, messenger) = (ScriptedApi::new(), RecordingMessenger::new());
    let shutdown = CancellationToken::new();
    let clock = ManualClock::at(0).cancel_after(3, shutdown.clone());

    let monitor = monitor(&api, &messenger, &clock);
    let state = tokio::time::timeout(Duration::from_secs(5), monitor.run(shutdown))
        .await
        .expect("monitor did not stop");

    assert_eq!(state, LoopState::Running);
    assert_eq!(api.cursors().len(), 3);
    assert_eq!(clock.sleeps().len(), 3);
}

#[tokio::test]
async fn run_with_cancelled_token_does_not_poll() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    let state = monitor(&api, &messenger, &clock).run(shutdown).await;

    assert_eq!(state, LoopState::Running);
    assert!(api.cursors().is_empty());
}

#[tokio::test]
async fn non_retryable_error_stops_the_loop() {
    let (api, messenger) = (ScriptedApi::new(), RecordingMessenger::new());
    let shutdown = CancellationToken::new();
    let clock = ManualClock::at(0).cancel_after(10, shutdown.clone());
    api.push_ok(json!({"homeworks": [], "current_date": 1500}));
    api.push_err(Error::invalid_config("status API rejected the OAuth scheme"));

    let monitor = monitor(&api, &messenger, &clock).with_cursor(Cursor(1000));
    let state = tokio::time::timeout(Duration::from_secs(5), monitor.run(shutdown.clone()))
        .await
        .expect("monitor did not stop");

    assert_eq!(state, LoopState::Fatal);
    assert!(!shutdown.is_cancelled());
    assert_eq!(api.cursors(), vec![Cursor(1000), Cursor(1500)]);
    assert_eq!(clock.sleeps().len(), 1);
    assert_eq!(
        messenger.texts(),
        vec!["Program failure: configuration error: status API rejected the OAuth scheme".to_string()]
    );
}

#[tokio::test]
async fn fatal_tick_skips_the_sleep() {
    let (api, messenger, clock) = (ScriptedApi::new(), RecordingMessenger::new(), ManualClock::at(0));
    api.push_err(Error::missing_config(vec!["TELEGRAM_TOKEN".into()]));

    let mut monitor = monitor(&api, &messenger, &clock);

    assert_eq!(monitor.tick().await, LoopState::Fatal);
    assert_eq!(monitor.state(), LoopState::Fatal);
    assert!(clock.sleeps().is_empty());
}
