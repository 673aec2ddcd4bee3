//! Retry loop integration tests
//!
//! Drives `VideoGenerator` end to end against a scripted transport. Cookie
//! selection is random, so scripts are keyed by call order and assertions
//! look at which cookie each call actually used.

mod common;

use chrono::{TimeDelta, Utc};
use common::helpers::*;
use genspark2api::{Error, VideoGenerationRequest, VideoGenerator};
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio_test::assert_ok;

fn request() -> VideoGenerationRequest {
    VideoGenerationRequest::new("sora-2", "a cat surfing a wave")
}

#[tokio::test]
async fn test_rate_limited_then_logged_out_then_success() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(RATE_LIMIT_REPLY)
            .reply(NOT_LOGIN_REPLY)
            .reply(task_reply("proj-1", &["task-1"]))
            .stream(success_stream("task-1", "https://cdn.example/v1.mp4")),
    );
    let settings = create_test_settings(&["cookie=a", "cookie=b", "cookie=c"]);
    let generator = VideoGenerator::with_transport(&settings, transport.clone());

    let response = assert_ok!(generator.generate(&request()).await);
    assert_eq!(response.urls(), vec!["https://cdn.example/v1.mp4"]);
    assert_eq!(response.data[0].revised_prompt, "a cat surfing a wave");

    let used = transport.submitted_credentials();
    assert_eq!(used.len(), 3);
    assert_eq!(used.iter().collect::<HashSet<_>>().len(), 3);

    let ledger = generator.pool().ledger();
    assert_eq!(ledger.len().await, 1);
    assert!(ledger.deadline(&used[0]).await.is_some());
    assert!(ledger.deadline(&used[1]).await.is_none());
    assert!(ledger.deadline(&used[2]).await.is_none());
}

#[tokio::test]
async fn test_single_cookie_rate_limit_is_terminal() {
    let transport = Arc::new(ScriptedTransport::new().reply(RATE_LIMIT_REPLY));
    let generator =
        VideoGenerator::with_transport(&create_test_settings(&["cookie=a"]), transport.clone());

    let before = Utc::now();
    let error = generator.generate(&request()).await.unwrap_err();

    assert!(matches!(error, Error::BackendRejection { .. }));
    assert!(error.to_string().starts_with("rate limit reached: "));
    assert_eq!(transport.submit_count(), 1);

    let deadline = generator
        .pool()
        .ledger()
        .deadline(&transport.submitted_credentials()[0])
        .await
        .unwrap();
    assert!(deadline > before);
}

#[tokio::test]
async fn test_single_cookie_not_login_is_terminal_without_cooldown() {
    let transport = Arc::new(ScriptedTransport::new().reply(NOT_LOGIN_REPLY));
    let generator =
        VideoGenerator::with_transport(&create_test_settings(&["cookie=a"]), transport.clone());

    let error = generator.generate(&request()).await.unwrap_err();

    assert_eq!(error.to_string(), format!("cookie not login: {}", NOT_LOGIN_REPLY));
    assert_eq!(transport.submit_count(), 1);
    assert!(generator.pool().ledger().is_empty().await);
}

#[tokio::test]
async fn test_free_tier_cooldown_is_a_full_day() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(FREE_TIER_REPLY)
            .reply(RATE_LIMIT_REPLY),
    );
    let generator = VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a", "cookie=b"]),
        transport.clone(),
    );

    let error = generator.generate(&request()).await.unwrap_err();
    match &error {
        Error::CredentialsExhausted { last_error } => {
            assert!(last_error.as_deref().unwrap().starts_with("rate limit reached"));
        }
        other => panic!("unexpected error: {other}"),
    }

    let used = transport.submitted_credentials();
    let ledger = generator.pool().ledger();
    let free_tier = ledger.deadline(&used[0]).await.unwrap();
    let rate_limit = ledger.deadline(&used[1]).await.unwrap();
    assert!(free_tier - rate_limit > TimeDelta::hours(23));
}

#[tokio::test]
async fn test_never_repeats_a_cookie() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(RATE_LIMIT_REPLY)
            .reply(RATE_LIMIT_REPLY)
            .reply(RATE_LIMIT_REPLY)
            .reply(RATE_LIMIT_REPLY),
    );
    let generator = VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a", "cookie=b", "cookie=c"]),
        transport.clone(),
    );

    let error = generator.generate(&request()).await.unwrap_err();
    assert!(error.to_string().starts_with("all attempts failed: rate limit reached"));

    let used = transport.submitted_credentials();
    assert_eq!(used.len(), 3);
    assert_eq!(used.iter().collect::<HashSet<_>>().len(), 3);
    assert_eq!(generator.pool().ledger().len().await, 3);
}

#[tokio::test]
async fn test_attempts_capped_by_configured_maximum() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(NOT_LOGIN_REPLY)
            .reply(NOT_LOGIN_REPLY)
            .reply(NOT_LOGIN_REPLY),
    );
    let mut settings = create_test_settings(&["cookie=a", "cookie=b", "cookie=c"]);
    settings.retry.max_attempts = 2;
    let generator = VideoGenerator::with_transport(&settings, transport.clone());

    let error = generator.generate(&request()).await.unwrap_err();
    assert!(matches!(error, Error::CredentialsExhausted { .. }));
    assert_eq!(transport.submit_count(), 2);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::new().reply(SERVER_ERROR_REPLY));
    let generator = VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a", "cookie=b", "cookie=c"]),
        transport.clone(),
    );

    let error = generator.generate(&request()).await.unwrap_err();
    assert!(matches!(error, Error::BackendFatal { .. }));
    assert!(error.to_string().starts_with("server error: "));
    assert_eq!(transport.submit_count(), 1);
}

#[tokio::test]
async fn test_missing_task_ids_moves_to_next_cookie() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply("data: {\"type\":\"message_result\",\"content\":\"thinking\"}\n\n")
            .reply(task_reply("proj-2", &["task-2"]))
            .stream(success_stream("task-2", "https://cdn.example/v2.mp4")),
    );
    let generator = VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a", "cookie=b"]),
        transport.clone(),
    );

    let response = generator.generate(&request()).await.unwrap();
    assert_eq!(response.urls(), vec!["https://cdn.example/v2.mp4"]);
    assert_eq!(transport.submit_count(), 2);
    assert!(generator.pool().ledger().is_empty().await);
}

#[tokio::test]
async fn test_failed_tasks_move_to_next_cookie() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(task_reply("proj-1", &["task-1"]))
            .stream(failure_stream("task-1", "moderation"))
            .reply(task_reply("proj-2", &["task-2"]))
            .stream(success_stream("task-2", "https://cdn.example/v2.mp4")),
    );
    let generator = VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a", "cookie=b"]),
        transport.clone(),
    );

    let response = generator.generate(&request()).await.unwrap();
    assert_eq!(response.urls(), vec!["https://cdn.example/v2.mp4"]);
}

#[tokio::test]
async fn test_single_cookie_failed_task_reports_diagnostic() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(task_reply("proj-1", &["task-1"]))
            .stream(failure_stream("task-1", "moderation")),
    );
    let generator =
        VideoGenerator::with_transport(&create_test_settings(&["cookie=a"]), transport.clone());

    let error = generator.generate(&request()).await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "video generation failed: task task-1 status: FAILED, error: moderation"
    );
}

#[tokio::test]
async fn test_unknown_model_makes_no_network_call() {
    let transport = Arc::new(ScriptedTransport::new());
    let generator =
        VideoGenerator::with_transport(&create_test_settings(&["cookie=a"]), transport.clone());

    let error = generator
        .generate(&VideoGenerationRequest::new("not-a-model", "a cat"))
        .await
        .unwrap_err();
    assert!(error.is_client_error());
    assert_eq!(transport.submit_count(), 0);
}

#[tokio::test]
async fn test_cooling_down_cookie_is_not_selected() {
    let transport = Arc::new(ScriptedTransport::new().reply(RATE_LIMIT_REPLY));
    let generator =
        VideoGenerator::with_transport(&create_test_settings(&["cookie=a"]), transport.clone());

    assert!(generator.generate(&request()).await.is_err());
    assert_eq!(generator.cooling_down().await, 1);

    let error = generator.generate(&request()).await.unwrap_err();
    assert!(matches!(error, Error::NoEligibleCredential));
    assert_eq!(transport.submit_count(), 1);
}

#[tokio::test]
async fn test_auto_delete_cleans_up_project() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(task_reply("proj-9", &["task-9"]))
            .stream(success_stream("task-9", "https://cdn.example/v9.mp4")),
    );
    let mut settings = create_test_settings(&["cookie=a"]);
    settings.session.auto_delete = true;
    let generator = VideoGenerator::with_transport(&settings, transport.clone());

    generator.generate(&request()).await.unwrap();

    // Cleanup runs on a detached task
    for _ in 0..50 {
        if !transport.deleted_projects().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(transport.deleted_projects(), vec!["proj-9".to_string()]);
}

#[tokio::test]
async fn test_reference_image_and_chat_id_in_submission() {
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    let transport = Arc::new(
        ScriptedTransport::new()
            .image(png)
            .reply(task_reply("proj-1", &["task-1"]))
            .stream(success_stream("task-1", "https://cdn.example/v1.mp4")),
    );
    let mut settings = create_test_settings(&["cookie=a"]);
    settings
        .credentials
        .chat_ids
        .insert("cookie=a".to_string(), "chat-42".to_string());
    let generator = VideoGenerator::with_transport(&settings, transport.clone());

    let request = request().with_image("https://example.com/cat.png");
    generator.generate(&request).await.unwrap();

    let body: serde_json::Value =
        serde_json::from_str(&transport.submitted_bodies()[0]).unwrap();
    assert_eq!(
        body["current_query_string"],
        "id=chat-42&type=COPILOT_MOA_VIDEO"
    );
    let image_url = body["messages"][0]["content"][0]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(image_url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_image_download_failure_is_terminal() {
    let transport = Arc::new(ScriptedTransport::new());
    let generator = VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a", "cookie=b"]),
        transport.clone(),
    );

    let request = request().with_image("https://example.com/missing.png");
    let error = generator.generate(&request).await.unwrap_err();
    assert!(matches!(error, Error::Transport(_)));
    assert_eq!(transport.submit_count(), 0);
}

async fn wait_for_stream(transport: &ScriptedTransport) {
    for _ in 0..100 {
        if transport.opened_streams() > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("status stream was never opened");
}

#[tokio::test]
async fn test_aborting_generation_closes_status_stream() {
    let closed = Arc::new(AtomicBool::new(false));
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(task_reply("proj-1", &["task-1"]))
            .hanging_stream(closed.clone()),
    );
    let generator = Arc::new(VideoGenerator::with_transport(
        &create_test_settings(&["cookie=a"]),
        transport.clone(),
    ));

    let handle = tokio::spawn({
        let generator = generator.clone();
        async move { generator.generate(&request()).await }
    });
    wait_for_stream(&transport).await;
    assert!(!closed.load(Ordering::SeqCst));

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
    assert!(closed.load(Ordering::SeqCst));
    assert!(transport.deleted_projects().is_empty());
}

#[tokio::test]
async fn test_caller_timeout_closes_status_stream() {
    let closed = Arc::new(AtomicBool::new(false));
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply(task_reply("proj-1", &["task-1"]))
            .hanging_stream(closed.clone()),
    );
    let generator =
        VideoGenerator::with_transport(&create_test_settings(&["cookie=a"]), transport.clone());

    let outcome = tokio::time::timeout(Duration::from_millis(100), generator.generate(&request())).await;

    assert!(outcome.is_err());
    assert_eq!(transport.opened_streams(), 1);
    assert!(closed.load(Ordering::SeqCst));
}
