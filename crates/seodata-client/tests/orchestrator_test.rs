//! TaskOrchestrator behavior under a paused tokio clock.

mod common;

use std::time::Duration;

use seodata_client::{
    ApiRequest, ClientConfig, ClientError, HttpResponse, NoopProgress, ParameterBag,
    PollingConfig, TaskOrchestrator, TaskOutcome, TaskPhase,
};

use common::{
    executor_with, executor_with_config, fast_options, ok, CollectingProgress, ScriptedTransport,
};

const SUBMIT_OK: &str = r#"{"tasks":[{"id":9001,"query":"rust seo"}]}"#;

fn submit() -> ApiRequest {
    ApiRequest::post(
        "/serp/classic/tasks",
        ParameterBag::new().with("query", "rust seo"),
    )
    .json()
}

fn poll(task_id: &str) -> ApiRequest {
    ApiRequest::get(
        "/serp/classic/tasks/{task_id}",
        ParameterBag::new().with("task_id", task_id),
    )
}

#[tokio::test(start_paused = true)]
async fn test_completes_after_three_polls_with_monotonic_progress() {
    let transport = ScriptedTransport::new(
        SUBMIT_OK,
        &[
            r#"{"status":"processing"}"#,
            r#"{"status":"processing"}"#,
            r#"{"status":"complete","results":[{"position":1}]}"#,
        ],
    );
    let orchestrator = TaskOrchestrator::new(executor_with(transport.clone()));
    let progress = CollectingProgress::default();

    let outcome = orchestrator
        .run(submit(), poll, fast_options(50, 10_000), &progress)
        .await
        .unwrap();

    match &outcome {
        TaskOutcome::Completed {
            task_id,
            attempts,
            elapsed,
            payload,
        } => {
            assert_eq!(task_id, "9001");
            assert_eq!(*attempts, 3);
            assert_eq!(*elapsed, Duration::from_millis(150));
            assert_eq!(payload.json().unwrap()["results"][0]["position"], 1);
        }
        other => panic!("Expected Completed, got {:?}", other),
    }
    assert_eq!(transport.submit_calls(), 1);
    assert_eq!(transport.poll_calls(), 3);
    assert!(transport
        .urls()
        .iter()
        .skip(1)
        .all(|u| u == "https://api.example.com/v1/serp/classic/tasks/9001"));

    let values = progress.values();
    assert_eq!(values.first(), Some(&0));
    assert_eq!(values.get(1), Some(&10));
    assert_eq!(values.last(), Some(&100));
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{:?}", values);
    assert!(progress.events().iter().all(|e| e.total == 100));
    assert!(progress.events()[2].message.contains("Attempt 1"));

    let rendered = outcome.into_result().json().unwrap();
    assert_eq!(rendered["status"], "completed");
    assert_eq!(rendered["attempts"], 3);
}

#[tokio::test(start_paused = true)]
async fn test_first_poll_done_finishes_on_attempt_one() {
    let transport = ScriptedTransport::new(SUBMIT_OK, &[r#"{"status":"complete"}"#]);
    let orchestrator = TaskOrchestrator::new(executor_with(transport.clone()));

    let outcome = orchestrator
        .run(submit(), poll, fast_options(50, 10_000), &NoopProgress)
        .await
        .unwrap();

    assert_eq!(outcome.phase(), TaskPhase::Completed);
    assert!(matches!(outcome, TaskOutcome::Completed { attempts: 1, .. }));
    assert_eq!(transport.poll_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_non_json_poll_response_counts_as_done() {
    let transport = ScriptedTransport::new(SUBMIT_OK, &["position,url\n1,https://a\n"]);
    let orchestrator = TaskOrchestrator::new(executor_with(transport));

    let outcome = orchestrator
        .run(submit(), poll, fast_options(50, 10_000), &NoopProgress)
        .await
        .unwrap();

    let rendered = outcome.into_result().json().unwrap();
    assert_eq!(rendered["result"], "position,url\n1,https://a\n");
}

#[tokio::test(start_paused = true)]
async fn test_times_out_after_about_four_polls() {
    let transport = ScriptedTransport::new(SUBMIT_OK, &[r#"{"status":"processing"}"#]);
    let orchestrator = TaskOrchestrator::new(executor_with(transport.clone()));
    let progress = CollectingProgress::default();

    let outcome = orchestrator
        .run(submit(), poll, fast_options(50, 200), &progress)
        .await
        .expect("timeout is a result, not an error");

    match &outcome {
        TaskOutcome::TimedOut {
            task_id,
            attempts,
            last_status,
            ..
        } => {
            assert_eq!(task_id, "9001");
            assert!((3..=5).contains(attempts), "attempts = {}", attempts);
            assert_eq!(last_status.as_deref(), Some("processing"));
        }
        other => panic!("Expected TimedOut, got {:?}", other),
    }
    assert_eq!(transport.poll_calls(), 4);

    let values = progress.values();
    assert_eq!(values.last(), Some(&100));
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(values[2..values.len() - 1].iter().all(|v| (10..=90).contains(v)));

    let rendered = outcome.into_result().json().unwrap();
    assert_eq!(rendered["status"], "timeout");
    assert_eq!(rendered["task_id"], "9001");
}

#[tokio::test(start_paused = true)]
async fn test_submission_without_task_id_never_polls() {
    let transport = ScriptedTransport::new(r#"{"tasks":[]}"#, &[r#"{"status":"complete"}"#]);
    let orchestrator = TaskOrchestrator::new(executor_with(transport.clone()));
    let progress = CollectingProgress::default();

    let outcome = orchestrator
        .run(submit(), poll, fast_options(50, 200), &progress)
        .await
        .unwrap();

    assert_eq!(outcome.phase(), TaskPhase::SubmissionFailed);
    assert!(outcome.task_id().is_none());
    assert_eq!(transport.poll_calls(), 0);
    assert_eq!(progress.values(), vec![0]);

    let rendered = outcome.into_result().json().unwrap();
    assert_eq!(rendered["status"], "submission_failed");
    assert_eq!(rendered["response"]["tasks"], serde_json::json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_poll_is_cut_off_by_hard_deadline() {
    let transport = ScriptedTransport::hanging(SUBMIT_OK);
    let orchestrator = TaskOrchestrator::new(executor_with(transport.clone()));

    let outcome = orchestrator
        .run(submit(), poll, fast_options(50, 200), &NoopProgress)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        TaskOutcome::TimedOut {
            attempts: 1,
            last_status: None,
            ..
        }
    ));
    assert_eq!(transport.poll_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_http_error_while_polling_propagates() {
    let transport = ScriptedTransport::with_poll_responses(
        SUBMIT_OK,
        vec![
            ok(r#"{"status":"processing"}"#),
            HttpResponse {
                status: 500,
                body: "upstream exploded".into(),
            },
        ],
    );
    let orchestrator = TaskOrchestrator::new(executor_with(transport.clone()));

    let err = orchestrator
        .run(submit(), poll, fast_options(50, 10_000), &NoopProgress)
        .await
        .unwrap_err();

    match err {
        ClientError::HttpError { status, url, body } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/serp/classic/tasks/9001"));
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("Expected HttpError, got {:?}", other),
    }
    assert_eq!(transport.poll_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_interval_longer_than_wait_still_polls_once() {
    let transport = ScriptedTransport::new(SUBMIT_OK, &[r#"{"status":"complete"}"#]);
    let config = ClientConfig {
        base_url: "https://api.example.com/v1".into(),
        timeout_ms: 5_000,
        ..Default::default()
    };
    let orchestrator = TaskOrchestrator::new(executor_with_config(transport.clone(), config));
    // Both values sit inside the production bounds.
    let options = PollingConfig::default().options(Some(30_000), Some(10_000));

    let outcome = orchestrator
        .run(submit(), poll, options, &NoopProgress)
        .await
        .unwrap();

    match outcome {
        TaskOutcome::Completed {
            attempts, elapsed, ..
        } => {
            assert_eq!(attempts, 1);
            assert_eq!(elapsed, Duration::from_secs(30));
        }
        other => panic!("Expected Completed, got {:?}", other),
    }
    assert_eq!(transport.poll_calls(), 1);
}
