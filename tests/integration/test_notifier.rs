use siteforge::core::notifier::{NotificationSender, NotifyError};
use siteforge_types::EvaluationPayload;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> EvaluationPayload {
    EvaluationPayload {
        email: "student@example.com".to_string(),
        task: "todo-app".to_string(),
        round: 1,
        nonce: "nonce-1".to_string(),
        repo_url: "https://github.com/user/todo-app-auto".to_string(),
        commit_sha: "0123456789abcdef0123456789abcdef01234567".to_string(),
        pages_url: "https://user.github.io/todo-app-auto/".to_string(),
    }
}

fn fast_sender() -> NotificationSender {
    NotificationSender::new(Duration::from_millis(1))
}

#[tokio::test]
async fn first_success_stops_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = format!("{}/callback", server.uri());
    fast_sender().send_with_retry(&url, &payload()).await.unwrap();

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn transport_failures_are_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let url = format!("{}/callback", server.uri());
    fast_sender().send_with_retry(&url, &payload()).await.unwrap();

    // Two failed attempts plus the succeeding third.
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn exhausted_backoff_reports_retries_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/callback", server.uri());
    let error = fast_sender()
        .send_with_retry(&url, &payload())
        .await
        .unwrap_err();
    assert!(matches!(error, NotifyError::RetriesExhausted));

    // Initial attempt plus the four backoff retries.
    assert_eq!(server.received_requests().await.unwrap().len(), 5);
}

#[tokio::test]
async fn notify_swallows_delivery_failure() {
    // notify never escalates, even when every attempt fails.
    fast_sender()
        .notify("http://127.0.0.1:9/callback", &payload())
        .await;
}
