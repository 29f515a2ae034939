//! Shared fixtures for slash-command integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use slack_retry_source::{
    DispatchConfig, Dispatcher,
    publisher::{JobPublisher, PublishError},
    secrets::{SecretError, SecretProvider},
    server,
    signature::expected_signature,
};
use tower::ServiceExt;

pub const SECRET: &str = "test-signing-secret";
pub const CHANNEL: &str = "C1";
pub const TOPIC: &str = "slack.retry_sync.requested";
pub const PATH: &str = "/slack/retry";

/// Secret store that counts lookups.
#[derive(Default)]
pub struct FakeSecrets {
    pub calls: AtomicUsize,
}

impl FakeSecrets {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretProvider for FakeSecrets {
    async fn get_secret(&self, _name: &str) -> Result<String, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SECRET.to_string())
    }
}

/// Publisher that records every job.
#[derive(Default)]
pub struct FakePublisher {
    pub jobs: Mutex<Vec<(String, Value)>>,
}

impl FakePublisher {
    pub fn jobs(&self) -> Vec<(String, Value)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobPublisher for FakePublisher {
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), PublishError> {
        self.jobs.lock().unwrap().push((topic.to_string(), payload));
        Ok(())
    }
}

/// Router wired to in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub secrets: Arc<FakeSecrets>,
    pub publisher: Arc<FakePublisher>,
}

impl TestApp {
    pub fn new() -> Self {
        let secrets = Arc::new(FakeSecrets::default());
        let publisher = Arc::new(FakePublisher::default());
        let dispatcher = Dispatcher::new(
            DispatchConfig {
                authorized_channel_id: CHANNEL.to_string(),
                topic: TOPIC.to_string(),
                secret_name: "retry_sync_slackapp_secret".to_string(),
            },
            secrets.clone(),
            publisher.clone(),
        );
        Self {
            router: server::router(PATH, dispatcher),
            secrets,
            publisher,
        }
    }

    /// Sends a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Posts `body` signed with the test secret at `timestamp`.
    pub async fn post_signed(&self, body: &str, timestamp: i64) -> (StatusCode, String) {
        let timestamp = timestamp.to_string();
        let signature = expected_signature(SECRET, &timestamp, body.as_bytes()).unwrap();
        self.post(body, Some(&signature), Some(&timestamp)).await
    }

    /// Posts `body` with the given Slack headers.
    pub async fn post(
        &self,
        body: &str,
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(PATH)
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(signature) = signature {
            builder = builder.header("X-Slack-Signature", signature);
        }
        if let Some(timestamp) = timestamp {
            builder = builder.header("X-Slack-Request-Timestamp", timestamp);
        }
        let response = self
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await;
        read(response).await
    }
}

/// Splits a response into status and body text.
pub async fn read(response: Response<Body>) -> (StatusCode, String) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Current time in whole seconds.
pub fn now() -> i64 {
    slack_retry_source::server::unix_now() as i64
}
