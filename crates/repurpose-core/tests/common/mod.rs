#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::MockServer;

use repurpose_core::auth::RecordingNavigator;
use repurpose_core::storage::{MemoryStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_EMAIL_KEY};
use repurpose_core::{ApiClient, RefreshPolicy, SessionContext};

/// A gateway client wired to a mock backend and in-memory session.
pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub api: ApiClient,
}

impl Harness {
    pub async fn start(entries: &[(&str, &str)]) -> Self {
        Self::with_policy(entries, RefreshPolicy::PerRequest).await
    }

    pub async fn with_policy(entries: &[(&str, &str)], policy: RefreshPolicy) -> Self {
        let server = MockServer::start().await;
        let storage = Arc::new(MemoryStorage::with_entries(entries.iter().copied()));
        let navigator = Arc::new(RecordingNavigator::new());
        let session = SessionContext::new(storage.clone(), navigator.clone());
        let api = ApiClient::new(server.uri(), session)
            .expect("client should build")
            .with_refresh_policy(policy);
        Self {
            server,
            storage,
            navigator,
            api,
        }
    }

    /// Session with access token A and refresh token B.
    pub async fn logged_in() -> Self {
        Self::start(&[
            (ACCESS_TOKEN_KEY, "A"),
            (REFRESH_TOKEN_KEY, "B"),
            (USER_EMAIL_KEY, "ada@example.com"),
        ])
        .await
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

pub fn user_json() -> Value {
    json!({
        "id": 7,
        "email": "ada@example.com",
        "username": "ada",
        "created_at": "2024-03-01T09:30:00",
        "plan": "pro",
        "is_active": true
    })
}

pub fn content_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "user_id": 7,
        "title": title,
        "original_content": "Rust makes systems programming approachable.",
        "content_type": "text",
        "word_count": 5,
        "created_at": "2024-03-02T10:00:00"
    })
}

pub fn generation_json(id: i64, content_id: i64, platform: &str) -> Value {
    json!({
        "id": id,
        "content_id": content_id,
        "platform": platform,
        "generated_text": "Ship it.",
        "tone": "Casual",
        "created_at": "2024-03-02T10:05:00"
    })
}
