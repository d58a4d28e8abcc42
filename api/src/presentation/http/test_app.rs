//! Routers wired to the in-memory ports, for handler tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use tower::ServiceExt;

use crate::application::test_support::{
    MemoryLock, MemoryQueueStore, MemoryRankingStore, MemoryStore, RecordingNotifier,
    RecordingPublisher,
};
use crate::bootstrap::app_context::{AppContext, AppServices};
use crate::bootstrap::config::Config;
use crate::domain::queue::token::QueueToken;
use crate::infrastructure::events::broadcast_bus::BroadcastEventBus;

pub fn test_config() -> Config {
    Config {
        api_port: 0,
        frontend_url: None,
        database_url: String::new(),
        database_max_connections: 1,
        redis_url: String::new(),
        cluster_mode: false,
        event_stream_prefix: "test:events".into(),
        event_stream_max_len: 100,
        queue_max_active_users: 100,
        queue_token_expire_minutes: 30,
        queue_wait_secs_per_user: 10,
        queue_lock_timeout_secs: 5,
        queue_activation_interval_secs: 5,
        reservation_hold_minutes: 5,
        reservation_sweep_interval_secs: 30,
        data_platform_url: None,
        data_retry_interval_secs: 600,
        data_retry_max_attempts: 3,
        is_production: false,
    }
}

pub struct TestApp {
    pub ctx: AppContext,
    pub store: Arc<MemoryStore>,
    pub queue: Arc<MemoryQueueStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let queue = Arc::new(MemoryQueueStore::default());
        let services = AppServices::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            queue.clone(),
            Arc::new(MemoryLock::default()),
            Arc::new(MemoryRankingStore::default()),
            Arc::new(RecordingPublisher::default()),
            Arc::new(BroadcastEventBus::new(16)),
            Arc::new(RecordingNotifier::default()),
            None,
        );
        TestApp {
            ctx: AppContext::new(test_config(), services),
            store,
            queue,
        }
    }

    /// Stores an active token for `user_id` and returns its value.
    pub fn active_token(&self, user_id: &str) -> String {
        let token = QueueToken::active(user_id, Utc::now(), Duration::minutes(30));
        self.queue.put_token(token.clone());
        token.token
    }

    pub fn waiting_token(&self, user_id: &str) -> String {
        let token = QueueToken::waiting(user_id, 4, 1, Utc::now(), Duration::minutes(30));
        self.queue.put_token(token.clone());
        token.token
    }
}

/// Sends one request and decodes the JSON envelope.
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
