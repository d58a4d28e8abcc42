use async_trait::async_trait;
use chrono::Duration;

use crate::domain::queue::token::{QueueToken, SessionInfo};

/// Waiting-room state: tokens, sessions, device bindings, the waiting line and the active set.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn find_token(&self, token: &str) -> anyhow::Result<Option<QueueToken>>;
    /// Persists the token and points the user's mapping at it.
    async fn save_token(&self, token: &QueueToken, ttl: Duration) -> anyhow::Result<()>;
    async fn token_for_user(&self, user_id: &str) -> anyhow::Result<Option<String>>;
    async fn delete_token(&self, token: &QueueToken) -> anyhow::Result<()>;

    async fn find_session(&self, user_id: &str) -> anyhow::Result<Option<SessionInfo>>;
    async fn save_session(
        &self,
        user_id: &str,
        session: &SessionInfo,
        ttl: Duration,
    ) -> anyhow::Result<()>;
    async fn delete_session(&self, user_id: &str) -> anyhow::Result<()>;

    async fn device_owner(&self, fingerprint: &str) -> anyhow::Result<Option<String>>;
    async fn bind_device(
        &self,
        fingerprint: &str,
        user_id: &str,
        ttl: Duration,
    ) -> anyhow::Result<()>;

    /// Adds the user to the line unless already present. `score` orders the line.
    async fn enqueue_waiting(&self, user_id: &str, score: i64) -> anyhow::Result<()>;
    /// Zero-based rank in the waiting line.
    async fn waiting_rank(&self, user_id: &str) -> anyhow::Result<Option<i64>>;
    async fn waiting_count(&self) -> anyhow::Result<i64>;
    /// Removes and returns up to `count` users from the head of the line.
    async fn pop_waiting(&self, count: usize) -> anyhow::Result<Vec<String>>;
    async fn remove_waiting(&self, user_id: &str) -> anyhow::Result<()>;

    async fn activate(&self, user_id: &str, ttl: Duration) -> anyhow::Result<()>;
    async fn deactivate(&self, user_id: &str) -> anyhow::Result<()>;
    async fn active_users(&self) -> anyhow::Result<Vec<String>>;
    async fn active_count(&self) -> anyhow::Result<i64>;
    /// Whether the per-user active marker is still alive.
    async fn is_marked_active(&self, user_id: &str) -> anyhow::Result<bool>;
}
