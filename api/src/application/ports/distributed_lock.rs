use std::time::Duration;

use async_trait::async_trait;

#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Sets `key` to `owner` for `ttl` unless another owner holds it.
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> anyhow::Result<bool>;
    /// Deletes `key` only when it still belongs to `owner`.
    async fn release(&self, key: &str, owner: &str) -> anyhow::Result<bool>;
}
