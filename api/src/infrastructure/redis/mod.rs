use anyhow::Context;
use redis::aio::ConnectionManager;

pub mod event_bus;
pub mod lock;
pub mod queue_store;
pub mod ranking_store;

pub async fn connect(url: &str) -> anyhow::Result<(redis::Client, ConnectionManager)> {
    let client = redis::Client::open(url).context("redis_client_open")?;
    let manager = ConnectionManager::new(client.clone())
        .await
        .context("redis_connection_manager")?;
    Ok((client, manager))
}

pub(crate) fn ttl_secs(ttl: chrono::Duration) -> i64 {
    ttl.num_seconds().max(1)
}
