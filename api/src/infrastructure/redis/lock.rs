use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use redis::aio::ConnectionManager;

use crate::application::ports::distributed_lock::DistributedLock;

static RELEASE_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0"#,
    )
});

/// `SET NX PX` lock whose release only deletes the caller's own value.
#[derive(Clone)]
pub struct RedisLock {
    conn: ConnectionManager,
}

impl RedisLock {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn try_acquire(&self, key: &str, owner: &str, ttl: Duration) -> anyhow::Result<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(owner)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis().max(1) as u64)
            .query_async(&mut conn)
            .await
            .context("redis_lock_acquire")?;
        Ok(reply.is_some())
    }

    async fn release(&self, key: &str, owner: &str) -> anyhow::Result<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = RELEASE_SCRIPT
            .key(key)
            .arg(owner)
            .invoke_async(&mut conn)
            .await
            .context("redis_lock_release")?;
        Ok(deleted == 1)
    }
}
