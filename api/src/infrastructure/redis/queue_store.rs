use anyhow::Context;
use async_trait::async_trait;
use chrono::Duration;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::application::ports::queue_store::QueueStore;
use crate::domain::queue::token::{QueueToken, SessionInfo};
use crate::infrastructure::redis::ttl_secs;

const WAITING_KEY: &str = "queue:waiting";
const ACTIVE_KEY: &str = "queue:active";

fn token_key(token: &str) -> String {
    format!("queue:token:{token}")
}

fn user_token_key(user_id: &str) -> String {
    format!("queue:user:token:{user_id}")
}

fn active_marker_key(user_id: &str) -> String {
    format!("queue:user:active:{user_id}")
}

fn session_key(user_id: &str) -> String {
    format!("queue:session:{user_id}")
}

fn device_key(fingerprint: &str) -> String {
    format!("queue:device:{fingerprint}")
}

#[derive(Clone)]
pub struct RedisQueueStore {
    conn: ConnectionManager,
}

impl RedisQueueStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn find_token(&self, token: &str) -> anyhow::Result<Option<QueueToken>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(token_key(token)).await.context("redis_get_token")?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save_token(&self, token: &QueueToken, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(token)?;
        let secs = ttl_secs(ttl);
        let _: () = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(token_key(&token.token))
            .arg(json)
            .arg("EX")
            .arg(secs)
            .ignore()
            .cmd("SET")
            .arg(user_token_key(&token.user_id))
            .arg(&token.token)
            .arg("EX")
            .arg(secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .context("redis_save_token")?;
        Ok(())
    }

    async fn token_for_user(&self, user_id: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.conn.clone();
        let token: Option<String> = conn
            .get(user_token_key(user_id))
            .await
            .context("redis_get_user_token")?;
        Ok(token)
    }

    async fn delete_token(&self, token: &QueueToken) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .del(token_key(&token.token))
            .await
            .context("redis_del_token")?;
        let mapped: Option<String> = conn.get(user_token_key(&token.user_id)).await?;
        if mapped.as_deref() == Some(token.token.as_str()) {
            let _: i64 = conn.del(user_token_key(&token.user_id)).await?;
        }
        Ok(())
    }

    async fn find_session(&self, user_id: &str) -> anyhow::Result<Option<SessionInfo>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(session_key(user_id))
            .await
            .context("redis_get_session")?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save_session(
        &self,
        user_id: &str,
        session: &SessionInfo,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(session)?;
        let _: () = redis::cmd("SET")
            .arg(session_key(user_id))
            .arg(json)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .context("redis_save_session")?;
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(session_key(user_id)).await?;
        Ok(())
    }

    async fn device_owner(&self, fingerprint: &str) -> anyhow::Result<Option<String>> {
        let mut conn = self.conn.clone();
        let owner: Option<String> = conn.get(device_key(fingerprint)).await?;
        Ok(owner)
    }

    async fn bind_device(
        &self,
        fingerprint: &str,
        user_id: &str,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(device_key(fingerprint))
            .arg(user_id)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .context("redis_bind_device")?;
        Ok(())
    }

    async fn enqueue_waiting(&self, user_id: &str, score: i64) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("ZADD")
            .arg(WAITING_KEY)
            .arg("NX")
            .arg(score)
            .arg(user_id)
            .query_async(&mut conn)
            .await
            .context("redis_zadd_waiting")?;
        Ok(())
    }

    async fn waiting_rank(&self, user_id: &str) -> anyhow::Result<Option<i64>> {
        let mut conn = self.conn.clone();
        let rank: Option<i64> = conn.zrank(WAITING_KEY, user_id).await?;
        Ok(rank)
    }

    async fn waiting_count(&self) -> anyhow::Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.zcard(WAITING_KEY).await?;
        Ok(count)
    }

    async fn pop_waiting(&self, count: usize) -> anyhow::Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let popped: Vec<(String, f64)> = redis::cmd("ZPOPMIN")
            .arg(WAITING_KEY)
            .arg(count)
            .query_async(&mut conn)
            .await
            .context("redis_zpopmin_waiting")?;
        Ok(popped.into_iter().map(|(user, _)| user).collect())
    }

    async fn remove_waiting(&self, user_id: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.zrem(WAITING_KEY, user_id).await?;
        Ok(())
    }

    async fn activate(&self, user_id: &str, ttl: Duration) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .cmd("SADD")
            .arg(ACTIVE_KEY)
            .arg(user_id)
            .ignore()
            .cmd("SET")
            .arg(active_marker_key(user_id))
            .arg("1")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .ignore()
            .query_async(&mut conn)
            .await
            .context("redis_activate_user")?;
        Ok(())
    }

    async fn deactivate(&self, user_id: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .cmd("SREM")
            .arg(ACTIVE_KEY)
            .arg(user_id)
            .ignore()
            .cmd("DEL")
            .arg(active_marker_key(user_id))
            .ignore()
            .query_async(&mut conn)
            .await
            .context("redis_deactivate_user")?;
        Ok(())
    }

    async fn active_users(&self) -> anyhow::Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let users: Vec<String> = conn.smembers(ACTIVE_KEY).await?;
        Ok(users)
    }

    async fn active_count(&self) -> anyhow::Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.scard(ACTIVE_KEY).await?;
        Ok(count)
    }

    async fn is_marked_active(&self, user_id: &str) -> anyhow::Result<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(active_marker_key(user_id)).await?;
        Ok(exists)
    }
}
