use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use redis::aio::ConnectionManager;

use crate::application::ports::ranking_store::RankingStore;
use crate::domain::ranking::ranking::RankingType;

const STATS_TTL_SECS: i64 = 7 * 24 * 3600;

/// Adds the booking, trims entries older than the window and returns what is left.
static ADD_BOOKING_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"redis.call('ZADD', KEYS[1], ARGV[1], ARGV[2])
redis.call('ZREMRANGEBYSCORE', KEYS[1], '-inf', '(' .. (tonumber(ARGV[1]) - tonumber(ARGV[3])))
redis.call('EXPIRE', KEYS[1], tonumber(ARGV[3]) * 2)
return redis.call('ZCARD', KEYS[1])"#,
    )
});

fn booking_key(concert_id: i64) -> String {
    format!("concert:booking:speed:{concert_id}")
}

fn stats_key(concert_id: i64) -> String {
    format!("concert:stats:{concert_id}")
}

#[derive(Clone)]
pub struct RedisRankingStore {
    conn: ConnectionManager,
}

impl RedisRankingStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RankingStore for RedisRankingStore {
    async fn add_booking(
        &self,
        concert_id: i64,
        booking_id: &str,
        at_secs: i64,
        window_secs: i64,
    ) -> anyhow::Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = ADD_BOOKING_SCRIPT
            .key(booking_key(concert_id))
            .arg(at_secs)
            .arg(booking_id)
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await
            .context("redis_add_booking")?;
        Ok(count)
    }

    async fn count_bookings_since(
        &self,
        concert_id: i64,
        since_secs: i64,
    ) -> anyhow::Result<i64> {
        let mut conn = self.conn.clone();
        let count: i64 = redis::cmd("ZCOUNT")
            .arg(booking_key(concert_id))
            .arg(since_secs)
            .arg("+inf")
            .query_async(&mut conn)
            .await
            .context("redis_zcount_bookings")?;
        Ok(count)
    }

    async fn set_score(
        &self,
        kind: RankingType,
        concert_id: i64,
        score: f64,
    ) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::cmd("ZADD")
            .arg(kind.key())
            .arg(score)
            .arg(concert_id)
            .query_async(&mut conn)
            .await
            .context("redis_zadd_ranking")?;
        Ok(())
    }

    async fn score(&self, kind: RankingType, concert_id: i64) -> anyhow::Result<Option<f64>> {
        let mut conn = self.conn.clone();
        let score: Option<f64> = redis::cmd("ZSCORE")
            .arg(kind.key())
            .arg(concert_id)
            .query_async(&mut conn)
            .await
            .context("redis_zscore_ranking")?;
        Ok(score)
    }

    async fn top(&self, kind: RankingType, limit: usize) -> anyhow::Result<Vec<(i64, f64)>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let rows: Vec<(String, f64)> = redis::cmd("ZREVRANGE")
            .arg(kind.key())
            .arg(0)
            .arg(limit as i64 - 1)
            .arg("WITHSCORES")
            .query_async(&mut conn)
            .await
            .context("redis_zrevrange_ranking")?;
        Ok(rows
            .into_iter()
            .filter_map(|(member, score)| member.parse::<i64>().ok().map(|id| (id, score)))
            .collect())
    }

    async fn save_concert_stats(
        &self,
        concert_id: i64,
        stats: HashMap<String, String>,
    ) -> anyhow::Result<()> {
        if stats.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let key = stats_key(concert_id);
        let mut pipe = redis::pipe();
        pipe.atomic();
        let fields: Vec<(String, String)> = stats.into_iter().collect();
        pipe.cmd("HSET").arg(&key).arg(fields).ignore();
        pipe.cmd("EXPIRE").arg(&key).arg(STATS_TTL_SECS).ignore();
        let _: () = pipe
            .query_async(&mut conn)
            .await
            .context("redis_save_concert_stats")?;
        Ok(())
    }
}
