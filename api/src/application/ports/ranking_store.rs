use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ranking::ranking::RankingType;

#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Records a booking at `at_secs` and returns the bookings left inside the window.
    async fn add_booking(
        &self,
        concert_id: i64,
        booking_id: &str,
        at_secs: i64,
        window_secs: i64,
    ) -> anyhow::Result<i64>;
    async fn count_bookings_since(
        &self,
        concert_id: i64,
        since_secs: i64,
    ) -> anyhow::Result<i64>;
    async fn set_score(
        &self,
        kind: RankingType,
        concert_id: i64,
        score: f64,
    ) -> anyhow::Result<()>;
    async fn score(&self, kind: RankingType, concert_id: i64) -> anyhow::Result<Option<f64>>;
    /// Highest scores first.
    async fn top(&self, kind: RankingType, limit: usize) -> anyhow::Result<Vec<(i64, f64)>>;
    async fn save_concert_stats(
        &self,
        concert_id: i64,
        stats: HashMap<String, String>,
    ) -> anyhow::Result<()>;
}
