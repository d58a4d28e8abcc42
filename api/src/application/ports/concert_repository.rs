use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::concerts::concert::{Concert, NewConcert};

#[async_trait]
pub trait ConcertRepository: Send + Sync {
    /// Inserts the concert together with seats `1..=total_seats`.
    async fn create(&self, concert: &NewConcert) -> anyhow::Result<Concert>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Concert>>;
    async fn list_upcoming(
        &self,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Concert>>;
    async fn count_upcoming(&self, now: DateTime<Utc>) -> anyhow::Result<i64>;
    async fn list_by_date(&self, date: NaiveDate) -> anyhow::Result<Vec<Concert>>;
    async fn search_by_artist(&self, fragment: &str) -> anyhow::Result<Vec<Concert>>;
    /// Stamps the first hold time; later calls leave it untouched.
    async fn mark_booking_opened(&self, id: i64, at: DateTime<Utc>) -> anyhow::Result<()>;
    /// Returns true only for the call that actually stamped `sold_out_at`.
    async fn mark_sold_out(&self, id: i64, at: DateTime<Utc>) -> anyhow::Result<bool>;
}
