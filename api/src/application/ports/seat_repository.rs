use async_trait::async_trait;

use crate::domain::concerts::seat::{Seat, SeatStats, SeatStatus};

#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Seat>>;
    async fn find_by_number(
        &self,
        concert_id: i64,
        seat_number: i32,
    ) -> anyhow::Result<Option<Seat>>;
    async fn list_by_concert(&self, concert_id: i64) -> anyhow::Result<Vec<Seat>>;
    async fn stats(&self, concert_ids: &[i64]) -> anyhow::Result<Vec<SeatStats>>;
    /// Writes `seat` only when the stored status still equals `expected`.
    async fn update_if_status(&self, seat: &Seat, expected: SeatStatus) -> anyhow::Result<bool>;
}
