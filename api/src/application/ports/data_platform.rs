use async_trait::async_trait;

use crate::domain::transfers::failed_transfer::ReservationData;

#[async_trait]
pub trait DataPlatformClient: Send + Sync {
    async fn send(&self, data: &ReservationData) -> anyhow::Result<()>;
}
