use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::transfers::failed_transfer::{FailedDataTransfer, ReservationData};

#[async_trait]
pub trait FailedTransferRepository: Send + Sync {
    async fn record_failure(
        &self,
        data: &ReservationData,
        error: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<FailedDataTransfer>;
    async fn list_retryable(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> anyhow::Result<Vec<FailedDataTransfer>>;
    async fn update(&self, transfer: &FailedDataTransfer) -> anyhow::Result<()>;
}
