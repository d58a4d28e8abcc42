use chrono::Utc;

use crate::application::ports::data_platform::DataPlatformClient;
use crate::application::ports::failed_transfer_repository::FailedTransferRepository;
use crate::domain::transfers::failed_transfer::{ReservationData, truncate_error};

/// Sends the record; a failed send is parked for the retry job instead of being returned.
pub async fn deliver_or_record<C, R>(
    client: &C,
    failures: &R,
    data: &ReservationData,
) -> anyhow::Result<bool>
where
    C: DataPlatformClient + ?Sized,
    R: FailedTransferRepository + ?Sized,
{
    match client.send(data).await {
        Ok(()) => {
            tracing::debug!(reservation_id = %data.reservation_id, "data_platform_sent");
            Ok(true)
        }
        Err(e) => {
            let message = truncate_error(&format!("{e:#}"));
            tracing::warn!(reservation_id = %data.reservation_id, error = %message, "data_platform_send_failed");
            failures.record_failure(data, &message, Utc::now()).await?;
            Ok(false)
        }
    }
}
