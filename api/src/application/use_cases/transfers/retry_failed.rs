use chrono::Utc;

use crate::application::dto::transfers::RetryReportDto;
use crate::application::ports::data_platform::DataPlatformClient;
use crate::application::ports::failed_transfer_repository::FailedTransferRepository;
use crate::domain::transfers::failed_transfer::TransferStatus;

pub const RETRY_BATCH: i64 = 100;

pub struct RetryFailedTransfers<'a, C, R>
where
    C: DataPlatformClient + ?Sized,
    R: FailedTransferRepository + ?Sized,
{
    pub client: &'a C,
    pub failures: &'a R,
    pub max_attempts: i32,
}

impl<'a, C, R> RetryFailedTransfers<'a, C, R>
where
    C: DataPlatformClient + ?Sized,
    R: FailedTransferRepository + ?Sized,
{
    pub async fn execute(&self) -> anyhow::Result<RetryReportDto> {
        let pending = self
            .failures
            .list_retryable(self.max_attempts, RETRY_BATCH)
            .await?;
        let mut report = RetryReportDto::default();
        for mut transfer in pending {
            transfer.start_retry(Utc::now());
            self.failures.update(&transfer).await?;
            match self.client.send(&transfer.payload).await {
                Ok(()) => {
                    transfer.mark_success();
                    report.succeeded += 1;
                }
                Err(e) => {
                    transfer.mark_failed(&format!("{e:#}"), self.max_attempts);
                    if transfer.status == TransferStatus::Abandoned {
                        tracing::warn!(
                            transfer_id = transfer.id,
                            reservation_id = %transfer.payload.reservation_id,
                            retries = transfer.retry_count,
                            "data_transfer_abandoned"
                        );
                        report.abandoned += 1;
                    }
                    report.failed += 1;
                }
            }
            self.failures.update(&transfer).await?;
        }
        if report != RetryReportDto::default() {
            tracing::info!(
                succeeded = report.succeeded,
                failed = report.failed,
                abandoned = report.abandoned,
                "data_transfer_retry_finished"
            );
        }
        Ok(report)
    }
}
