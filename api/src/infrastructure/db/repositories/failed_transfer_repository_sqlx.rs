use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::failed_transfer_repository::FailedTransferRepository;
use crate::domain::transfers::failed_transfer::{
    FailedDataTransfer, ReservationData, TransferStatus, truncate_error,
};
use crate::infrastructure::db::PgPool;

const TRANSFER_COLUMNS: &str = "id, reservation_id, user_id, concert_id, seat_number, price, reserved_at, failed_at, error_message, retry_count, status, last_retry_at";

pub struct SqlxFailedTransferRepository {
    pub pool: PgPool,
}

impl SqlxFailedTransferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn transfer_from_row(r: &PgRow) -> anyhow::Result<FailedDataTransfer> {
    Ok(FailedDataTransfer {
        id: r.get("id"),
        payload: ReservationData {
            reservation_id: r.get("reservation_id"),
            user_id: r.get("user_id"),
            concert_id: r.get("concert_id"),
            seat_number: r.get("seat_number"),
            price: r.get("price"),
            reserved_at: r.get("reserved_at"),
        },
        failed_at: r.get("failed_at"),
        error_message: r.get("error_message"),
        retry_count: r.get("retry_count"),
        status: r.get::<String, _>("status").parse()?,
        last_retry_at: r.get("last_retry_at"),
    })
}

#[async_trait]
impl FailedTransferRepository for SqlxFailedTransferRepository {
    async fn record_failure(
        &self,
        data: &ReservationData,
        error: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<FailedDataTransfer> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO failed_data_transfers
                   (reservation_id, user_id, concert_id, seat_number, price, reserved_at, failed_at, error_message, retry_count, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
               RETURNING {TRANSFER_COLUMNS}"#
        ))
        .bind(data.reservation_id)
        .bind(&data.user_id)
        .bind(data.concert_id)
        .bind(data.seat_number)
        .bind(data.price)
        .bind(data.reserved_at)
        .bind(now)
        .bind(truncate_error(error))
        .bind(TransferStatus::Failed.as_str())
        .fetch_one(&self.pool)
        .await?;
        transfer_from_row(&row)
    }

    async fn list_retryable(
        &self,
        max_attempts: i32,
        limit: i64,
    ) -> anyhow::Result<Vec<FailedDataTransfer>> {
        let rows = sqlx::query(&format!(
            r#"SELECT {TRANSFER_COLUMNS} FROM failed_data_transfers
               WHERE status = 'FAILED' AND retry_count < $1
               ORDER BY failed_at
               LIMIT $2"#
        ))
        .bind(max_attempts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(transfer_from_row).collect()
    }

    async fn update(&self, transfer: &FailedDataTransfer) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE failed_data_transfers
               SET status = $2, retry_count = $3, error_message = $4, last_retry_at = $5
               WHERE id = $1"#,
        )
        .bind(transfer.id)
        .bind(transfer.status.as_str())
        .bind(transfer.retry_count)
        .bind(&transfer.error_message)
        .bind(transfer.last_retry_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
