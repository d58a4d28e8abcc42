use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

pub const MAX_ERROR_LEN: usize = 1000;

/// Payload pushed to the external data platform for each completed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationData {
    pub reservation_id: Uuid,
    pub user_id: String,
    pub concert_id: i64,
    pub seat_number: i32,
    pub price: i64,
    pub reserved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Failed,
    Retrying,
    Success,
    Abandoned,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Failed => "FAILED",
            TransferStatus::Retrying => "RETRYING",
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Abandoned => "ABANDONED",
        }
    }
}

impl FromStr for TransferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FAILED" => Ok(TransferStatus::Failed),
            "RETRYING" => Ok(TransferStatus::Retrying),
            "SUCCESS" => Ok(TransferStatus::Success),
            "ABANDONED" => Ok(TransferStatus::Abandoned),
            other => Err(DomainError::UnknownVariant {
                kind: "transfer status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDataTransfer {
    pub id: i64,
    pub payload: ReservationData,
    pub failed_at: DateTime<Utc>,
    pub error_message: Option<String>,
    pub retry_count: i32,
    pub status: TransferStatus,
    pub last_retry_at: Option<DateTime<Utc>>,
}

pub fn truncate_error(message: &str) -> String {
    message.chars().take(MAX_ERROR_LEN).collect()
}

impl FailedDataTransfer {
    pub fn can_retry(&self, max_attempts: i32) -> bool {
        self.status == TransferStatus::Failed && self.retry_count < max_attempts
    }

    pub fn start_retry(&mut self, now: DateTime<Utc>) {
        self.status = TransferStatus::Retrying;
        self.retry_count += 1;
        self.last_retry_at = Some(now);
    }

    pub fn mark_success(&mut self) {
        self.status = TransferStatus::Success;
        self.error_message = None;
    }

    pub fn mark_failed(&mut self, error: &str, max_attempts: i32) {
        self.error_message = Some(truncate_error(error));
        self.status = if self.retry_count >= max_attempts {
            TransferStatus::Abandoned
        } else {
            TransferStatus::Failed
        };
    }
}
