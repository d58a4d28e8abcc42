use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Charge,
    Payment,
    Refund,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Charge => "CHARGE",
            TransactionKind::Payment => "PAYMENT",
            TransactionKind::Refund => "REFUND",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHARGE" => Ok(TransactionKind::Charge),
            "PAYMENT" => Ok(TransactionKind::Payment),
            "REFUND" => Ok(TransactionKind::Refund),
            other => Err(DomainError::UnknownVariant {
                kind: "transaction kind",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceTransaction {
    pub id: Uuid,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BalanceTransaction {
    pub fn record(
        user_id: &str,
        kind: TransactionKind,
        amount: i64,
        balance_after: i64,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("transaction amount must be positive"));
        }
        if balance_after < 0 {
            return Err(DomainError::validation("balance cannot go negative"));
        }
        let description = description.map(|d| d.chars().take(MAX_DESCRIPTION_LEN).collect());
        Ok(BalanceTransaction {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind,
            amount,
            balance_after,
            description,
            created_at: now,
        })
    }
}

pub fn charge_description() -> String {
    "balance charge".to_string()
}

pub fn payment_description(reservation_id: Uuid) -> String {
    format!("seat payment - reservation {reservation_id}")
}

pub fn refund_description(reason: &str) -> String {
    format!("refund - {reason}")
}
