use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(DomainError::UnknownVariant {
                kind: "payment status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Balance,
    Card,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Balance => "BALANCE",
            PaymentMethod::Card => "CARD",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BALANCE" => Ok(PaymentMethod::Balance),
            "CARD" => Ok(PaymentMethod::Card),
            other => Err(DomainError::UnknownVariant {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub user_id: String,
    pub amount: i64,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn pending(
        reservation_id: Uuid,
        user_id: &str,
        amount: i64,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        Ok(Payment {
            id: Uuid::new_v4(),
            reservation_id,
            user_id: user_id.to_string(),
            amount,
            status: PaymentStatus::Pending,
            method,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Pending, PaymentStatus::Completed, "complete", now)
    }

    pub fn fail(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Pending, PaymentStatus::Failed, "fail", now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Pending, PaymentStatus::Cancelled, "cancel", now)
    }

    pub fn refund(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Completed, PaymentStatus::Refunded, "refund", now)
    }

    fn transition(
        &mut self,
        from: PaymentStatus,
        to: PaymentStatus,
        action: &'static str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.status != from {
            return Err(DomainError::InvalidState {
                entity: "payment",
                action,
                status: self.status.as_str(),
            });
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_requires_positive_amount() {
        let now = Utc::now();
        assert!(Payment::pending(Uuid::new_v4(), "u", 0, PaymentMethod::Balance, now).is_err());
    }

    #[test]
    fn transitions_follow_lifecycle() {
        let now = Utc::now();
        let mut p = Payment::pending(Uuid::new_v4(), "u", 1000, PaymentMethod::Balance, now).unwrap();
        assert!(p.refund(now).is_err());
        p.complete(now).unwrap();
        assert!(p.cancel(now).is_err());
        assert!(p.fail(now).is_err());
        p.refund(now).unwrap();
        assert_eq!(p.status, PaymentStatus::Refunded);

        let mut q = Payment::pending(Uuid::new_v4(), "u", 1000, PaymentMethod::Card, now).unwrap();
        q.cancel(now).unwrap();
        assert_eq!(q.status.as_str(), "CANCELLED");
        assert!(q.complete(now).is_err());
    }
}
