use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::DomainError;

pub const MAX_USER_ID_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    TemporarilyAssigned,
    Confirmed,
    Cancelled,
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::TemporarilyAssigned => "TEMPORARILY_ASSIGNED",
            ReservationStatus::Confirmed => "CONFIRMED",
            ReservationStatus::Cancelled => "CANCELLED",
            ReservationStatus::Expired => "EXPIRED",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TEMPORARILY_ASSIGNED" => Ok(ReservationStatus::TemporarilyAssigned),
            "CONFIRMED" => Ok(ReservationStatus::Confirmed),
            "CANCELLED" => Ok(ReservationStatus::Cancelled),
            "EXPIRED" => Ok(ReservationStatus::Expired),
            other => Err(DomainError::UnknownVariant {
                kind: "reservation status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: String,
    pub concert_id: i64,
    pub seat_id: i64,
    pub seat_number: i32,
    pub price: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

pub fn validate_user_id(user_id: &str) -> Result<(), DomainError> {
    if user_id.trim().is_empty() {
        return Err(DomainError::validation("user id is required"));
    }
    if user_id.chars().count() > MAX_USER_ID_LEN {
        return Err(DomainError::validation(format!(
            "user id must be at most {MAX_USER_ID_LEN} characters"
        )));
    }
    Ok(())
}

impl Reservation {
    pub fn hold(
        user_id: &str,
        concert_id: i64,
        seat_id: i64,
        seat_number: i32,
        price: i64,
        now: DateTime<Utc>,
        hold_for: Duration,
    ) -> Result<Self, DomainError> {
        validate_user_id(user_id)?;
        if price <= 0 {
            return Err(DomainError::validation("price must be positive"));
        }
        let expires_at = now + hold_for;
        if expires_at <= now {
            return Err(DomainError::validation("hold must end in the future"));
        }
        Ok(Reservation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            concert_id,
            seat_id,
            seat_number,
            price,
            status: ReservationStatus::TemporarilyAssigned,
            created_at: now,
            expires_at,
            confirmed_at: None,
        })
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::TemporarilyAssigned && now > self.expires_at
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        if self.status != ReservationStatus::TemporarilyAssigned {
            return 0;
        }
        (self.expires_at - now).num_seconds().max(0)
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.require(ReservationStatus::TemporarilyAssigned, "confirm")?;
        if self.is_expired(now) {
            return Err(DomainError::validation("reservation has expired"));
        }
        self.status = ReservationStatus::Confirmed;
        self.confirmed_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.require(ReservationStatus::TemporarilyAssigned, "cancel")?;
        self.status = ReservationStatus::Cancelled;
        Ok(())
    }

    /// Only reachable through a payment refund.
    pub fn cancel_confirmed(&mut self) -> Result<(), DomainError> {
        self.require(ReservationStatus::Confirmed, "cancel")?;
        self.status = ReservationStatus::Cancelled;
        Ok(())
    }

    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.require(ReservationStatus::TemporarilyAssigned, "expire")?;
        self.status = ReservationStatus::Expired;
        Ok(())
    }

    fn require(
        &self,
        expected: ReservationStatus,
        action: &'static str,
    ) -> Result<(), DomainError> {
        if self.status != expected {
            return Err(DomainError::InvalidState {
                entity: "reservation",
                action,
                status: self.status.as_str(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(now: DateTime<Utc>) -> Reservation {
        Reservation::hold("user-1", 1, 10, 3, 50_000, now, Duration::minutes(5)).unwrap()
    }

    #[test]
    fn hold_validates_inputs() {
        let now = Utc::now();
        assert!(Reservation::hold("", 1, 1, 1, 1000, now, Duration::minutes(5)).is_err());
        let long = "u".repeat(MAX_USER_ID_LEN + 1);
        assert!(Reservation::hold(&long, 1, 1, 1, 1000, now, Duration::minutes(5)).is_err());
        assert!(Reservation::hold("u", 1, 1, 1, 0, now, Duration::minutes(5)).is_err());
        assert!(Reservation::hold("u", 1, 1, 1, 1000, now, Duration::zero()).is_err());
    }

    #[test]
    fn remaining_seconds_clamps_at_zero() {
        let now = Utc::now();
        let r = held(now);
        assert_eq!(r.remaining_seconds(now), 300);
        assert_eq!(r.remaining_seconds(now + Duration::minutes(10)), 0);
        assert!(r.is_expired(now + Duration::minutes(6)));
        assert!(!r.is_expired(now + Duration::minutes(4)));
    }

    #[test]
    fn confirm_rejects_expired_hold() {
        let now = Utc::now();
        let mut r = held(now);
        assert!(r.confirm(now + Duration::minutes(6)).is_err());
        r.confirm(now + Duration::minutes(1)).unwrap();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert!(r.cancel().is_err());
        r.cancel_confirmed().unwrap();
        assert_eq!(r.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn expire_only_from_hold() {
        let now = Utc::now();
        let mut r = held(now);
        r.expire().unwrap();
        assert_eq!(r.status, ReservationStatus::Expired);
        assert!(r.expire().is_err());
        assert!(r.confirm(now).is_err());
    }
}
