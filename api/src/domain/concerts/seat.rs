use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    Available,
    TemporarilyAssigned,
    Reserved,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "AVAILABLE",
            SeatStatus::TemporarilyAssigned => "TEMPORARILY_ASSIGNED",
            SeatStatus::Reserved => "RESERVED",
        }
    }
}

impl FromStr for SeatStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(SeatStatus::Available),
            "TEMPORARILY_ASSIGNED" => Ok(SeatStatus::TemporarilyAssigned),
            "RESERVED" => Ok(SeatStatus::Reserved),
            other => Err(DomainError::UnknownVariant {
                kind: "seat status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub id: i64,
    pub concert_id: i64,
    pub seat_number: i32,
    pub price: i64,
    pub status: SeatStatus,
    pub assigned_user_id: Option<String>,
    pub assigned_until: Option<DateTime<Utc>>,
    pub reserved_at: Option<DateTime<Utc>>,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }

    pub fn is_hold_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SeatStatus::TemporarilyAssigned
            && self.assigned_until.map(|until| now > until).unwrap_or(true)
    }

    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.status == SeatStatus::TemporarilyAssigned
            && self.assigned_user_id.as_deref() == Some(user_id)
    }

    /// Held by `user_id` under the hold ending at `until`.
    pub fn is_hold_of(&self, user_id: &str, until: DateTime<Utc>) -> bool {
        self.is_held_by(user_id) && self.assigned_until == Some(until)
    }

    pub fn assign_temporarily(
        &mut self,
        user_id: &str,
        until: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.status != SeatStatus::Available {
            return Err(self.invalid("assign"));
        }
        self.status = SeatStatus::TemporarilyAssigned;
        self.assigned_user_id = Some(user_id.to_string());
        self.assigned_until = Some(until);
        Ok(())
    }

    pub fn confirm(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.status != SeatStatus::TemporarilyAssigned {
            return Err(self.invalid("confirm"));
        }
        if self.is_hold_expired(now) {
            return Err(DomainError::validation("seat hold has expired"));
        }
        self.status = SeatStatus::Reserved;
        self.reserved_at = Some(now);
        self.assigned_until = None;
        Ok(())
    }

    pub fn release_assignment(&mut self) -> Result<(), DomainError> {
        if self.status != SeatStatus::TemporarilyAssigned {
            return Err(self.invalid("release hold"));
        }
        self.clear();
        Ok(())
    }

    pub fn release_reservation(&mut self) -> Result<(), DomainError> {
        if self.status != SeatStatus::Reserved {
            return Err(self.invalid("release reservation"));
        }
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.status = SeatStatus::Available;
        self.assigned_user_id = None;
        self.assigned_until = None;
        self.reserved_at = None;
    }

    fn invalid(&self, action: &'static str) -> DomainError {
        DomainError::InvalidState {
            entity: "seat",
            action,
            status: self.status.as_str(),
        }
    }
}

/// Per-concert seat counters and price range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatStats {
    pub concert_id: i64,
    pub total: i64,
    pub available: i64,
    pub temporarily_assigned: i64,
    pub reserved: i64,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl SeatStats {
    pub fn from_seats(concert_id: i64, seats: &[Seat]) -> Self {
        let mut stats = SeatStats {
            concert_id,
            ..Default::default()
        };
        for seat in seats {
            stats.total += 1;
            match seat.status {
                SeatStatus::Available => stats.available += 1,
                SeatStatus::TemporarilyAssigned => stats.temporarily_assigned += 1,
                SeatStatus::Reserved => stats.reserved += 1,
            }
            stats.min_price = Some(stats.min_price.map_or(seat.price, |p| p.min(seat.price)));
            stats.max_price = Some(stats.max_price.map_or(seat.price, |p| p.max(seat.price)));
        }
        stats
    }

    pub fn is_sold_out(&self) -> bool {
        self.total > 0 && self.reserved == self.total
    }
}
