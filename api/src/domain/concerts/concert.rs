use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::domain::error::DomainError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_ARTIST_LEN: usize = 100;
pub const MAX_VENUE_LEN: usize = 200;
pub const MAX_SEATS: i32 = 100;
pub const DEFAULT_SEATS: i32 = 50;

#[derive(Debug, Clone)]
pub struct Concert {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub venue: String,
    pub concert_date: NaiveDate,
    pub concert_time: NaiveTime,
    pub total_seats: i32,
    pub booking_opened_at: Option<DateTime<Utc>>,
    pub sold_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Concert {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.concert_date.and_time(self.concert_time)
    }

    /// Concert wall-clock times are stored without a zone and compared against UTC.
    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.starts_at() > now.naive_utc()
    }

    pub fn is_sold_out(&self) -> bool {
        self.sold_out_at.is_some()
    }

    /// Minutes between the first hold and the sell-out, when both are known.
    pub fn booking_duration_minutes(&self) -> Option<i64> {
        match (self.booking_opened_at, self.sold_out_at) {
            (Some(opened), Some(sold_out)) => Some((sold_out - opened).num_minutes().max(0)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewConcert {
    pub title: String,
    pub artist: String,
    pub venue: String,
    pub concert_date: NaiveDate,
    pub concert_time: NaiveTime,
    pub total_seats: i32,
    pub seat_price: i64,
}

impl NewConcert {
    pub fn validate(&self, today: NaiveDate) -> Result<(), DomainError> {
        check_text("title", &self.title, MAX_TITLE_LEN)?;
        check_text("artist", &self.artist, MAX_ARTIST_LEN)?;
        check_text("venue", &self.venue, MAX_VENUE_LEN)?;
        if self.concert_date < today {
            return Err(DomainError::validation("concert date cannot be in the past"));
        }
        if !(1..=MAX_SEATS).contains(&self.total_seats) {
            return Err(DomainError::validation(format!(
                "total seats must be between 1 and {MAX_SEATS}"
            )));
        }
        if self.seat_price <= 0 {
            return Err(DomainError::validation("seat price must be positive"));
        }
        Ok(())
    }
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}
