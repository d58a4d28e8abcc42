use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Sliding window used for booking speed.
pub const BOOKING_WINDOW_SECS: i64 = 300;
pub const SOLD_OUT_BASE_SCORE: f64 = 10_000.0;
const SOLD_OUT_WEIGHT: f64 = 0.7;
const BOOKING_SPEED_WEIGHT: f64 = 0.3;
const BOOKING_SPEED_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingType {
    SoldoutSpeed,
    BookingSpeed,
    #[default]
    Popularity,
}

impl RankingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingType::SoldoutSpeed => "SOLDOUT_SPEED",
            RankingType::BookingSpeed => "BOOKING_SPEED",
            RankingType::Popularity => "POPULARITY",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            RankingType::SoldoutSpeed => "concert:ranking:soldout_speed",
            RankingType::BookingSpeed => "concert:ranking:booking_speed",
            RankingType::Popularity => "concert:ranking:popularity",
        }
    }
}

impl FromStr for RankingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SOLDOUT_SPEED" => Ok(RankingType::SoldoutSpeed),
            "BOOKING_SPEED" => Ok(RankingType::BookingSpeed),
            "POPULARITY" => Ok(RankingType::Popularity),
            _ => Err(DomainError::UnknownVariant {
                kind: "ranking type",
                value: s.to_string(),
            }),
        }
    }
}

/// Bookings per minute over the sliding window.
pub fn booking_speed(bookings_in_window: i64) -> f64 {
    bookings_in_window.max(0) as f64 / (BOOKING_WINDOW_SECS as f64 / 60.0)
}

pub fn sold_out_score(duration_minutes: i64) -> f64 {
    SOLD_OUT_BASE_SCORE / duration_minutes.max(1) as f64
}

pub fn popularity_score(sold_out: f64, booking_speed: f64) -> f64 {
    sold_out * SOLD_OUT_WEIGHT + booking_speed * BOOKING_SPEED_SCALE * BOOKING_SPEED_WEIGHT
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingEntry {
    pub rank: usize,
    pub concert_id: i64,
    pub score: f64,
    pub ranking_type: RankingType,
}
