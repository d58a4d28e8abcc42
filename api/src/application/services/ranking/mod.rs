use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::application::ports::ranking_store::RankingStore;
use crate::domain::ranking::ranking::{
    BOOKING_WINDOW_SECS, RankingType, booking_speed, popularity_score, sold_out_score,
};

/// Adds one booking to the sliding window and refreshes the speed and popularity scores.
pub async fn record_booking<S: RankingStore + ?Sized>(
    store: &S,
    concert_id: i64,
    booking_id: &str,
    at: DateTime<Utc>,
) -> anyhow::Result<f64> {
    let in_window = store
        .add_booking(concert_id, booking_id, at.timestamp(), BOOKING_WINDOW_SECS)
        .await?;
    let speed = booking_speed(in_window);
    store
        .set_score(RankingType::BookingSpeed, concert_id, speed)
        .await?;
    refresh_popularity(store, concert_id).await?;
    Ok(speed)
}

pub async fn record_sold_out<S: RankingStore + ?Sized>(
    store: &S,
    concert_id: i64,
    booking_started_at: DateTime<Utc>,
    sold_out_at: DateTime<Utc>,
    total_seats: i32,
) -> anyhow::Result<f64> {
    let minutes = (sold_out_at - booking_started_at).num_minutes().max(0);
    let score = sold_out_score(minutes);
    store
        .set_score(RankingType::SoldoutSpeed, concert_id, score)
        .await?;

    let stats = HashMap::from([
        ("booking_start_time".to_string(), booking_started_at.to_rfc3339()),
        ("sold_out_time".to_string(), sold_out_at.to_rfc3339()),
        ("duration_minutes".to_string(), minutes.to_string()),
        ("total_seats".to_string(), total_seats.to_string()),
        ("sold_out_score".to_string(), score.to_string()),
    ]);
    store.save_concert_stats(concert_id, stats).await?;
    refresh_popularity(store, concert_id).await?;
    Ok(score)
}

pub async fn current_booking_speed<S: RankingStore + ?Sized>(
    store: &S,
    concert_id: i64,
    now: DateTime<Utc>,
) -> anyhow::Result<f64> {
    let count = store
        .count_bookings_since(concert_id, now.timestamp() - BOOKING_WINDOW_SECS)
        .await?;
    Ok(booking_speed(count))
}

async fn refresh_popularity<S: RankingStore + ?Sized>(
    store: &S,
    concert_id: i64,
) -> anyhow::Result<()> {
    let sold_out = store
        .score(RankingType::SoldoutSpeed, concert_id)
        .await?
        .unwrap_or(0.0);
    let speed = store
        .score(RankingType::BookingSpeed, concert_id)
        .await?
        .unwrap_or(0.0);
    store
        .set_score(
            RankingType::Popularity,
            concert_id,
            popularity_score(sold_out, speed),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryRankingStore;
    use chrono::Duration;

    #[tokio::test]
    async fn bookings_outside_window_are_dropped() {
        let store = MemoryRankingStore::default();
        let start = Utc::now();
        record_booking(&store, 1, "a", start).await.unwrap();
        record_booking(&store, 1, "b", start + Duration::seconds(10))
            .await
            .unwrap();
        let speed = record_booking(&store, 1, "c", start + Duration::seconds(400))
            .await
            .unwrap();
        assert_eq!(speed, booking_speed(1));
        let now = start + Duration::seconds(400);
        assert_eq!(
            current_booking_speed(&store, 1, now).await.unwrap(),
            booking_speed(1)
        );
        let popularity = store.score(RankingType::Popularity, 1).await.unwrap().unwrap();
        assert!((popularity - popularity_score(0.0, booking_speed(1))).abs() < 1e-9);
    }

    #[tokio::test]
    async fn sold_out_under_a_minute_gets_full_score() {
        let store = MemoryRankingStore::default();
        let now = Utc::now();
        let score = record_sold_out(&store, 2, now - Duration::seconds(30), now, 50)
            .await
            .unwrap();
        assert_eq!(score, 10_000.0);
        let stats = store.stats_for(2).unwrap();
        assert_eq!(stats.get("duration_minutes").map(String::as_str), Some("0"));
        assert_eq!(stats.get("total_seats").map(String::as_str), Some("50"));
    }
}
