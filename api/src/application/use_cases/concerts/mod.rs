pub mod create_concert;
pub mod get_concert;
pub mod get_concert_seats;
pub mod list_available;
pub mod list_by_date;
pub mod search_by_artist;

use std::collections::HashMap;

use crate::application::dto::concerts::ConcertOverviewDto;
use crate::application::ports::seat_repository::SeatRepository;
use crate::domain::concerts::concert::Concert;
use crate::domain::concerts::seat::SeatStats;

/// Pairs each concert with its seat counters, keeping the input order.
pub(crate) async fn with_stats<S: SeatRepository + ?Sized>(
    seats: &S,
    concerts: Vec<Concert>,
) -> anyhow::Result<Vec<ConcertOverviewDto>> {
    let ids: Vec<i64> = concerts.iter().map(|c| c.id).collect();
    let mut by_id: HashMap<i64, SeatStats> = seats
        .stats(&ids)
        .await?
        .into_iter()
        .map(|s| (s.concert_id, s))
        .collect();
    Ok(concerts
        .into_iter()
        .map(|concert| {
            let stats = by_id.remove(&concert.id).unwrap_or_else(|| SeatStats {
                concert_id: concert.id,
                ..Default::default()
            });
            ConcertOverviewDto { concert, stats }
        })
        .collect())
}
