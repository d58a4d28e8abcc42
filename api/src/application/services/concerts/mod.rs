use chrono::{DateTime, Utc};

use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::services::events::publish_event;
use crate::domain::events::event::DomainEvent;

/// Stamps the concert as sold out once every seat is reserved and announces it once.
pub async fn check_sold_out<C, S, E>(
    concerts: &C,
    seats: &S,
    events: &E,
    concert_id: i64,
    now: DateTime<Utc>,
) -> anyhow::Result<bool>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    let stats = seats.stats(&[concert_id]).await?;
    let sold_out = stats
        .iter()
        .find(|s| s.concert_id == concert_id)
        .map(|s| s.is_sold_out())
        .unwrap_or(false);
    if !sold_out {
        return Ok(false);
    }
    if !concerts.mark_sold_out(concert_id, now).await? {
        return Ok(false);
    }
    let Some(concert) = concerts.find_by_id(concert_id).await? else {
        return Ok(false);
    };
    let booking_started_at = concert.booking_opened_at.unwrap_or(concert.created_at);
    let duration_minutes = (now - booking_started_at).num_minutes().max(0);
    tracing::info!(concert_id, duration_minutes, "concert_sold_out");
    publish_event(
        events,
        DomainEvent::ConcertSoldOut {
            concert_id,
            title: concert.title.clone(),
            booking_started_at,
            sold_out_at: now,
            total_seats: concert.total_seats,
            duration_minutes,
        },
    )
    .await;
    Ok(true)
}
