use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::services::events::publish_event;
use crate::domain::concerts::seat::SeatStatus;
use crate::domain::events::event::DomainEvent;
use crate::domain::reservations::reservation::{Reservation, ReservationStatus};

pub struct CancelReservation<'a, R, S, E>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub reservations: &'a R,
    pub seats: &'a S,
    pub events: &'a E,
}

impl<'a, R, S, E> CancelReservation<'a, R, S, E>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(&self, id: Uuid, user_id: &str) -> ServiceResult<Reservation> {
        let mut reservation = self
            .reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("reservation", id))?;
        if !reservation.is_owned_by(user_id) {
            return Err(ServiceError::Forbidden(
                "only the owner can cancel this reservation".into(),
            ));
        }
        reservation.cancel()?;
        if !self
            .reservations
            .update_if_status(&reservation, ReservationStatus::TemporarilyAssigned)
            .await?
        {
            return Err(ServiceError::Conflict(
                "reservation was changed concurrently".into(),
            ));
        }
        release_held_seat(self.seats, &reservation).await?;

        tracing::info!(reservation_id = %id, user_id, "reservation_cancelled");
        publish_event(
            self.events,
            DomainEvent::ReservationCancelled {
                reservation_id: reservation.id,
                user_id: reservation.user_id.clone(),
                concert_id: reservation.concert_id,
                seat_number: reservation.seat_number,
            },
        )
        .await;
        Ok(reservation)
    }
}

/// Frees the seat when its current hold is the one this reservation created.
pub(crate) async fn release_held_seat<S: SeatRepository + ?Sized>(
    seats: &S,
    reservation: &Reservation,
) -> anyhow::Result<bool> {
    let Some(mut seat) = seats.find_by_id(reservation.seat_id).await? else {
        return Ok(false);
    };
    if !seat.is_hold_of(&reservation.user_id, reservation.expires_at) {
        return Ok(false);
    }
    seat.release_assignment()?;
    seats
        .update_if_status(&seat, SeatStatus::TemporarilyAssigned)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryLock, MemoryStore, RecordingPublisher};
    use crate::application::use_cases::reservations::reserve_seat::ReserveSeat;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn owner_cancels_and_seat_is_released() {
        let store = MemoryStore::default();
        let lock = MemoryLock::default();
        let events = RecordingPublisher::default();
        let c = store
            .add_concert(Utc::now().date_naive() + Duration::days(2), 3, 10_000)
            .await;
        let reserve = ReserveSeat {
            concerts: &store,
            seats: &store,
            reservations: &store,
            lock: &lock,
            events: &events,
            hold_for: Duration::minutes(5),
        };
        let r = reserve.execute("owner", c.id, 2).await.unwrap();

        let cancel = CancelReservation {
            reservations: &store,
            seats: &store,
            events: &events,
        };
        assert!(matches!(
            cancel.execute(r.id, "intruder").await,
            Err(ServiceError::Forbidden(_))
        ));
        let cancelled = cancel.execute(r.id, "owner").await.unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert!(store.seat(c.id, 2).is_available());
        assert_eq!(
            events.names(),
            vec!["RESERVATION_COMPLETED", "RESERVATION_CANCELLED"]
        );

        assert!(matches!(
            cancel.execute(r.id, "owner").await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            cancel.execute(Uuid::new_v4(), "owner").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cancelling_a_lapsed_hold_keeps_the_newer_one() {
        let store = MemoryStore::default();
        let lock = MemoryLock::default();
        let events = RecordingPublisher::default();
        let c = store
            .add_concert(Utc::now().date_naive() + Duration::days(2), 3, 10_000)
            .await;
        let reserve = ReserveSeat {
            concerts: &store,
            seats: &store,
            reservations: &store,
            lock: &lock,
            events: &events,
            hold_for: Duration::minutes(5),
        };
        let mut first = reserve.execute("owner", c.id, 1).await.unwrap();
        let lapsed = Utc::now() - Duration::minutes(1);
        first.expires_at = lapsed;
        store.put_reservation(first.clone());
        let mut seat = store.seat(c.id, 1);
        seat.assigned_until = Some(lapsed);
        store.put_seat(seat);

        let second = reserve.execute("owner", c.id, 1).await.unwrap();
        let cancel = CancelReservation {
            reservations: &store,
            seats: &store,
            events: &events,
        };
        cancel.execute(first.id, "owner").await.unwrap();

        let seat = store.seat(c.id, 1);
        assert!(seat.is_hold_of("owner", second.expires_at));
        assert_eq!(
            store.reservation(second.id).status,
            ReservationStatus::TemporarilyAssigned
        );
    }
}
