use chrono::{DateTime, Duration, Utc};

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::services::events::publish_event;
use crate::application::services::locking::{self, SEAT_LOCK_TTL, lock_owner, seat_lock_key};
use crate::domain::events::event::DomainEvent;
use crate::domain::reservations::reservation::{Reservation, validate_user_id};

pub struct ReserveSeat<'a, C, S, R, L, E>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
    R: ReservationRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub concerts: &'a C,
    pub seats: &'a S,
    pub reservations: &'a R,
    pub lock: &'a L,
    pub events: &'a E,
    pub hold_for: Duration,
}

impl<'a, C, S, R, L, E> ReserveSeat<'a, C, S, R, L, E>
where
    C: ConcertRepository + ?Sized,
    S: SeatRepository + ?Sized,
    R: ReservationRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: &str,
        concert_id: i64,
        seat_number: i32,
    ) -> ServiceResult<Reservation> {
        validate_user_id(user_id)?;
        let key = seat_lock_key(concert_id, seat_number);
        let owner = lock_owner(user_id);
        locking::acquire(
            self.lock,
            &key,
            &owner,
            SEAT_LOCK_TTL,
            "seat is being reserved by another user",
        )
        .await?;
        let result = self
            .reserve_locked(user_id, concert_id, seat_number, Utc::now())
            .await;
        locking::release(self.lock, &key, &owner).await;
        result
    }

    async fn reserve_locked(
        &self,
        user_id: &str,
        concert_id: i64,
        seat_number: i32,
        now: DateTime<Utc>,
    ) -> ServiceResult<Reservation> {
        let concert = self
            .concerts
            .find_by_id(concert_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("concert", concert_id))?;
        if !concert.is_bookable(now) {
            return Err(ServiceError::InvalidArgument(
                "concert is no longer open for booking".into(),
            ));
        }

        let mut seat = self
            .seats
            .find_by_number(concert_id, seat_number)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "seat {seat_number} not found for concert {concert_id}"
                ))
            })?;
        let previous = seat.status;
        if !seat.is_available() {
            if seat.is_hold_expired(now) {
                tracing::debug!(concert_id, seat_number, "seat_hold_expired_reusing");
                seat.release_assignment()?;
            } else {
                return Err(ServiceError::Conflict("seat is not available".into()));
            }
        }

        seat.assign_temporarily(user_id, now + self.hold_for)?;
        if !self.seats.update_if_status(&seat, previous).await? {
            return Err(ServiceError::Conflict(
                "seat was taken by another user".into(),
            ));
        }

        let reservation = match Reservation::hold(
            user_id,
            concert_id,
            seat.id,
            seat.seat_number,
            seat.price,
            now,
            self.hold_for,
        ) {
            Ok(r) => r,
            Err(e) => {
                self.undo_hold(&mut seat).await;
                return Err(e.into());
            }
        };
        if let Err(e) = self.reservations.insert(&reservation).await {
            self.undo_hold(&mut seat).await;
            return Err(e.into());
        }
        self.concerts.mark_booking_opened(concert_id, now).await?;

        tracing::info!(
            reservation_id = %reservation.id,
            user_id,
            concert_id,
            seat_number,
            "seat_reserved"
        );
        publish_event(
            self.events,
            DomainEvent::ReservationCompleted {
                reservation_id: reservation.id,
                user_id: reservation.user_id.clone(),
                concert_id,
                seat_id: seat.id,
                seat_number: seat.seat_number,
                price: reservation.price,
                reserved_at: now,
            },
        )
        .await;
        Ok(reservation)
    }

    async fn undo_hold(&self, seat: &mut crate::domain::concerts::seat::Seat) {
        let expected = seat.status;
        if seat.release_assignment().is_ok() {
            if let Err(e) = self.seats.update_if_status(seat, expected).await {
                tracing::error!(seat_id = seat.id, error = ?e, "seat_hold_rollback_failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryLock, MemoryStore, RecordingPublisher};
    use crate::domain::concerts::seat::SeatStatus;
    use crate::domain::reservations::reservation::ReservationStatus;

    struct Fixture {
        store: MemoryStore,
        lock: MemoryLock,
        events: RecordingPublisher,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                store: MemoryStore::default(),
                lock: MemoryLock::default(),
                events: RecordingPublisher::default(),
            }
        }

        fn uc(&self) -> ReserveSeat<'_, MemoryStore, MemoryStore, MemoryStore, MemoryLock, RecordingPublisher> {
            ReserveSeat {
                concerts: &self.store,
                seats: &self.store,
                reservations: &self.store,
                lock: &self.lock,
                events: &self.events,
                hold_for: Duration::minutes(5),
            }
        }
    }

    #[tokio::test]
    async fn holds_seat_and_publishes() {
        let f = Fixture::new();
        let c = f
            .store
            .add_concert(Utc::now().date_naive() + Duration::days(7), 10, 80_000)
            .await;
        let r = f.uc().execute("user-1", c.id, 4).await.unwrap();
        assert_eq!(r.status, ReservationStatus::TemporarilyAssigned);
        assert_eq!(r.price, 80_000);
        assert_eq!(r.seat_number, 4);
        assert!(r.remaining_seconds(Utc::now()) > 290);

        let seat = f.store.seat(c.id, 4);
        assert!(seat.is_held_by("user-1"));
        assert!(f.store.concert(c.id).booking_opened_at.is_some());
        assert_eq!(f.events.names(), vec!["RESERVATION_COMPLETED"]);
        assert!(!f.lock.is_held(&seat_lock_key(c.id, 4)));
    }

    #[tokio::test]
    async fn second_user_cannot_take_held_seat() {
        let f = Fixture::new();
        let c = f
            .store
            .add_concert(Utc::now().date_naive() + Duration::days(7), 2, 10_000)
            .await;
        f.uc().execute("a", c.id, 1).await.unwrap();
        assert!(matches!(
            f.uc().execute("b", c.id, 1).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn expired_hold_is_reclaimed() {
        let f = Fixture::new();
        let c = f
            .store
            .add_concert(Utc::now().date_naive() + Duration::days(7), 2, 10_000)
            .await;
        let mut seat = f.store.seat(c.id, 1);
        seat.status = SeatStatus::TemporarilyAssigned;
        seat.assigned_user_id = Some("a".into());
        seat.assigned_until = Some(Utc::now() - Duration::minutes(1));
        f.store.put_seat(seat);

        let r = f.uc().execute("b", c.id, 1).await.unwrap();
        assert_eq!(r.user_id, "b");
        assert!(f.store.seat(c.id, 1).is_held_by("b"));
    }

    #[tokio::test]
    async fn locked_seat_is_busy() {
        let f = Fixture::new();
        let c = f
            .store
            .add_concert(Utc::now().date_naive() + Duration::days(7), 2, 10_000)
            .await;
        f.lock.hold(&seat_lock_key(c.id, 2), "other_request");
        assert!(matches!(
            f.uc().execute("a", c.id, 2).await,
            Err(ServiceError::Busy(_))
        ));
    }

    #[tokio::test]
    async fn rejects_past_concerts_and_unknown_seats() {
        let f = Fixture::new();
        let past = f
            .store
            .add_concert(Utc::now().date_naive() - Duration::days(1), 2, 10_000)
            .await;
        assert!(matches!(
            f.uc().execute("a", past.id, 1).await,
            Err(ServiceError::InvalidArgument(_))
        ));
        let c = f
            .store
            .add_concert(Utc::now().date_naive() + Duration::days(1), 2, 10_000)
            .await;
        assert!(matches!(
            f.uc().execute("a", c.id, 3).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            f.uc().execute("a", 404, 1).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
