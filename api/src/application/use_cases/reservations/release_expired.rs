use chrono::{DateTime, Utc};

use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::reservations::cancel_reservation::release_held_seat;
use crate::domain::reservations::reservation::{Reservation, ReservationStatus};

pub const SWEEP_BATCH: i64 = 500;

pub struct ReleaseExpiredReservations<'a, R, S>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub reservations: &'a R,
    pub seats: &'a S,
}

impl<'a, R, S> ReleaseExpiredReservations<'a, R, S>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
{
    pub async fn execute(&self) -> anyhow::Result<usize> {
        let now = Utc::now();
        let expired = self
            .reservations
            .list_expired_holds(now, SWEEP_BATCH)
            .await?;
        let mut released = 0;
        for reservation in expired {
            let id = reservation.id;
            match self.release_one(reservation, now).await {
                Ok(true) => released += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(reservation_id = %id, error = ?e, "reservation_expiry_failed")
                }
            }
        }
        if released > 0 {
            tracing::info!(released, "expired_reservations_released");
        }
        Ok(released)
    }

    async fn release_one(&self, mut reservation: Reservation, now: DateTime<Utc>) -> anyhow::Result<bool> {
        if !reservation.is_expired(now) {
            return Ok(false);
        }
        reservation.expire()?;
        if !self
            .reservations
            .update_if_status(&reservation, ReservationStatus::TemporarilyAssigned)
            .await?
        {
            return Ok(false);
        }
        // A newer hold on the same seat is left alone.
        let seat = self.seats.find_by_id(reservation.seat_id).await?;
        if seat.map(|s| s.is_hold_expired(now)).unwrap_or(false) {
            release_held_seat(self.seats, &reservation).await?;
        }
        Ok(true)
    }
}
