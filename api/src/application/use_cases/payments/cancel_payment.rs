use chrono::Utc;
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::payment_repository::PaymentRepository;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::services::events::publish_event;
use crate::application::use_cases::reservations::cancel_reservation::release_held_seat;
use crate::domain::events::event::DomainEvent;
use crate::domain::payments::payment::{Payment, PaymentStatus};
use crate::domain::reservations::reservation::ReservationStatus;

/// Cancels a payment that never settled, together with its held seat.
pub struct CancelUnpaidPayment<'a, P, R, S, E>
where
    P: PaymentRepository + ?Sized,
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub payments: &'a P,
    pub reservations: &'a R,
    pub seats: &'a S,
    pub events: &'a E,
}

impl<'a, P, R, S, E> CancelUnpaidPayment<'a, P, R, S, E>
where
    P: PaymentRepository + ?Sized,
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(&self, id: Uuid, reason: Option<&str>) -> ServiceResult<Payment> {
        let mut payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment", id))?;
        if payment.status != PaymentStatus::Pending {
            return Err(ServiceError::InvalidArgument(format!(
                "only pending payments can be cancelled (status {})",
                payment.status.as_str()
            )));
        }
        payment.cancel(Utc::now())?;
        if !self
            .payments
            .update_if_status(&payment, PaymentStatus::Pending)
            .await?
        {
            return Err(ServiceError::Conflict(
                "payment was changed concurrently".into(),
            ));
        }
        tracing::info!(payment_id = %id, reason = reason.unwrap_or(""), "payment_cancelled");

        if let Some(mut reservation) = self.reservations.find_by_id(payment.reservation_id).await? {
            if reservation.status == ReservationStatus::TemporarilyAssigned {
                reservation.cancel()?;
                if self
                    .reservations
                    .update_if_status(&reservation, ReservationStatus::TemporarilyAssigned)
                    .await?
                {
                    release_held_seat(self.seats, &reservation).await?;
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
                }
            }
        }
        Ok(payment)
    }
}
