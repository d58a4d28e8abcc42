use chrono::Utc;
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::balance_repository::BalanceRepository;
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::payment_repository::PaymentRepository;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::services::events::publish_event;
use crate::application::services::locking::{
    self, PAYMENT_LOCK_TTL, lock_owner, reservation_payment_lock_key,
};
use crate::domain::balance::transaction::{TransactionKind, refund_description};
use crate::domain::concerts::seat::SeatStatus;
use crate::domain::events::event::DomainEvent;
use crate::domain::payments::payment::{Payment, PaymentStatus};
use crate::domain::reservations::reservation::ReservationStatus;

pub const DEFAULT_REFUND_REASON: &str = "customer request";

pub struct RefundPayment<'a, P, R, S, B, L, E>
where
    P: PaymentRepository + ?Sized,
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    B: BalanceRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub payments: &'a P,
    pub reservations: &'a R,
    pub seats: &'a S,
    pub balances: &'a B,
    pub lock: &'a L,
    pub events: &'a E,
}

impl<'a, P, R, S, B, L, E> RefundPayment<'a, P, R, S, B, L, E>
where
    P: PaymentRepository + ?Sized,
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    B: BalanceRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(&self, id: Uuid, reason: Option<&str>) -> ServiceResult<Payment> {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REFUND_REASON);
        let payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment", id))?;
        ensure_completed(&payment)?;

        let key = reservation_payment_lock_key(payment.reservation_id);
        let owner = lock_owner(&payment.user_id);
        locking::acquire(
            self.lock,
            &key,
            &owner,
            PAYMENT_LOCK_TTL,
            "payment for this reservation is already in progress",
        )
        .await?;
        let result = self.refund_locked(id, reason).await;
        locking::release(self.lock, &key, &owner).await;

        let payment = result?;
        self.release_booking(&payment).await;
        Ok(payment)
    }

    async fn refund_locked(&self, id: Uuid, reason: &str) -> ServiceResult<Payment> {
        let mut payment = self
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment", id))?;
        ensure_completed(&payment)?;

        payment.refund(Utc::now())?;
        if !self
            .payments
            .update_if_status(&payment, PaymentStatus::Completed)
            .await?
        {
            return Err(ServiceError::Conflict(
                "payment was changed concurrently".into(),
            ));
        }
        if let Err(e) = self
            .balances
            .credit(
                &payment.user_id,
                payment.amount,
                TransactionKind::Refund,
                refund_description(reason),
            )
            .await
        {
            let mut restored = payment.clone();
            restored.status = PaymentStatus::Completed;
            if let Err(restore_err) = self
                .payments
                .update_if_status(&restored, PaymentStatus::Refunded)
                .await
            {
                tracing::error!(payment_id = %id, error = ?restore_err, "refund_status_restore_failed");
            }
            return Err(e.into());
        }
        tracing::info!(payment_id = %id, amount = payment.amount, reason, "payment_refunded");
        Ok(payment)
    }

    /// Frees the seat behind a refunded payment. Failures here are logged only.
    async fn release_booking(&self, payment: &Payment) {
        if let Err(e) = self.try_release_booking(payment).await {
            tracing::warn!(payment_id = %payment.id, error = ?e, "refund_followup_failed");
        }
    }

    async fn try_release_booking(&self, payment: &Payment) -> anyhow::Result<()> {
        let Some(mut reservation) = self.reservations.find_by_id(payment.reservation_id).await?
        else {
            return Ok(());
        };
        if reservation.status != ReservationStatus::Confirmed {
            return Ok(());
        }
        reservation.cancel_confirmed()?;
        if !self
            .reservations
            .update_if_status(&reservation, ReservationStatus::Confirmed)
            .await?
        {
            return Ok(());
        }
        if let Some(mut seat) = self.seats.find_by_id(reservation.seat_id).await? {
            if seat.status == SeatStatus::Reserved {
                seat.release_reservation()?;
                self.seats
                    .update_if_status(&seat, SeatStatus::Reserved)
                    .await?;
            }
        }
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
        Ok(())
    }
}

fn ensure_completed(payment: &Payment) -> ServiceResult<()> {
    if payment.status != PaymentStatus::Completed {
        return Err(ServiceError::InvalidArgument(format!(
            "only completed payments can be refunded (status {})",
            payment.status.as_str()
        )));
    }
    Ok(())
}
