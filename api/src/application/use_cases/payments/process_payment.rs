use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::balance_repository::BalanceRepository;
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::payment_repository::PaymentRepository;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::services::concerts::check_sold_out;
use crate::application::services::events::publish_event;
use crate::application::services::locking::{
    self, PAYMENT_LOCK_TTL, balance_lock_key, lock_owner, reservation_payment_lock_key,
};
use crate::domain::balance::transaction::{TransactionKind, payment_description, refund_description};
use crate::domain::concerts::seat::{Seat, SeatStatus};
use crate::domain::events::event::DomainEvent;
use crate::domain::payments::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::domain::reservations::reservation::{
    Reservation, ReservationStatus, validate_user_id,
};

const ROLLBACK_REASON: &str = "payment rollback";

pub struct ProcessPayment<'a, R, S, C, P, B, L, E>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    C: ConcertRepository + ?Sized,
    P: PaymentRepository + ?Sized,
    B: BalanceRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub reservations: &'a R,
    pub seats: &'a S,
    pub concerts: &'a C,
    pub payments: &'a P,
    pub balances: &'a B,
    pub lock: &'a L,
    pub events: &'a E,
}

impl<'a, R, S, C, P, B, L, E> ProcessPayment<'a, R, S, C, P, B, L, E>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    C: ConcertRepository + ?Sized,
    P: PaymentRepository + ?Sized,
    B: BalanceRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(&self, reservation_id: Uuid, user_id: &str) -> ServiceResult<Payment> {
        validate_user_id(user_id)?;
        let owner = lock_owner(user_id);
        let reservation_key = reservation_payment_lock_key(reservation_id);
        let balance_key = balance_lock_key(user_id);

        locking::acquire(
            self.lock,
            &reservation_key,
            &owner,
            PAYMENT_LOCK_TTL,
            "payment for this reservation is already in progress",
        )
        .await?;
        if let Err(e) = locking::acquire(
            self.lock,
            &balance_key,
            &owner,
            PAYMENT_LOCK_TTL,
            "another payment is using this balance",
        )
        .await
        {
            locking::release(self.lock, &reservation_key, &owner).await;
            return Err(e);
        }

        let result = self.pay_locked(reservation_id, user_id, Utc::now()).await;

        locking::release(self.lock, &balance_key, &owner).await;
        locking::release(self.lock, &reservation_key, &owner).await;
        result
    }

    async fn pay_locked(
        &self,
        reservation_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Payment> {
        let reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("reservation", reservation_id))?;
        if !reservation.is_owned_by(user_id) {
            return Err(ServiceError::InvalidArgument(
                "reservation belongs to another user".into(),
            ));
        }
        match reservation.status {
            ReservationStatus::TemporarilyAssigned => {}
            ReservationStatus::Confirmed => {
                return Err(ServiceError::InvalidArgument(
                    "reservation is already paid".into(),
                ));
            }
            other => {
                return Err(ServiceError::InvalidArgument(format!(
                    "reservation is {}",
                    other.as_str()
                )));
            }
        }
        if reservation.is_expired(now) {
            return Err(ServiceError::InvalidArgument(
                "reservation hold has expired".into(),
            ));
        }
        let seat = self
            .seats
            .find_by_id(reservation.seat_id)
            .await?
            .filter(|s| s.is_held_by(user_id) && !s.is_hold_expired(now))
            .ok_or_else(|| {
                ServiceError::InvalidArgument("seat is no longer held for this user".into())
            })?;

        let amount = reservation.price;
        let current = self
            .balances
            .find(user_id)
            .await?
            .map(|b| b.amount)
            .unwrap_or(0);
        if current < amount {
            return Err(ServiceError::InsufficientBalance {
                current,
                required: amount,
            });
        }

        let mut payment = Payment::pending(
            reservation.id,
            user_id,
            amount,
            PaymentMethod::Balance,
            now,
        )?;
        self.payments.insert(&payment).await?;

        let debited = match self
            .balances
            .debit(user_id, amount, payment_description(reservation.id))
            .await
        {
            Ok(debited) => debited,
            Err(e) => {
                let err = ServiceError::from(e);
                self.mark_failed(&payment, &err).await;
                return Err(err);
            }
        };
        if debited.is_none() {
            let current = self
                .balances
                .find(user_id)
                .await?
                .map(|b| b.amount)
                .unwrap_or(0);
            let err = ServiceError::InsufficientBalance {
                current,
                required: amount,
            };
            self.mark_failed(&payment, &err).await;
            return Err(err);
        }

        if let Err(err) = self.settle(&mut payment, reservation.clone(), seat, now).await {
            return Err(self.roll_back(&payment, err).await);
        }

        tracing::info!(
            payment_id = %payment.id,
            reservation_id = %reservation.id,
            user_id,
            amount,
            "payment_completed"
        );
        publish_event(
            self.events,
            DomainEvent::PaymentCompleted {
                payment_id: payment.id,
                reservation_id: reservation.id,
                user_id: user_id.to_string(),
                amount,
            },
        )
        .await;
        if let Err(e) = check_sold_out(
            self.concerts,
            self.seats,
            self.events,
            reservation.concert_id,
            now,
        )
        .await
        {
            tracing::warn!(concert_id = reservation.concert_id, error = ?e, "sold_out_check_failed");
        }
        Ok(payment)
    }

    /// Seat, then reservation, then payment. Each step undoes the earlier ones when it loses.
    async fn settle(
        &self,
        payment: &mut Payment,
        mut reservation: Reservation,
        mut seat: Seat,
        now: DateTime<Utc>,
    ) -> ServiceResult<()> {
        seat.confirm(now)?;
        if !self
            .seats
            .update_if_status(&seat, SeatStatus::TemporarilyAssigned)
            .await?
        {
            return Err(ServiceError::Conflict("seat hold was lost".into()));
        }

        let reservation_step = match reservation.confirm(now) {
            Ok(()) => self
                .reservations
                .update_if_status(&reservation, ReservationStatus::TemporarilyAssigned)
                .await
                .map_err(ServiceError::from),
            Err(e) => Err(e.into()),
        };
        match reservation_step {
            Ok(true) => {}
            Ok(false) => {
                self.undo_seat(&mut seat).await;
                return Err(ServiceError::Conflict(
                    "reservation was changed concurrently".into(),
                ));
            }
            Err(e) => {
                self.undo_seat(&mut seat).await;
                return Err(e);
            }
        }

        payment.complete(now)?;
        match self
            .payments
            .update_if_status(payment, PaymentStatus::Pending)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.undo_reservation(&mut reservation).await;
                self.undo_seat(&mut seat).await;
                Err(ServiceError::Conflict("payment was changed concurrently".into()))
            }
            Err(e) => {
                self.undo_reservation(&mut reservation).await;
                self.undo_seat(&mut seat).await;
                Err(e.into())
            }
        }
    }

    async fn undo_seat(&self, seat: &mut Seat) {
        if seat.release_reservation().is_err() {
            return;
        }
        if let Err(e) = self.seats.update_if_status(seat, SeatStatus::Reserved).await {
            tracing::error!(seat_id = seat.id, error = ?e, "seat_compensation_failed");
        }
    }

    async fn undo_reservation(&self, reservation: &mut Reservation) {
        if reservation.cancel_confirmed().is_err() {
            return;
        }
        if let Err(e) = self
            .reservations
            .update_if_status(reservation, ReservationStatus::Confirmed)
            .await
        {
            tracing::error!(reservation_id = %reservation.id, error = ?e, "reservation_compensation_failed");
        }
    }

    /// Returns the debited amount and fails the payment; hands back the original error.
    async fn roll_back(&self, payment: &Payment, err: ServiceError) -> ServiceError {
        tracing::warn!(payment_id = %payment.id, error = %err, "payment_rolling_back");
        if let Err(e) = self
            .balances
            .credit(
                &payment.user_id,
                payment.amount,
                TransactionKind::Refund,
                refund_description(ROLLBACK_REASON),
            )
            .await
        {
            tracing::error!(
                payment_id = %payment.id,
                user_id = %payment.user_id,
                amount = payment.amount,
                error = ?e,
                "payment_rollback_refund_failed"
            );
        }
        match self.payments.find_by_id(payment.id).await {
            Ok(Some(current)) if current.status == PaymentStatus::Pending => {
                self.mark_failed(&current, &err).await;
            }
            Ok(_) => {}
            Err(e) => tracing::error!(payment_id = %payment.id, error = ?e, "payment_reload_failed"),
        }
        err
    }

    async fn mark_failed(&self, payment: &Payment, err: &ServiceError) {
        let mut failed = payment.clone();
        if failed.fail(Utc::now()).is_err() {
            return;
        }
        match self
            .payments
            .update_if_status(&failed, PaymentStatus::Pending)
            .await
        {
            Ok(_) => {}
            Err(e) => tracing::error!(payment_id = %payment.id, error = ?e, "payment_fail_mark_failed"),
        }
        publish_event(
            self.events,
            DomainEvent::PaymentFailed {
                payment_id: payment.id,
                reservation_id: payment.reservation_id,
                user_id: payment.user_id.clone(),
                amount: payment.amount,
                reason: err.to_string(),
            },
        )
        .await;
    }
}
