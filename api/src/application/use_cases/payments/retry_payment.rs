use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::balance_repository::BalanceRepository;
use crate::application::ports::concert_repository::ConcertRepository;
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::payment_repository::PaymentRepository;
use crate::application::ports::reservation_repository::ReservationRepository;
use crate::application::ports::seat_repository::SeatRepository;
use crate::application::use_cases::payments::process_payment::ProcessPayment;
use crate::domain::payments::payment::{Payment, PaymentStatus};

/// Re-runs a failed payment as a new payment record; the failed one is left as is.
pub struct RetryPayment<'a, R, S, C, P, B, L, E>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    C: ConcertRepository + ?Sized,
    P: PaymentRepository + ?Sized,
    B: BalanceRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub process: ProcessPayment<'a, R, S, C, P, B, L, E>,
}

impl<'a, R, S, C, P, B, L, E> RetryPayment<'a, R, S, C, P, B, L, E>
where
    R: ReservationRepository + ?Sized,
    S: SeatRepository + ?Sized,
    C: ConcertRepository + ?Sized,
    P: PaymentRepository + ?Sized,
    B: BalanceRepository + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(&self, id: Uuid) -> ServiceResult<Payment> {
        let failed = self
            .process
            .payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment", id))?;
        if failed.status != PaymentStatus::Failed {
            return Err(ServiceError::InvalidArgument(format!(
                "only failed payments can be retried (status {})",
                failed.status.as_str()
            )));
        }
        tracing::info!(payment_id = %id, reservation_id = %failed.reservation_id, "payment_retry");
        self.process
            .execute(failed.reservation_id, &failed.user_id)
            .await
    }
}
