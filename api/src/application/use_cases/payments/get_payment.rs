use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::payment_repository::PaymentRepository;
use crate::domain::payments::payment::Payment;

pub struct GetPayment<'a, P: PaymentRepository + ?Sized> {
    pub payments: &'a P,
}

impl<'a, P: PaymentRepository + ?Sized> GetPayment<'a, P> {
    pub async fn execute(&self, id: Uuid) -> ServiceResult<Payment> {
        self.payments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("payment", id))
    }
}
