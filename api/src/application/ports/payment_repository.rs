use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::payments::payment::{Payment, PaymentStatus};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn insert(&self, payment: &Payment) -> anyhow::Result<()>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>>;
    async fn update_if_status(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> anyhow::Result<bool>;
}
