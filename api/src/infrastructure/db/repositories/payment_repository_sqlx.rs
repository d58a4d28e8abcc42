use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::application::ports::payment_repository::PaymentRepository;
use crate::domain::payments::payment::{Payment, PaymentStatus};
use crate::infrastructure::db::PgPool;

pub struct SqlxPaymentRepository {
    pub pool: PgPool,
}

impl SqlxPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlxPaymentRepository {
    async fn insert(&self, payment: &Payment) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO payments (id, reservation_id, user_id, amount, status, method, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(payment.id)
        .bind(payment.reservation_id)
        .bind(&payment.user_id)
        .bind(payment.amount)
        .bind(payment.status.as_str())
        .bind(payment.method.as_str())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Payment>> {
        let row = sqlx::query(
            r#"SELECT id, reservation_id, user_id, amount, status, method, created_at, updated_at
               FROM payments WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(r) = row else {
            return Ok(None);
        };
        Ok(Some(Payment {
            id: r.get("id"),
            reservation_id: r.get("reservation_id"),
            user_id: r.get("user_id"),
            amount: r.get("amount"),
            status: r.get::<String, _>("status").parse()?,
            method: r.get::<String, _>("method").parse()?,
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    async fn update_if_status(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(payment.id)
        .bind(payment.status.as_str())
        .bind(payment.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
