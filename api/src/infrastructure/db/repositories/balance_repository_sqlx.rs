use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use crate::application::ports::balance_repository::{BalanceChange, BalanceRepository};
use crate::domain::balance::balance::Balance;
use crate::domain::balance::transaction::{BalanceTransaction, TransactionKind};
use crate::infrastructure::db::PgPool;

pub struct SqlxBalanceRepository {
    pub pool: PgPool,
}

impl SqlxBalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn balance_from_row(r: &PgRow) -> Balance {
    Balance {
        user_id: r.get("user_id"),
        amount: r.get("amount"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    balance: &Balance,
    kind: TransactionKind,
    amount: i64,
    description: String,
) -> anyhow::Result<BalanceTransaction> {
    let transaction = BalanceTransaction::record(
        &balance.user_id,
        kind,
        amount,
        balance.amount,
        Some(description),
        Utc::now(),
    )?;
    sqlx::query(
        r#"INSERT INTO balance_transactions (id, user_id, kind, amount, balance_after, description, created_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
    )
    .bind(transaction.id)
    .bind(&transaction.user_id)
    .bind(transaction.kind.as_str())
    .bind(transaction.amount)
    .bind(transaction.balance_after)
    .bind(&transaction.description)
    .bind(transaction.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(transaction)
}

#[async_trait]
impl BalanceRepository for SqlxBalanceRepository {
    async fn find(&self, user_id: &str) -> anyhow::Result<Option<Balance>> {
        let row = sqlx::query(
            "SELECT user_id, amount, created_at, updated_at FROM balances WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(balance_from_row))
    }

    async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        kind: TransactionKind,
        description: String,
    ) -> anyhow::Result<BalanceChange> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"INSERT INTO balances (user_id, amount) VALUES ($1, $2)
               ON CONFLICT (user_id) DO UPDATE
                   SET amount = balances.amount + EXCLUDED.amount, updated_at = now()
               RETURNING user_id, amount, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;
        let balance = balance_from_row(&row);
        let transaction = insert_transaction(&mut tx, &balance, kind, amount, description).await?;
        tx.commit().await?;
        Ok(BalanceChange {
            balance,
            transaction,
        })
    }

    async fn debit(
        &self,
        user_id: &str,
        amount: i64,
        description: String,
    ) -> anyhow::Result<Option<BalanceChange>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"UPDATE balances SET amount = amount - $2, updated_at = now()
               WHERE user_id = $1 AND amount >= $2
               RETURNING user_id, amount, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let balance = balance_from_row(&row);
        let transaction = insert_transaction(
            &mut tx,
            &balance,
            TransactionKind::Payment,
            amount,
            description,
        )
        .await?;
        tx.commit().await?;
        Ok(Some(BalanceChange {
            balance,
            transaction,
        }))
    }

    async fn list_transactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<BalanceTransaction>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, kind, amount, balance_after, description, created_at
               FROM balance_transactions
               WHERE user_id = $1
               ORDER BY created_at DESC
               LIMIT $2"#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|r| {
                Ok(BalanceTransaction {
                    id: r.get("id"),
                    user_id: r.get("user_id"),
                    kind: r.get::<String, _>("kind").parse()?,
                    amount: r.get("amount"),
                    balance_after: r.get("balance_after"),
                    description: r.get("description"),
                    created_at: r.get("created_at"),
                })
            })
            .collect()
    }
}
