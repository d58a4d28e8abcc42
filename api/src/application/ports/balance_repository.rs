use async_trait::async_trait;

use crate::domain::balance::balance::Balance;
use crate::domain::balance::transaction::{BalanceTransaction, TransactionKind};

#[derive(Debug, Clone)]
pub struct BalanceChange {
    pub balance: Balance,
    pub transaction: BalanceTransaction,
}

#[async_trait]
pub trait BalanceRepository: Send + Sync {
    async fn find(&self, user_id: &str) -> anyhow::Result<Option<Balance>>;
    /// Adds to the balance, creating the account when missing, and records the transaction.
    async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        kind: TransactionKind,
        description: String,
    ) -> anyhow::Result<BalanceChange>;
    /// Subtracts only when the balance covers `amount`; `None` otherwise.
    async fn debit(
        &self,
        user_id: &str,
        amount: i64,
        description: String,
    ) -> anyhow::Result<Option<BalanceChange>>;
    async fn list_transactions(
        &self,
        user_id: &str,
        limit: i64,
    ) -> anyhow::Result<Vec<BalanceTransaction>>;
}
