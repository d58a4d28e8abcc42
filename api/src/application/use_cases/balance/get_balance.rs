use chrono::Utc;

use crate::application::error::ServiceResult;
use crate::application::ports::balance_repository::BalanceRepository;
use crate::domain::balance::balance::Balance;
use crate::domain::reservations::reservation::validate_user_id;

pub struct GetBalance<'a, B: BalanceRepository + ?Sized> {
    pub balances: &'a B,
}

impl<'a, B: BalanceRepository + ?Sized> GetBalance<'a, B> {
    /// A user who never charged reads as an empty balance.
    pub async fn execute(&self, user_id: &str) -> ServiceResult<Balance> {
        validate_user_id(user_id)?;
        Ok(self
            .balances
            .find(user_id)
            .await?
            .unwrap_or_else(|| Balance::empty(user_id, Utc::now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryStore;

    #[tokio::test]
    async fn missing_balance_is_zero() {
        let store = MemoryStore::default();
        let uc = GetBalance { balances: &store };
        assert_eq!(uc.execute("nobody").await.unwrap().amount, 0);
        store.set_balance("rich", 50_000);
        assert_eq!(uc.execute("rich").await.unwrap().amount, 50_000);
    }
}
