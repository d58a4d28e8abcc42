use crate::application::error::ServiceResult;
use crate::application::ports::balance_repository::BalanceRepository;
use crate::domain::balance::transaction::BalanceTransaction;
use crate::domain::reservations::reservation::validate_user_id;

pub const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub struct ListBalanceTransactions<'a, B: BalanceRepository + ?Sized> {
    pub balances: &'a B,
}

impl<'a, B: BalanceRepository + ?Sized> ListBalanceTransactions<'a, B> {
    pub async fn execute(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<BalanceTransaction>> {
        validate_user_id(user_id)?;
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Ok(self.balances.list_transactions(user_id, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MemoryStore, RecordingPublisher};
    use crate::application::use_cases::balance::charge_balance::ChargeBalance;
    use crate::domain::balance::transaction::TransactionKind;

    #[tokio::test]
    async fn newest_first_with_clamped_limit() {
        let store = MemoryStore::default();
        let events = RecordingPublisher::default();
        let charge = ChargeBalance {
            balances: &store,
            events: &events,
        };
        for amount in [10_000, 20_000, 30_000] {
            charge.execute("u", amount).await.unwrap();
        }
        let uc = ListBalanceTransactions { balances: &store };
        let all = uc.execute("u", None).await.unwrap();
        assert_eq!(
            all.iter().map(|t| t.balance_after).collect::<Vec<_>>(),
            vec![60_000, 30_000, 10_000]
        );
        assert!(all.iter().all(|t| t.kind == TransactionKind::Charge));
        assert_eq!(uc.execute("u", Some(0)).await.unwrap().len(), 1);
        assert_eq!(uc.execute("u", Some(1_000)).await.unwrap().len(), 3);
    }
}
