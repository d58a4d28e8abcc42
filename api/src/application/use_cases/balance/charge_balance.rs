use crate::application::error::ServiceResult;
use crate::application::ports::balance_repository::BalanceRepository;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::services::events::publish_event;
use crate::domain::balance::balance::{Balance, validate_charge_amount};
use crate::domain::balance::transaction::{TransactionKind, charge_description};
use crate::domain::events::event::DomainEvent;
use crate::domain::reservations::reservation::validate_user_id;

pub struct ChargeBalance<'a, B, E>
where
    B: BalanceRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub balances: &'a B,
    pub events: &'a E,
}

impl<'a, B, E> ChargeBalance<'a, B, E>
where
    B: BalanceRepository + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(&self, user_id: &str, amount: i64) -> ServiceResult<Balance> {
        validate_user_id(user_id)?;
        validate_charge_amount(amount)?;
        let change = self
            .balances
            .credit(user_id, amount, TransactionKind::Charge, charge_description())
            .await?;
        tracing::info!(user_id, amount, balance = change.balance.amount, "balance_charged");
        publish_event(
            self.events,
            DomainEvent::BalanceCharged {
                user_id: user_id.to_string(),
                amount,
                balance_after: change.balance.amount,
            },
        )
        .await;
        Ok(change.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ServiceError;
    use crate::application::test_support::{MemoryStore, RecordingPublisher};

    #[tokio::test]
    async fn charges_accumulate() {
        let store = MemoryStore::default();
        let events = RecordingPublisher::default();
        let uc = ChargeBalance {
            balances: &store,
            events: &events,
        };
        uc.execute("user-1", 10_000).await.unwrap();
        let b = uc.execute("user-1", 25_000).await.unwrap();
        assert_eq!(b.amount, 35_000);
        assert_eq!(store.balance_of("user-1"), 35_000);
        assert_eq!(events.names(), vec!["BALANCE_CHARGED", "BALANCE_CHARGED"]);
        match &events.events()[1] {
            DomainEvent::BalanceCharged { balance_after, .. } => assert_eq!(*balance_after, 35_000),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_bad_amounts() {
        let store = MemoryStore::default();
        let events = RecordingPublisher::default();
        let uc = ChargeBalance {
            balances: &store,
            events: &events,
        };
        for amount in [0, 9_000, 10_500, 1_001_000] {
            assert!(matches!(
                uc.execute("user-1", amount).await,
                Err(ServiceError::InvalidArgument(_))
            ));
        }
        assert!(events.names().is_empty());
        assert_eq!(store.balance_of("user-1"), 0);
    }
}
