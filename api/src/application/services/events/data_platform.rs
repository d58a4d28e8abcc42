use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::data_platform::DataPlatformClient;
use crate::application::ports::failed_transfer_repository::FailedTransferRepository;
use crate::application::services::events::EventHandler;
use crate::application::services::transfers::deliver_or_record;
use crate::domain::events::event::{DomainEvent, EventEnvelope, topics};
use crate::domain::transfers::failed_transfer::ReservationData;

pub const GROUP: &str = "data-platform";

pub struct DataPlatformEventHandler {
    pub client: Arc<dyn DataPlatformClient>,
    pub failures: Arc<dyn FailedTransferRepository>,
}

#[async_trait]
impl EventHandler for DataPlatformEventHandler {
    fn group(&self) -> &'static str {
        GROUP
    }

    fn topics(&self) -> &'static [&'static str] {
        &[topics::RESERVATION]
    }

    async fn handle(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        if let DomainEvent::ReservationCompleted {
            reservation_id,
            user_id,
            concert_id,
            seat_number,
            price,
            reserved_at,
            ..
        } = &envelope.event
        {
            let data = ReservationData {
                reservation_id: *reservation_id,
                user_id: user_id.clone(),
                concert_id: *concert_id,
                seat_number: *seat_number,
                price: *price,
                reserved_at: *reserved_at,
            };
            deliver_or_record(self.client.as_ref(), self.failures.as_ref(), &data).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{FakeDataPlatform, MemoryStore};
    use chrono::Utc;
    use uuid::Uuid;

    fn completed() -> EventEnvelope {
        EventEnvelope::new(
            DomainEvent::ReservationCompleted {
                reservation_id: Uuid::new_v4(),
                user_id: "u1".into(),
                concert_id: 1,
                seat_id: 5,
                seat_number: 5,
                price: 70_000,
                reserved_at: Utc::now(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn failed_send_is_recorded_for_retry() {
        let client = Arc::new(FakeDataPlatform::default());
        let store = Arc::new(MemoryStore::default());
        let handler = DataPlatformEventHandler {
            client: client.clone(),
            failures: store.clone(),
        };

        handler.handle(&completed()).await.unwrap();
        assert_eq!(client.sent().len(), 1);
        assert!(store.failed_transfers().is_empty());

        client.set_failing(true);
        handler.handle(&completed()).await.unwrap();
        let failed = store.failed_transfers();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].retry_count, 0);
        assert!(failed[0].error_message.is_some());
    }
}
