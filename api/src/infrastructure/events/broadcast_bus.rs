use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::application::ports::event_bus::{
    Delivery, DeliveryStream, EventPublisher, EventSubscriber,
};
use crate::domain::events::event::EventEnvelope;

/// In-process bus for single-node runs. Acks are no-ops.
pub struct BroadcastEventBus {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<EventEnvelope>>>,
    sequence: AtomicU64,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Mutex::new(HashMap::new()),
            sequence: AtomicU64::new(0),
        }
    }

    fn sender(&self, topic: &str) -> anyhow::Result<broadcast::Sender<EventEnvelope>> {
        let mut channels = self
            .channels
            .lock()
            .map_err(|_| anyhow!("event channel registry poisoned"))?;
        Ok(channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone())
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> anyhow::Result<()> {
        match self.sender(topic)?.send(envelope.clone()) {
            Ok(_) => Ok(()),
            // No subscriber yet for this topic.
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }
}

#[async_trait]
impl EventSubscriber for BroadcastEventBus {
    async fn subscribe(&self, topic: &str, group: &str) -> anyhow::Result<DeliveryStream> {
        let rx = self.sender(topic)?.subscribe();
        let topic = topic.to_string();
        let group = group.to_string();
        let start = self.sequence.fetch_add(1, Ordering::Relaxed) << 32;
        let counter = AtomicU64::new(start);
        let stream = BroadcastStream::new(rx).filter_map(move |item| {
            let out = match item {
                Ok(envelope) => Some(Ok(Delivery {
                    id: counter.fetch_add(1, Ordering::Relaxed).to_string(),
                    envelope,
                })),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %topic, group = %group, skipped, "event_consumer_lagged");
                    None
                }
            };
            futures_util::future::ready(out)
        });
        Ok(stream.boxed())
    }

    async fn ack(&self, _topic: &str, _group: &str, _delivery_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::event::{DomainEvent, topics};
    use chrono::Utc;

    #[tokio::test]
    async fn every_group_sees_each_event() {
        let bus = BroadcastEventBus::new(16);
        let mut a = bus.subscribe(topics::BALANCE, "a").await.unwrap();
        let mut b = bus.subscribe(topics::BALANCE, "b").await.unwrap();
        let envelope = EventEnvelope::new(
            DomainEvent::BalanceCharged {
                user_id: "u".into(),
                amount: 10_000,
                balance_after: 10_000,
            },
            Utc::now(),
        );
        bus.publish(topics::BALANCE, &envelope).await.unwrap();
        assert_eq!(a.next().await.unwrap().unwrap().envelope, envelope);
        assert_eq!(b.next().await.unwrap().unwrap().envelope, envelope);
    }

    #[tokio::test]
    async fn publishing_without_subscribers_is_fine() {
        let bus = BroadcastEventBus::new(4);
        let envelope = EventEnvelope::new(
            DomainEvent::TokenExpired {
                user_id: "u".into(),
                token: "t".into(),
            },
            Utc::now(),
        );
        bus.publish(topics::QUEUE, &envelope).await.unwrap();
    }
}
