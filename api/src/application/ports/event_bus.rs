use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::domain::events::event::EventEnvelope;

#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: String,
    pub envelope: EventEnvelope,
}

pub type DeliveryStream = BoxStream<'static, anyhow::Result<Delivery>>;

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, envelope: &EventEnvelope) -> anyhow::Result<()>;
}

#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Each group receives every event on the topic once.
    async fn subscribe(&self, topic: &str, group: &str) -> anyhow::Result<DeliveryStream>;
    async fn ack(&self, topic: &str, group: &str, delivery_id: &str) -> anyhow::Result<()>;
}
