pub mod data_platform;
pub mod notification;
pub mod ranking;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::event_bus::EventPublisher;
use crate::domain::events::event::{DomainEvent, EventEnvelope};

/// Publishes after the state change is already persisted; failures are logged, never returned.
pub async fn publish_event<E: EventPublisher + ?Sized>(events: &E, event: DomainEvent) {
    let name = event.name();
    let topic = event.topic();
    let envelope = EventEnvelope::new(event, Utc::now());
    if let Err(e) = events.publish(topic, &envelope).await {
        tracing::error!(error = ?e, event = name, topic, "event_publish_failed");
    }
}

/// A consumer group and the topics it listens on.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn group(&self) -> &'static str;
    fn topics(&self) -> &'static [&'static str];
    async fn handle(&self, envelope: &EventEnvelope) -> anyhow::Result<()>;
}
