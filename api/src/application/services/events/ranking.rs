use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::ranking_store::RankingStore;
use crate::application::services::events::EventHandler;
use crate::application::services::ranking;
use crate::domain::events::event::{DomainEvent, EventEnvelope, topics};

pub const GROUP: &str = "ranking-service";

pub struct RankingEventHandler {
    pub store: Arc<dyn RankingStore>,
}

#[async_trait]
impl EventHandler for RankingEventHandler {
    fn group(&self) -> &'static str {
        GROUP
    }

    fn topics(&self) -> &'static [&'static str] {
        &[topics::RESERVATION, topics::CONCERT]
    }

    async fn handle(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        match &envelope.event {
            DomainEvent::ReservationCompleted {
                reservation_id,
                concert_id,
                reserved_at,
                ..
            } => {
                let speed = ranking::record_booking(
                    self.store.as_ref(),
                    *concert_id,
                    &reservation_id.to_string(),
                    *reserved_at,
                )
                .await?;
                tracing::debug!(concert_id, speed, "booking_speed_updated");
            }
            DomainEvent::ConcertSoldOut {
                concert_id,
                booking_started_at,
                sold_out_at,
                total_seats,
                ..
            } => {
                let score = ranking::record_sold_out(
                    self.store.as_ref(),
                    *concert_id,
                    *booking_started_at,
                    *sold_out_at,
                    *total_seats,
                )
                .await?;
                tracing::info!(concert_id, score, "sold_out_ranking_updated");
            }
            _ => {}
        }
        Ok(())
    }
}
