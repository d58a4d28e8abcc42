use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::notifier::Notifier;
use crate::application::services::events::EventHandler;
use crate::domain::events::event::{DomainEvent, EventEnvelope, topics};

pub const GROUP: &str = "notification-service";

pub struct NotificationEventHandler {
    pub notifier: Arc<dyn Notifier>,
}

pub fn message_for(event: &DomainEvent) -> Option<(String, String)> {
    match event {
        DomainEvent::PaymentCompleted {
            user_id,
            reservation_id,
            amount,
            ..
        } => Some((
            user_id.clone(),
            format!("Payment of {amount} KRW completed for reservation {reservation_id}."),
        )),
        DomainEvent::ReservationCompleted {
            user_id,
            seat_number,
            concert_id,
            ..
        } => Some((
            user_id.clone(),
            format!(
                "Seat {seat_number} for concert {concert_id} is held for you. Complete payment before the hold expires."
            ),
        )),
        DomainEvent::UserActivated { user_id, .. } => Some((
            user_id.clone(),
            "It's your turn. You can now book seats.".to_string(),
        )),
        DomainEvent::BalanceCharged {
            user_id,
            amount,
            balance_after,
        } => Some((
            user_id.clone(),
            format!("Charged {amount} KRW. Current balance is {balance_after} KRW."),
        )),
        _ => None,
    }
}

#[async_trait]
impl EventHandler for NotificationEventHandler {
    fn group(&self) -> &'static str {
        GROUP
    }

    fn topics(&self) -> &'static [&'static str] {
        &[
            topics::PAYMENT,
            topics::RESERVATION,
            topics::QUEUE,
            topics::BALANCE,
        ]
    }

    async fn handle(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        if let Some((user_id, message)) = message_for(&envelope.event) {
            self.notifier.notify(&user_id, &message).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::RecordingNotifier;
    use chrono::Utc;

    #[tokio::test]
    async fn notifies_only_user_facing_events() {
        let notifier = Arc::new(RecordingNotifier::default());
        let handler = NotificationEventHandler {
            notifier: notifier.clone(),
        };
        let now = Utc::now();
        handler
            .handle(&EventEnvelope::new(
                DomainEvent::UserActivated {
                    user_id: "u1".into(),
                    token: "t".into(),
                },
                now,
            ))
            .await
            .unwrap();
        handler
            .handle(&EventEnvelope::new(
                DomainEvent::TokenExpired {
                    user_id: "u1".into(),
                    token: "t".into(),
                },
                now,
            ))
            .await
            .unwrap();
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "u1");
    }
}
