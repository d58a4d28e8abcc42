use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod topics {
    pub const BALANCE: &str = "balance-events";
    pub const PAYMENT: &str = "payment-events";
    pub const RESERVATION: &str = "reservation-events";
    pub const CONCERT: &str = "concert-events";
    pub const QUEUE: &str = "queue-events";

    pub const ALL: [&str; 5] = [BALANCE, PAYMENT, RESERVATION, CONCERT, QUEUE];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    #[serde(rename_all = "camelCase")]
    BalanceCharged {
        user_id: String,
        amount: i64,
        balance_after: i64,
    },
    #[serde(rename_all = "camelCase")]
    PaymentCompleted {
        payment_id: Uuid,
        reservation_id: Uuid,
        user_id: String,
        amount: i64,
    },
    #[serde(rename_all = "camelCase")]
    PaymentFailed {
        payment_id: Uuid,
        reservation_id: Uuid,
        user_id: String,
        amount: i64,
        reason: String,
    },
    #[serde(rename_all = "camelCase")]
    ReservationCompleted {
        reservation_id: Uuid,
        user_id: String,
        concert_id: i64,
        seat_id: i64,
        seat_number: i32,
        price: i64,
        reserved_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ReservationCancelled {
        reservation_id: Uuid,
        user_id: String,
        concert_id: i64,
        seat_number: i32,
    },
    #[serde(rename_all = "camelCase")]
    ConcertSoldOut {
        concert_id: i64,
        title: String,
        booking_started_at: DateTime<Utc>,
        sold_out_at: DateTime<Utc>,
        total_seats: i32,
        duration_minutes: i64,
    },
    #[serde(rename_all = "camelCase")]
    UserActivated { user_id: String, token: String },
    #[serde(rename_all = "camelCase")]
    TokenExpired { user_id: String, token: String },
}

impl DomainEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            DomainEvent::BalanceCharged { .. } => topics::BALANCE,
            DomainEvent::PaymentCompleted { .. } | DomainEvent::PaymentFailed { .. } => {
                topics::PAYMENT
            }
            DomainEvent::ReservationCompleted { .. } | DomainEvent::ReservationCancelled { .. } => {
                topics::RESERVATION
            }
            DomainEvent::ConcertSoldOut { .. } => topics::CONCERT,
            DomainEvent::UserActivated { .. } | DomainEvent::TokenExpired { .. } => topics::QUEUE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::BalanceCharged { .. } => "BALANCE_CHARGED",
            DomainEvent::PaymentCompleted { .. } => "PAYMENT_COMPLETED",
            DomainEvent::PaymentFailed { .. } => "PAYMENT_FAILED",
            DomainEvent::ReservationCompleted { .. } => "RESERVATION_COMPLETED",
            DomainEvent::ReservationCancelled { .. } => "RESERVATION_CANCELLED",
            DomainEvent::ConcertSoldOut { .. } => "CONCERT_SOLD_OUT",
            DomainEvent::UserActivated { .. } => "USER_ACTIVATED",
            DomainEvent::TokenExpired { .. } => "TOKEN_EXPIRED",
        }
    }

    /// Partition key: the user for account-scoped events, the concert otherwise.
    pub fn key(&self) -> String {
        match self {
            DomainEvent::BalanceCharged { user_id, .. }
            | DomainEvent::PaymentCompleted { user_id, .. }
            | DomainEvent::PaymentFailed { user_id, .. }
            | DomainEvent::UserActivated { user_id, .. }
            | DomainEvent::TokenExpired { user_id, .. } => user_id.clone(),
            DomainEvent::ReservationCompleted { concert_id, .. }
            | DomainEvent::ReservationCancelled { concert_id, .. }
            | DomainEvent::ConcertSoldOut { concert_id, .. } => concert_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(event: DomainEvent, now: DateTime<Utc>) -> Self {
        EventEnvelope {
            event_id: Uuid::new_v4(),
            timestamp: now,
            key: Some(event.key()),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wire_shape() {
        let now = Utc::now();
        let env = EventEnvelope::new(
            DomainEvent::BalanceCharged {
                user_id: "user-1".into(),
                amount: 10_000,
                balance_after: 30_000,
            },
            now,
        );
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["key"], "user-1");
        assert_eq!(json["event"]["eventType"], "BALANCE_CHARGED");
        assert_eq!(json["event"]["balanceAfter"], 30_000);
        assert!(json.get("eventId").is_some());
        let back: EventEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn topics_by_event() {
        let e = DomainEvent::TokenExpired {
            user_id: "u".into(),
            token: "t".into(),
        };
        assert_eq!(e.topic(), topics::QUEUE);
        assert_eq!(e.name(), "TOKEN_EXPIRED");
        let c = DomainEvent::ReservationCancelled {
            reservation_id: Uuid::new_v4(),
            user_id: "u".into(),
            concert_id: 9,
            seat_number: 1,
        };
        assert_eq!(c.topic(), topics::RESERVATION);
        assert_eq!(c.key(), "9");
    }
}
