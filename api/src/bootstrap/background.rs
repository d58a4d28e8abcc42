use std::sync::Arc;

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};

use crate::application::ports::event_bus::{DeliveryStream, EventSubscriber};
use crate::application::services::events::EventHandler;
use crate::application::use_cases::queue::activate_waiting::ActivateWaitingUsers;
use crate::application::use_cases::reservations::release_expired::ReleaseExpiredReservations;
use crate::application::use_cases::transfers::retry_failed::RetryFailedTransfers;
use crate::bootstrap::app_context::AppContext;

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

pub type TaskHandle = JoinHandle<anyhow::Result<()>>;

pub fn spawn_queue_activation(ctx: AppContext) -> TaskHandle {
    tokio::spawn(async move {
        let interval = Duration::from_secs(ctx.cfg.queue_activation_interval_secs.max(1));
        let policy = ctx.queue_policy();
        loop {
            let store = ctx.queue_store();
            let lock = ctx.lock();
            let events = ctx.event_publisher();
            let uc = ActivateWaitingUsers {
                store: store.as_ref(),
                lock: lock.as_ref(),
                events: events.as_ref(),
                policy: &policy,
            };
            match uc.execute().await {
                Ok(0) => {}
                Ok(activated) => tracing::debug!(activated, "queue_activation_tick"),
                Err(e) => tracing::error!(error = ?e, "queue_activation_failed"),
            }
            sleep(interval).await;
        }
    })
}

pub fn spawn_reservation_expiry(ctx: AppContext) -> TaskHandle {
    tokio::spawn(async move {
        let interval = Duration::from_secs(ctx.cfg.reservation_sweep_interval_secs.max(1));
        loop {
            let reservations = ctx.reservation_repo();
            let seats = ctx.seat_repo();
            let uc = ReleaseExpiredReservations {
                reservations: reservations.as_ref(),
                seats: seats.as_ref(),
            };
            match uc.execute().await {
                Ok(0) => {}
                Ok(released) => tracing::info!(released, "reservation_expiry_tick"),
                Err(e) => tracing::error!(error = ?e, "reservation_expiry_failed"),
            }
            sleep(interval).await;
        }
    })
}

/// Only runs when a data platform endpoint is configured.
pub fn spawn_transfer_retry(ctx: AppContext) -> Option<TaskHandle> {
    let client = ctx.data_platform()?;
    Some(tokio::spawn(async move {
        let interval = Duration::from_secs(ctx.cfg.data_retry_interval_secs.max(1));
        loop {
            sleep(interval).await;
            let failures = ctx.failed_transfer_repo();
            let uc = RetryFailedTransfers {
                client: client.as_ref(),
                failures: failures.as_ref(),
                max_attempts: ctx.cfg.data_retry_max_attempts,
            };
            match uc.execute().await {
                Ok(report) if report.succeeded + report.failed + report.abandoned > 0 => {
                    tracing::info!(
                        succeeded = report.succeeded,
                        failed = report.failed,
                        abandoned = report.abandoned,
                        "data_transfer_retry_tick"
                    )
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "data_transfer_retry_failed"),
            }
        }
    }))
}

/// One task per (handler, topic) pair.
pub fn spawn_event_consumers(
    subscriber: Arc<dyn EventSubscriber>,
    handlers: Vec<Arc<dyn EventHandler>>,
) -> Vec<TaskHandle> {
    let mut tasks = Vec::new();
    for handler in handlers {
        for topic in handler.topics() {
            let subscriber = subscriber.clone();
            let handler = handler.clone();
            let topic: &'static str = *topic;
            tasks.push(tokio::spawn(async move {
                loop {
                    match subscriber.subscribe(topic, handler.group()).await {
                        Ok(stream) => {
                            tracing::info!(topic, group = handler.group(), "event_consumer_started");
                            drain(subscriber.as_ref(), handler.as_ref(), topic, stream).await;
                            tracing::warn!(topic, group = handler.group(), "event_stream_closed");
                        }
                        Err(e) => {
                            tracing::error!(error = ?e, topic, group = handler.group(), "event_subscribe_failed")
                        }
                    }
                    sleep(RESUBSCRIBE_DELAY).await;
                }
            }));
        }
    }
    tasks
}

/// Handles deliveries until the stream ends. Every delivery is acked, even when handling fails.
pub async fn drain(
    subscriber: &dyn EventSubscriber,
    handler: &dyn EventHandler,
    topic: &str,
    mut stream: DeliveryStream,
) {
    let group = handler.group();
    while let Some(item) = stream.next().await {
        let delivery = match item {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = ?e, topic, group, "event_delivery_failed");
                continue;
            }
        };
        if let Err(e) = handler.handle(&delivery.envelope).await {
            tracing::error!(
                error = ?e,
                topic,
                group,
                event_id = %delivery.envelope.event_id,
                event = delivery.envelope.event.name(),
                "event_handler_failed"
            );
        }
        if let Err(e) = subscriber.ack(topic, group, &delivery.id).await {
            tracing::warn!(error = ?e, topic, group, delivery_id = %delivery.id, "event_ack_failed");
        }
    }
}
