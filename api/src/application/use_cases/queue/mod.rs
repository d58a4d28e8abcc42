pub mod activate_waiting;
pub mod get_status;
pub mod issue_token;
pub mod validate_token;

use chrono::{DateTime, Duration, Utc};

use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::queue_store::QueueStore;
use crate::application::services::events::publish_event;
use crate::domain::events::event::DomainEvent;
use crate::domain::queue::token::QueueToken;

#[derive(Debug, Clone)]
pub struct QueuePolicy {
    pub max_active_users: i64,
    pub token_ttl: Duration,
    pub wait_secs_per_user: i64,
    pub lock_ttl: std::time::Duration,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            max_active_users: 100,
            token_ttl: Duration::minutes(30),
            wait_secs_per_user: 10,
            lock_ttl: std::time::Duration::from_secs(5),
        }
    }
}

/// The user's token when it is still alive.
pub(crate) async fn current_token<Q: QueueStore + ?Sized>(
    store: &Q,
    user_id: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<QueueToken>> {
    let Some(token_id) = store.token_for_user(user_id).await? else {
        return Ok(None);
    };
    Ok(store
        .find_token(&token_id)
        .await?
        .filter(|t| !t.is_expired(now)))
}

/// Drops users whose active marker ran out from the active set.
pub(crate) async fn evict_expired_active<Q: QueueStore + ?Sized>(
    store: &Q,
) -> anyhow::Result<usize> {
    let mut evicted = 0;
    for user_id in store.active_users().await? {
        if !store.is_marked_active(&user_id).await? {
            store.deactivate(&user_id).await?;
            evicted += 1;
        }
    }
    if evicted > 0 {
        tracing::debug!(evicted, "queue_active_evicted");
    }
    Ok(evicted)
}

pub(crate) async fn expire_token<Q, E>(store: &Q, events: &E, token: &QueueToken) -> anyhow::Result<()>
where
    Q: QueueStore + ?Sized,
    E: EventPublisher + ?Sized,
{
    store.delete_token(token).await?;
    store.remove_waiting(&token.user_id).await?;
    store.deactivate(&token.user_id).await?;
    store.delete_session(&token.user_id).await?;
    tracing::info!(user_id = %token.user_id, "queue_token_expired");
    publish_event(
        events,
        DomainEvent::TokenExpired {
            user_id: token.user_id.clone(),
            token: token.token.clone(),
        },
    )
    .await;
    Ok(())
}
