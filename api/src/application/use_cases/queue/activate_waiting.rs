use chrono::Utc;
use uuid::Uuid;

use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::queue_store::QueueStore;
use crate::application::services::events::publish_event;
use crate::application::services::locking::{self, QUEUE_LOCK_KEY};
use crate::application::use_cases::queue::{QueuePolicy, current_token, evict_expired_active};
use crate::domain::events::event::DomainEvent;

pub struct ActivateWaitingUsers<'a, Q, L, E>
where
    Q: QueueStore + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub store: &'a Q,
    pub lock: &'a L,
    pub events: &'a E,
    pub policy: &'a QueuePolicy,
}

impl<'a, Q, L, E> ActivateWaitingUsers<'a, Q, L, E>
where
    Q: QueueStore + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    /// Fills free active slots from the head of the line. Skips the round when another node holds the lock.
    pub async fn execute(&self) -> anyhow::Result<usize> {
        let owner = Uuid::new_v4().to_string();
        if !self
            .lock
            .try_acquire(QUEUE_LOCK_KEY, &owner, self.policy.lock_ttl)
            .await?
        {
            tracing::debug!("queue_activation_skipped_lock_busy");
            return Ok(0);
        }
        let result = self.activate_locked().await;
        locking::release(self.lock, QUEUE_LOCK_KEY, &owner).await;
        result
    }

    async fn activate_locked(&self) -> anyhow::Result<usize> {
        evict_expired_active(self.store).await?;
        let free = self.policy.max_active_users - self.store.active_count().await?;
        if free <= 0 {
            return Ok(0);
        }
        let now = Utc::now();
        let ttl = self.policy.token_ttl;
        let mut activated = 0;
        for user_id in self.store.pop_waiting(free as usize).await? {
            let Some(mut token) = current_token(self.store, &user_id, now).await? else {
                tracing::debug!(user_id = %user_id, "queue_waiting_user_without_token");
                continue;
            };
            self.store.activate(&user_id, ttl).await?;
            token.activate(now, ttl);
            self.store.save_token(&token, ttl).await?;
            activated += 1;
            publish_event(
                self.events,
                DomainEvent::UserActivated {
                    user_id: user_id.clone(),
                    token: token.token.clone(),
                },
            )
            .await;
        }
        if activated > 0 {
            tracing::info!(activated, "queue_users_activated");
        }
        Ok(activated)
    }
}
