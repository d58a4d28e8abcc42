use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::distributed_lock::DistributedLock;
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::queue_store::QueueStore;
use crate::application::services::locking::{self, QUEUE_LOCK_KEY};
use crate::application::use_cases::queue::{
    QueuePolicy, current_token, evict_expired_active, expire_token,
};
use crate::domain::queue::token::{QueueToken, SessionInfo, estimate_wait_minutes};
use crate::domain::reservations::reservation::validate_user_id;

pub struct IssueQueueToken<'a, Q, L, E>
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

impl<'a, Q, L, E> IssueQueueToken<'a, Q, L, E>
where
    Q: QueueStore + ?Sized,
    L: DistributedLock + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        device_fingerprint: Option<&str>,
    ) -> ServiceResult<QueueToken> {
        validate_user_id(user_id)?;
        let now = Utc::now();
        let ttl = self.policy.token_ttl;

        if let Some(fp) = device_fingerprint {
            if let Some(owner) = self.store.device_owner(fp).await? {
                if owner != user_id {
                    tracing::warn!(user_id, "queue_device_bound_to_other_user");
                    return Err(ServiceError::QueueAccessDenied(
                        "this device is already queued for another user".into(),
                    ));
                }
            }
            self.store.bind_device(fp, user_id, ttl).await?;
        }

        if let Some(mut session) = self.store.find_session(user_id).await? {
            if session.is_continuous(session_id, device_fingerprint, now) {
                if let Some(existing) = current_token(self.store, user_id, now).await? {
                    session.touch(now);
                    self.store.save_session(user_id, &session, ttl).await?;
                    return Ok(existing);
                }
            } else if let Some(stale) = current_token(self.store, user_id, now).await? {
                tracing::info!(user_id, "queue_session_changed_reissuing");
                expire_token(self.store, self.events, &stale).await?;
            }
        }

        let session = SessionInfo::start(
            session_id.map(str::to_string),
            device_fingerprint.map(str::to_string),
            now,
        );
        self.store.save_session(user_id, &session, ttl).await?;

        let owner = Uuid::new_v4().to_string();
        if !self
            .lock
            .try_acquire(QUEUE_LOCK_KEY, &owner, self.policy.lock_ttl)
            .await?
        {
            return Err(ServiceError::QueueAccessDenied(
                "queue is busy, please retry".into(),
            ));
        }
        let result = self.issue_locked(user_id, now).await;
        locking::release(self.lock, QUEUE_LOCK_KEY, &owner).await;
        result
    }

    async fn issue_locked(&self, user_id: &str, now: DateTime<Utc>) -> ServiceResult<QueueToken> {
        let ttl = self.policy.token_ttl;
        evict_expired_active(self.store).await?;

        if let Some(existing) = current_token(self.store, user_id, now).await? {
            return Ok(existing);
        }

        let active = self.store.active_count().await?;
        let token = if active < self.policy.max_active_users {
            self.store.activate(user_id, ttl).await?;
            QueueToken::active(user_id, now, ttl)
        } else {
            self.store
                .enqueue_waiting(user_id, now.timestamp_millis())
                .await?;
            let rank = match self.store.waiting_rank(user_id).await? {
                Some(rank) => rank,
                None => self.store.waiting_count().await? - 1,
            };
            let position = rank + 1;
            QueueToken::waiting(
                user_id,
                position,
                estimate_wait_minutes(position, self.policy.wait_secs_per_user),
                now,
                ttl,
            )
        };
        self.store.save_token(&token, ttl).await?;
        tracing::info!(
            user_id,
            status = token.status.as_str(),
            position = token.queue_position,
            "queue_token_issued"
        );
        Ok(token)
    }
}
