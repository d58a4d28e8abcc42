use chrono::Utc;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::event_bus::EventPublisher;
use crate::application::ports::queue_store::QueueStore;
use crate::application::use_cases::queue::{QueuePolicy, expire_token};
use crate::domain::queue::token::{QueueStatus, QueueToken, estimate_wait_minutes};

pub struct GetQueueStatus<'a, Q, E>
where
    Q: QueueStore + ?Sized,
    E: EventPublisher + ?Sized,
{
    pub store: &'a Q,
    pub events: &'a E,
    pub policy: &'a QueuePolicy,
}

impl<'a, Q, E> GetQueueStatus<'a, Q, E>
where
    Q: QueueStore + ?Sized,
    E: EventPublisher + ?Sized,
{
    /// Session identifiers are optional; when given they must match the session the token was issued in.
    pub async fn execute(
        &self,
        token: &str,
        session_id: Option<&str>,
        device_fingerprint: Option<&str>,
    ) -> ServiceResult<QueueToken> {
        let now = Utc::now();
        let mut current = self
            .store
            .find_token(token)
            .await?
            .ok_or_else(|| ServiceError::QueueTokenInvalid("queue token not found".into()))?;

        if current.is_expired(now) {
            expire_token(self.store, self.events, &current).await?;
            return Err(ServiceError::QueueTokenInvalid("queue token has expired".into()));
        }

        if session_id.is_some() || device_fingerprint.is_some() {
            if let Some(mut session) = self.store.find_session(&current.user_id).await? {
                if !session.is_continuous(session_id, device_fingerprint, now) {
                    expire_token(self.store, self.events, &current).await?;
                    return Err(ServiceError::QueueTokenInvalid(
                        "session changed, please request a new token".into(),
                    ));
                }
                session.touch(now);
                self.store
                    .save_session(&current.user_id, &session, self.policy.token_ttl)
                    .await?;
            }
        }

        if current.status == QueueStatus::Waiting {
            if let Some(rank) = self.store.waiting_rank(&current.user_id).await? {
                let position = rank + 1;
                current.update_position(
                    position,
                    estimate_wait_minutes(position, self.policy.wait_secs_per_user),
                );
                self.store
                    .save_token(&current, current.remaining_ttl(now))
                    .await?;
            }
        }
        Ok(current)
    }
}
