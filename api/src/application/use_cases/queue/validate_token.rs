use chrono::Utc;

use crate::application::ports::queue_store::QueueStore;
use crate::domain::queue::token::QueueToken;

pub struct ValidateActiveToken<'a, Q: QueueStore + ?Sized> {
    pub store: &'a Q,
}

impl<'a, Q: QueueStore + ?Sized> ValidateActiveToken<'a, Q> {
    /// The token when it exists, has not expired and is active. Bad input yields `None`.
    pub async fn execute(&self, token: &str) -> anyhow::Result<Option<QueueToken>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        let now = Utc::now();
        Ok(self
            .store
            .find_token(token)
            .await?
            .filter(|t| t.is_active(now)))
    }

    pub async fn is_valid(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.execute(token).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryQueueStore;
    use chrono::Duration;

    #[tokio::test]
    async fn only_live_active_tokens_pass() {
        let store = MemoryQueueStore::default();
        let now = Utc::now();
        let active = QueueToken::active("a", now, Duration::minutes(30));
        let waiting = QueueToken::waiting("w", 3, 0, now, Duration::minutes(30));
        let stale = QueueToken::active("s", now - Duration::hours(1), Duration::minutes(30));
        for t in [&active, &waiting, &stale] {
            store.put_token(t.clone());
        }
        let uc = ValidateActiveToken { store: &store };
        assert!(uc.is_valid(&active.token).await.unwrap());
        assert!(!uc.is_valid(&waiting.token).await.unwrap());
        assert!(!uc.is_valid(&stale.token).await.unwrap());
        assert!(!uc.is_valid("").await.unwrap());
        assert!(!uc.is_valid("missing").await.unwrap());
    }
}
