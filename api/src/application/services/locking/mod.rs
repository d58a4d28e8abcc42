use std::time::Duration;

use uuid::Uuid;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::distributed_lock::DistributedLock;

pub const QUEUE_LOCK_KEY: &str = "queue:lock";
pub const SEAT_LOCK_TTL: Duration = Duration::from_secs(10);
pub const PAYMENT_LOCK_TTL: Duration = Duration::from_secs(10);

pub fn seat_lock_key(concert_id: i64, seat_number: i32) -> String {
    format!("seat_lock:{concert_id}:{seat_number}")
}

pub fn reservation_payment_lock_key(reservation_id: Uuid) -> String {
    format!("payment:reservation:{reservation_id}")
}

pub fn balance_lock_key(user_id: &str) -> String {
    format!("payment:balance:{user_id}")
}

/// Unique per attempt so a retry by the same user never releases someone else's hold.
pub fn lock_owner(user_id: &str) -> String {
    format!("{user_id}_{}", Uuid::new_v4())
}

pub async fn acquire<L: DistributedLock + ?Sized>(
    lock: &L,
    key: &str,
    owner: &str,
    ttl: Duration,
    busy_message: &str,
) -> ServiceResult<()> {
    if lock.try_acquire(key, owner, ttl).await? {
        Ok(())
    } else {
        tracing::debug!(lock = %key, "lock_busy");
        Err(ServiceError::Busy(busy_message.to_string()))
    }
}

pub async fn release<L: DistributedLock + ?Sized>(lock: &L, key: &str, owner: &str) {
    match lock.release(key, owner).await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(lock = %key, "lock_expired_before_release"),
        Err(e) => tracing::warn!(lock = %key, error = ?e, "lock_release_failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::MemoryLock;

    #[tokio::test]
    async fn second_owner_is_rejected_until_release() {
        let lock = MemoryLock::default();
        let key = seat_lock_key(1, 7);
        assert_eq!(key, "seat_lock:1:7");
        let a = lock_owner("user-1");
        let b = lock_owner("user-1");
        assert_ne!(a, b);
        acquire(&lock, &key, &a, SEAT_LOCK_TTL, "busy").await.unwrap();
        let err = acquire(&lock, &key, &b, SEAT_LOCK_TTL, "busy").await.unwrap_err();
        assert!(matches!(err, ServiceError::Busy(_)));
        release(&lock, &key, &b).await;
        assert!(lock.is_held(&key));
        release(&lock, &key, &a).await;
        assert!(!lock.is_held(&key));
    }
}
