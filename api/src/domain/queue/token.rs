use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A session idle for longer than this is treated as a new visit.
pub const SESSION_IDLE_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    Waiting,
    Active,
    Expired,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "WAITING",
            QueueStatus::Active => "ACTIVE",
            QueueStatus::Expired => "EXPIRED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting in queue",
            QueueStatus::Active => "ready to book",
            QueueStatus::Expired => "token expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueToken {
    pub token: String,
    pub user_id: String,
    pub queue_position: i64,
    pub estimated_wait_minutes: i64,
    pub status: QueueStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl QueueToken {
    pub fn active(user_id: &str, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self::build(user_id, QueueStatus::Active, 0, 0, now, ttl)
    }

    pub fn waiting(
        user_id: &str,
        position: i64,
        wait_minutes: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self::build(user_id, QueueStatus::Waiting, position, wait_minutes, now, ttl)
    }

    fn build(
        user_id: &str,
        status: QueueStatus,
        position: i64,
        wait_minutes: i64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        QueueToken {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            queue_position: position,
            estimated_wait_minutes: wait_minutes,
            status,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueStatus::Expired || now > self.expires_at
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.status == QueueStatus::Active && !self.is_expired(now)
    }

    pub fn activate(&mut self, now: DateTime<Utc>, ttl: Duration) {
        self.status = QueueStatus::Active;
        self.queue_position = 0;
        self.estimated_wait_minutes = 0;
        self.expires_at = now + ttl;
    }

    pub fn update_position(&mut self, position: i64, wait_minutes: i64) {
        self.queue_position = position;
        self.estimated_wait_minutes = wait_minutes;
    }

    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

pub fn estimate_wait_minutes(position: i64, wait_secs_per_user: i64) -> i64 {
    position.max(0) * wait_secs_per_user / 60
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: Option<String>,
    pub device_fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionInfo {
    pub fn start(
        session_id: Option<String>,
        device_fingerprint: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        SessionInfo {
            session_id,
            device_fingerprint,
            created_at: now,
            last_activity: now,
        }
    }

    /// Missing identifiers on either side are not held against the caller.
    pub fn is_continuous(
        &self,
        session_id: Option<&str>,
        device_fingerprint: Option<&str>,
        now: DateTime<Utc>,
    ) -> bool {
        let (Some(session_id), Some(device_fingerprint)) = (session_id, device_fingerprint) else {
            return true;
        };
        let same_session = self
            .session_id
            .as_deref()
            .map(|s| s == session_id)
            .unwrap_or(true);
        let same_device = self
            .device_fingerprint
            .as_deref()
            .map(|d| d == device_fingerprint)
            .unwrap_or(true);
        let recent = now - self.last_activity <= Duration::minutes(SESSION_IDLE_MINUTES);
        same_session && same_device && recent
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }
}
