use std::net::SocketAddr;

use axum::{
    Router,
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::error::ServiceError;
use crate::application::use_cases::queue::get_status::GetQueueStatus;
use crate::application::use_cases::queue::issue_token::IssueQueueToken;
use crate::application::use_cases::queue::validate_token::ValidateActiveToken;
use crate::bootstrap::app_context::AppContext;
use crate::domain::queue::token::QueueToken;
use crate::presentation::http::extract::AppJson;
use crate::presentation::http::fingerprint::derive_fingerprint;
use crate::presentation::http::queue_token::bearer_token;
use crate::presentation::http::response::{ApiError, ApiResult, created, ok};

pub const SESSION_HEADER: &str = "x-session-id";
pub const FINGERPRINT_HEADER: &str = "x-device-fingerprint";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    pub user_id: String,
    pub device_fingerprint: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueueTokenResponse {
    pub token: String,
    pub user_id: String,
    pub queue_position: i64,
    pub estimated_wait_minutes: i64,
    /// WAITING | ACTIVE | EXPIRED
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<QueueToken> for QueueTokenResponse {
    fn from(t: QueueToken) -> Self {
        QueueTokenResponse {
            status: t.status.as_str().to_string(),
            token: t.token,
            user_id: t.user_id,
            queue_position: t.queue_position,
            estimated_wait_minutes: t.estimated_wait_minutes,
            issued_at: t.issued_at,
            expires_at: t.expires_at,
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/api/queue/token",
    tag = "Queue",
    request_body = IssueTokenRequest,
    responses(
        (status = 201, description = "Token issued", body = QueueTokenResponse),
        (status = 429, description = "Queue access denied")
    )
)]
pub async fn issue_token(
    State(ctx): State<AppContext>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    AppJson(req): AppJson<IssueTokenRequest>,
) -> ApiResult<QueueTokenResponse> {
    let fingerprint = non_blank(req.device_fingerprint)
        .unwrap_or_else(|| derive_fingerprint(&headers, connect.map(|c| c.0)));
    let session_id = non_blank(req.session_id);
    let store = ctx.queue_store();
    let lock = ctx.lock();
    let events = ctx.event_publisher();
    let policy = ctx.queue_policy();
    let uc = IssueQueueToken {
        store: store.as_ref(),
        lock: lock.as_ref(),
        events: events.as_ref(),
        policy: &policy,
    };
    let token = uc
        .execute(req.user_id.trim(), session_id.as_deref(), Some(&fingerprint))
        .await?;
    created(token.into(), "queue token issued")
}

#[utoipa::path(
    get,
    path = "/api/queue/status",
    tag = "Queue",
    params(
        ("X-Session-Id" = Option<String>, Header, description = "Session bound to the token"),
        ("X-Device-Fingerprint" = Option<String>, Header, description = "Device bound to the token")
    ),
    responses(
        (status = 200, body = QueueTokenResponse),
        (status = 401, description = "Queue token invalid")
    )
)]
pub async fn queue_status(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> ApiResult<QueueTokenResponse> {
    let token = bearer_token(&headers).ok_or(ApiError::MissingToken)?;
    let session_id = header_value(&headers, SESSION_HEADER);
    let fingerprint = header_value(&headers, FINGERPRINT_HEADER);
    let store = ctx.queue_store();
    let events = ctx.event_publisher();
    let policy = ctx.queue_policy();
    let uc = GetQueueStatus {
        store: store.as_ref(),
        events: events.as_ref(),
        policy: &policy,
    };
    let status = uc
        .execute(&token, session_id.as_deref(), fingerprint.as_deref())
        .await?;
    ok(status.into())
}

#[utoipa::path(
    post,
    path = "/api/queue/validate",
    tag = "Queue",
    responses(
        (status = 200, body = bool),
        (status = 401, description = "Token is not active")
    )
)]
pub async fn validate_token(State(ctx): State<AppContext>, headers: HeaderMap) -> ApiResult<bool> {
    let token = bearer_token(&headers).ok_or(ApiError::MissingToken)?;
    let store = ctx.queue_store();
    let uc = ValidateActiveToken {
        store: store.as_ref(),
    };
    if uc.is_valid(&token).await.map_err(ServiceError::from)? {
        ok(true)
    } else {
        Err(ServiceError::QueueTokenInvalid("queue token is not active".into()).into())
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/queue/token", post(issue_token))
        .route("/queue/status", get(queue_status))
        .route("/queue/validate", post(validate_token))
        .with_state(ctx)
}
