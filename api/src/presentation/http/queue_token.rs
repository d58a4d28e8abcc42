use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::application::error::ServiceError;
use crate::application::use_cases::queue::validate_token::ValidateActiveToken;
use crate::bootstrap::app_context::AppContext;
use crate::domain::queue::token::QueueToken;
use crate::presentation::http::response::ApiError;

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// An active queue token taken from the `Authorization` header.
pub struct ActiveQueueToken(pub QueueToken);

impl ActiveQueueToken {
    /// The token must belong to the user the route acts on.
    pub fn ensure_user(&self, user_id: &str) -> Result<(), ApiError> {
        if self.0.user_id == user_id {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("queue token belongs to another user".into()).into())
        }
    }

    pub fn user_id(&self) -> &str {
        &self.0.user_id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for ActiveQueueToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::MissingToken)?;
        let store = ctx.queue_store();
        let uc = ValidateActiveToken {
            store: store.as_ref(),
        };
        match uc.execute(&token).await {
            Ok(Some(active)) => Ok(ActiveQueueToken(active)),
            Ok(None) => Err(ApiError::InactiveToken),
            Err(e) => Err(ServiceError::Internal(e).into()),
        }
    }
}
