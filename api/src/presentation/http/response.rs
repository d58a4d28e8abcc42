use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::error::ServiceError;

/// Envelope wrapped around every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    with_status(StatusCode::OK, data, None)
}

pub fn created<T: Serialize>(data: T, message: &str) -> ApiResult<T> {
    with_status(StatusCode::CREATED, data, Some(message))
}

fn with_status<T: Serialize>(status: StatusCode, data: T, message: Option<&str>) -> ApiResult<T> {
    Ok((
        status,
        Json(ApiResponse {
            code: status.as_u16(),
            data: Some(data),
            message: message.map(str::to_string),
            error: None,
            timestamp: Utc::now(),
        }),
    ))
}

#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// No usable `Authorization: Bearer` header.
    MissingToken,
    /// Token exists but is not active.
    InactiveToken,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        let err = match self {
            ApiError::MissingToken => {
                return (
                    StatusCode::UNAUTHORIZED,
                    "MISSING_TOKEN",
                    "queue token is required".into(),
                    None,
                );
            }
            ApiError::InactiveToken => {
                return (
                    StatusCode::FORBIDDEN,
                    "INVALID_TOKEN",
                    "queue token is not active".into(),
                    None,
                );
            }
            ApiError::Service(err) => err,
        };
        match err {
            ServiceError::NotFound(m) => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND", m.clone(), None),
            ServiceError::InvalidArgument(m) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", m.clone(), None)
            }
            ServiceError::Conflict(m) => (StatusCode::CONFLICT, "CONFLICT", m.clone(), None),
            ServiceError::Busy(m) => (StatusCode::CONFLICT, "RESOURCE_BUSY", m.clone(), None),
            ServiceError::Forbidden(m) => (StatusCode::FORBIDDEN, "FORBIDDEN", m.clone(), None),
            ServiceError::InsufficientBalance { current, required } => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_BALANCE",
                err.to_string(),
                Some(serde_json::json!({
                    "current": current,
                    "required": required,
                    "shortfall": (required - current).max(0),
                })),
            ),
            ServiceError::QueueTokenInvalid(m) => {
                (StatusCode::UNAUTHORIZED, "QUEUE_TOKEN_INVALID", m.clone(), None)
            }
            ServiceError::QueueAccessDenied(m) => (
                StatusCode::TOO_MANY_REQUESTS,
                "QUEUE_ACCESS_DENIED",
                m.clone(),
                None,
            ),
            ServiceError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
                None,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Service(ServiceError::Internal(e)) => {
                tracing::error!(error = ?e, "request_failed")
            }
            ApiError::Service(e) => tracing::debug!(error = %e, "request_rejected"),
            _ => tracing::debug!(error = ?self, "request_unauthorized"),
        }
        let (status, kind, message, details) = self.parts();
        let body: ApiResponse<()> = ApiResponse {
            code: status.as_u16(),
            data: None,
            message: None,
            error: Some(ErrorBody {
                kind: kind.to_string(),
                message,
                details,
            }),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: impl Into<ApiError>) -> (StatusCode, serde_json::Value) {
        let resp = err.into().into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn insufficient_balance_carries_shortfall() {
        let (status, json) = body_json(ServiceError::InsufficientBalance {
            current: 30_000,
            required: 50_000,
        })
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 400);
        assert_eq!(json["error"]["type"], "INSUFFICIENT_BALANCE");
        assert_eq!(json["error"]["details"]["shortfall"], 20_000);
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn internal_errors_hide_their_message() {
        let (status, json) =
            body_json(ServiceError::Internal(anyhow::anyhow!("db password leaked"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "internal server error");
    }

    #[tokio::test]
    async fn status_mapping() {
        let cases = [
            (ServiceError::NotFound("x".into()), 404, "RESOURCE_NOT_FOUND"),
            (ServiceError::Busy("x".into()), 409, "RESOURCE_BUSY"),
            (ServiceError::Conflict("x".into()), 409, "CONFLICT"),
            (ServiceError::QueueAccessDenied("x".into()), 429, "QUEUE_ACCESS_DENIED"),
            (ServiceError::QueueTokenInvalid("gone".into()), 401, "QUEUE_TOKEN_INVALID"),
        ];
        for (err, code, kind) in cases {
            let (status, json) = body_json(err).await;
            assert_eq!(status.as_u16(), code);
            assert_eq!(json["error"]["type"], kind);
        }
        let (status, json) = body_json(ApiError::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["type"], "MISSING_TOKEN");
        let (status, json) = body_json(ApiError::InactiveToken).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"]["type"], "INVALID_TOKEN");
    }
}
