use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::payments::cancel_payment::CancelUnpaidPayment;
use crate::application::use_cases::payments::get_payment::GetPayment;
use crate::application::use_cases::payments::process_payment::ProcessPayment;
use crate::application::use_cases::payments::refund_payment::RefundPayment;
use crate::application::use_cases::payments::retry_payment::RetryPayment;
use crate::bootstrap::app_context::AppContext;
use crate::domain::payments::payment::Payment;
use crate::presentation::http::extract::{AppJson, AppPath};
use crate::presentation::http::queue_token::ActiveQueueToken;
use crate::presentation::http::response::{ApiResult, ok};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub reservation_id: Uuid,
    pub user_id: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReasonRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: Uuid,
    pub reservation_id: Uuid,
    pub user_id: String,
    pub amount: i64,
    /// PENDING | COMPLETED | FAILED | CANCELLED | REFUNDED
    pub status: String,
    /// BALANCE | CARD
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        PaymentResponse {
            payment_id: p.id,
            reservation_id: p.reservation_id,
            user_id: p.user_id,
            amount: p.amount,
            status: p.status.as_str().to_string(),
            payment_method: p.method.as_str().to_string(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment completed", body = PaymentResponse),
        (status = 400, description = "Invalid reservation or insufficient balance"),
        (status = 409, description = "Payment already in progress")
    ),
    security(("queue_token" = []))
)]
pub async fn process_payment(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppJson(req): AppJson<PaymentRequest>,
) -> ApiResult<PaymentResponse> {
    token.ensure_user(&req.user_id)?;
    let reservations = ctx.reservation_repo();
    let seats = ctx.seat_repo();
    let concerts = ctx.concert_repo();
    let payments = ctx.payment_repo();
    let balances = ctx.balance_repo();
    let lock = ctx.lock();
    let events = ctx.event_publisher();
    let uc = ProcessPayment {
        reservations: reservations.as_ref(),
        seats: seats.as_ref(),
        concerts: concerts.as_ref(),
        payments: payments.as_ref(),
        balances: balances.as_ref(),
        lock: lock.as_ref(),
        events: events.as_ref(),
    };
    ok(uc.execute(req.reservation_id, &req.user_id).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    responses((status = 200, body = PaymentResponse), (status = 404, description = "Not found")),
    security(("queue_token" = []))
)]
pub async fn get_payment(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<PaymentResponse> {
    let payments = ctx.payment_repo();
    let uc = GetPayment {
        payments: payments.as_ref(),
    };
    let payment = uc.execute(id).await?;
    token.ensure_user(&payment.user_id)?;
    ok(payment.into())
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = ReasonRequest,
    responses((status = 200, body = PaymentResponse), (status = 400, description = "Payment not completed"))
)]
pub async fn refund_payment(
    State(ctx): State<AppContext>,
    AppPath(id): AppPath<Uuid>,
    body: Option<AppJson<ReasonRequest>>,
) -> ApiResult<PaymentResponse> {
    let req = body.map(|AppJson(b)| b).unwrap_or_default();
    let payments = ctx.payment_repo();
    let reservations = ctx.reservation_repo();
    let seats = ctx.seat_repo();
    let balances = ctx.balance_repo();
    let lock = ctx.lock();
    let events = ctx.event_publisher();
    let uc = RefundPayment {
        payments: payments.as_ref(),
        reservations: reservations.as_ref(),
        seats: seats.as_ref(),
        balances: balances.as_ref(),
        lock: lock.as_ref(),
        events: events.as_ref(),
    };
    ok(uc.execute(id, req.reason.as_deref()).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/cancel",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment ID")),
    request_body = ReasonRequest,
    responses((status = 200, body = PaymentResponse), (status = 400, description = "Payment not pending"))
)]
pub async fn cancel_payment(
    State(ctx): State<AppContext>,
    AppPath(id): AppPath<Uuid>,
    body: Option<AppJson<ReasonRequest>>,
) -> ApiResult<PaymentResponse> {
    let req = body.map(|AppJson(b)| b).unwrap_or_default();
    let payments = ctx.payment_repo();
    let reservations = ctx.reservation_repo();
    let seats = ctx.seat_repo();
    let events = ctx.event_publisher();
    let uc = CancelUnpaidPayment {
        payments: payments.as_ref(),
        reservations: reservations.as_ref(),
        seats: seats.as_ref(),
        events: events.as_ref(),
    };
    ok(uc.execute(id, req.reason.as_deref()).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/retry",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Failed payment ID")),
    responses((status = 200, description = "New payment attempt", body = PaymentResponse))
)]
pub async fn retry_payment(
    State(ctx): State<AppContext>,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<PaymentResponse> {
    let reservations = ctx.reservation_repo();
    let seats = ctx.seat_repo();
    let concerts = ctx.concert_repo();
    let payments = ctx.payment_repo();
    let balances = ctx.balance_repo();
    let lock = ctx.lock();
    let events = ctx.event_publisher();
    let uc = RetryPayment {
        process: ProcessPayment {
            reservations: reservations.as_ref(),
            seats: seats.as_ref(),
            concerts: concerts.as_ref(),
            payments: payments.as_ref(),
            balances: balances.as_ref(),
            lock: lock.as_ref(),
            events: events.as_ref(),
        },
    };
    ok(uc.execute(id).await?.into())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/payments", post(process_payment))
        .route("/payments/:id", get(get_payment))
        .route("/payments/:id/refund", post(refund_payment))
        .route("/payments/:id/cancel", post(cancel_payment))
        .route("/payments/:id/retry", post(retry_payment))
        .with_state(ctx)
}
