use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::use_cases::reservations::cancel_reservation::CancelReservation;
use crate::application::use_cases::reservations::get_reservation::GetReservation;
use crate::application::use_cases::reservations::reserve_seat::ReserveSeat;
use crate::bootstrap::app_context::AppContext;
use crate::domain::reservations::reservation::Reservation;
use crate::presentation::http::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::http::queue_token::ActiveQueueToken;
use crate::presentation::http::response::{ApiResult, created, ok};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSeatRequest {
    pub user_id: String,
    pub concert_id: i64,
    pub seat_number: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: Uuid,
    pub user_id: String,
    pub concert_id: i64,
    pub seat_id: i64,
    pub seat_number: i32,
    pub price: i64,
    /// TEMPORARILY_ASSIGNED | CONFIRMED | CANCELLED | EXPIRED
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub remaining_seconds: i64,
}

impl From<Reservation> for ReservationResponse {
    fn from(r: Reservation) -> Self {
        ReservationResponse {
            remaining_seconds: r.remaining_seconds(Utc::now()),
            status: r.status.as_str().to_string(),
            reservation_id: r.id,
            user_id: r.user_id,
            concert_id: r.concert_id,
            seat_id: r.seat_id,
            seat_number: r.seat_number,
            price: r.price,
            created_at: r.created_at,
            expires_at: r.expires_at,
            confirmed_at: r.confirmed_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CancelQuery {
    pub user_id: String,
}

#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Reservations",
    request_body = ReserveSeatRequest,
    responses(
        (status = 201, description = "Seat held", body = ReservationResponse),
        (status = 409, description = "Seat taken or being reserved")
    ),
    security(("queue_token" = []))
)]
pub async fn reserve_seat(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppJson(req): AppJson<ReserveSeatRequest>,
) -> ApiResult<ReservationResponse> {
    token.ensure_user(&req.user_id)?;
    let concerts = ctx.concert_repo();
    let seats = ctx.seat_repo();
    let reservations = ctx.reservation_repo();
    let lock = ctx.lock();
    let events = ctx.event_publisher();
    let uc = ReserveSeat {
        concerts: concerts.as_ref(),
        seats: seats.as_ref(),
        reservations: reservations.as_ref(),
        lock: lock.as_ref(),
        events: events.as_ref(),
        hold_for: ctx.cfg.reservation_hold(),
    };
    let reservation = uc
        .execute(&req.user_id, req.concert_id, req.seat_number)
        .await?;
    created(reservation.into(), "seat temporarily reserved")
}

#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses((status = 200, body = ReservationResponse), (status = 404, description = "Not found")),
    security(("queue_token" = []))
)]
pub async fn get_reservation(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppPath(id): AppPath<Uuid>,
) -> ApiResult<ReservationResponse> {
    let repo = ctx.reservation_repo();
    let uc = GetReservation {
        reservations: repo.as_ref(),
    };
    let reservation = uc.execute(id).await?;
    token.ensure_user(&reservation.user_id)?;
    ok(reservation.into())
}

#[utoipa::path(
    delete,
    path = "/api/reservations/{id}",
    tag = "Reservations",
    params(("id" = Uuid, Path, description = "Reservation ID"), CancelQuery),
    responses((status = 200, body = ReservationResponse), (status = 403, description = "Not the owner")),
    security(("queue_token" = []))
)]
pub async fn cancel_reservation(
    State(ctx): State<AppContext>,
    token: ActiveQueueToken,
    AppPath(id): AppPath<Uuid>,
    AppQuery(q): AppQuery<CancelQuery>,
) -> ApiResult<ReservationResponse> {
    token.ensure_user(&q.user_id)?;
    let reservations = ctx.reservation_repo();
    let seats = ctx.seat_repo();
    let events = ctx.event_publisher();
    let uc = CancelReservation {
        reservations: reservations.as_ref(),
        seats: seats.as_ref(),
        events: events.as_ref(),
    };
    ok(uc.execute(id, &q.user_id).await?.into())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/reservations", post(reserve_seat))
        .route(
            "/reservations/:id",
            get(get_reservation).delete(cancel_reservation),
        )
        .with_state(ctx)
}
