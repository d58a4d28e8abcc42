use axum::{
    Router,
    extract::State,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::use_cases::rankings::get_booking_speed::GetBookingSpeed;
use crate::application::use_cases::rankings::get_top_rankings::GetTopRankings;
use crate::bootstrap::app_context::AppContext;
use crate::domain::ranking::ranking::{RankingEntry, RankingType};
use crate::presentation::http::extract::{AppPath, AppQuery};
use crate::presentation::http::response::{ApiResult, ok};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RankingQuery {
    /// SOLDOUT_SPEED | BOOKING_SPEED | POPULARITY (default)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub rank: usize,
    pub concert_id: i64,
    pub score: f64,
    pub ranking_type: String,
}

impl From<RankingEntry> for RankingResponse {
    fn from(e: RankingEntry) -> Self {
        RankingResponse {
            rank: e.rank,
            concert_id: e.concert_id,
            score: e.score,
            ranking_type: e.ranking_type.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingSpeedResponse {
    pub concert_id: i64,
    /// Bookings per minute over the last five minutes.
    pub bookings_per_minute: f64,
}

#[utoipa::path(
    get,
    path = "/api/rankings",
    tag = "Rankings",
    params(RankingQuery),
    responses((status = 200, body = [RankingResponse]), (status = 400, description = "Unknown ranking type"))
)]
pub async fn top_rankings(
    State(ctx): State<AppContext>,
    AppQuery(q): AppQuery<RankingQuery>,
) -> ApiResult<Vec<RankingResponse>> {
    let kind = match q.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        Some(raw) => raw
            .parse::<RankingType>()
            .map_err(crate::application::error::ServiceError::from)?,
        None => RankingType::default(),
    };
    let store = ctx.ranking_store();
    let uc = GetTopRankings {
        store: store.as_ref(),
    };
    let rows = uc.execute(kind, q.limit).await?;
    ok(rows.into_iter().map(RankingResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/rankings/concerts/{id}/booking-speed",
    tag = "Rankings",
    params(("id" = i64, Path, description = "Concert ID")),
    responses((status = 200, body = BookingSpeedResponse))
)]
pub async fn booking_speed(
    State(ctx): State<AppContext>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<BookingSpeedResponse> {
    let store = ctx.ranking_store();
    let uc = GetBookingSpeed {
        store: store.as_ref(),
    };
    let speed = uc.execute(id).await?;
    ok(BookingSpeedResponse {
        concert_id: id,
        bookings_per_minute: speed,
    })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/rankings", get(top_rankings))
        .route("/rankings/concerts/:id/booking-speed", get(booking_speed))
        .with_state(ctx)
}
