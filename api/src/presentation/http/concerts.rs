use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::dto::concerts::{ConcertOverviewDto, ConcertSeatsDto};
use crate::application::error::ServiceError;
use crate::application::use_cases::concerts::create_concert::CreateConcert;
use crate::application::use_cases::concerts::get_concert::GetConcert;
use crate::application::use_cases::concerts::get_concert_seats::GetConcertSeats;
use crate::application::use_cases::concerts::list_available::ListAvailableConcerts;
use crate::application::use_cases::concerts::list_by_date::ListConcertsByDate;
use crate::application::use_cases::concerts::search_by_artist::SearchConcertsByArtist;
use crate::bootstrap::app_context::AppContext;
use crate::domain::concerts::concert::{Concert, NewConcert};
use crate::domain::concerts::seat::Seat;
use crate::presentation::http::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::http::queue_token::ActiveQueueToken;
use crate::presentation::http::response::{ApiResult, created, ok};

const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConcertRequest {
    pub title: String,
    pub artist: String,
    pub venue: String,
    pub concert_date: NaiveDate,
    #[schema(value_type = String, example = "19:30:00")]
    pub concert_time: NaiveTime,
    pub total_seats: i32,
    pub seat_price: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConcertResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub venue: String,
    pub concert_date: NaiveDate,
    #[schema(value_type = String, example = "19:30:00")]
    pub concert_time: NaiveTime,
    pub total_seats: i32,
    pub available_seats: i64,
    pub reserved_seats: i64,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sold_out: bool,
    pub booking_opened_at: Option<DateTime<Utc>>,
    pub sold_out_at: Option<DateTime<Utc>>,
}

impl ConcertResponse {
    fn bare(c: Concert) -> Self {
        ConcertResponse {
            id: c.id,
            available_seats: i64::from(c.total_seats),
            reserved_seats: 0,
            min_price: None,
            max_price: None,
            sold_out: c.is_sold_out(),
            title: c.title,
            artist: c.artist,
            venue: c.venue,
            concert_date: c.concert_date,
            concert_time: c.concert_time,
            total_seats: c.total_seats,
            booking_opened_at: c.booking_opened_at,
            sold_out_at: c.sold_out_at,
        }
    }
}

impl From<ConcertOverviewDto> for ConcertResponse {
    fn from(dto: ConcertOverviewDto) -> Self {
        let stats = dto.stats;
        let mut resp = ConcertResponse::bare(dto.concert);
        resp.available_seats = stats.available;
        resp.reserved_seats = stats.reserved;
        resp.min_price = stats.min_price;
        resp.max_price = stats.max_price;
        resp.sold_out = resp.sold_out || stats.is_sold_out();
        resp
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConcertPageResponse {
    pub content: Vec<ConcertResponse>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatResponse {
    pub id: i64,
    pub seat_number: i32,
    pub price: i64,
    /// AVAILABLE | TEMPORARILY_ASSIGNED | RESERVED
    pub status: String,
    pub assigned_until: Option<DateTime<Utc>>,
}

impl From<Seat> for SeatResponse {
    fn from(s: Seat) -> Self {
        SeatResponse {
            id: s.id,
            seat_number: s.seat_number,
            price: s.price,
            status: s.status.as_str().to_string(),
            assigned_until: s.assigned_until,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConcertSeatsResponse {
    pub concert_id: i64,
    pub title: String,
    pub total_seats: i64,
    pub available_seats: i64,
    pub seats: Vec<SeatResponse>,
}

impl From<ConcertSeatsDto> for ConcertSeatsResponse {
    fn from(dto: ConcertSeatsDto) -> Self {
        ConcertSeatsResponse {
            concert_id: dto.concert.id,
            title: dto.concert.title,
            total_seats: dto.stats.total,
            available_seats: dto.stats.available,
            seats: dto.seats.into_iter().map(SeatResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DateQuery {
    /// YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ArtistQuery {
    pub artist: String,
}

#[utoipa::path(
    post,
    path = "/api/concerts",
    tag = "Concerts",
    request_body = CreateConcertRequest,
    responses((status = 201, description = "Concert created with its seats", body = ConcertResponse))
)]
pub async fn create_concert(
    State(ctx): State<AppContext>,
    AppJson(req): AppJson<CreateConcertRequest>,
) -> ApiResult<ConcertResponse> {
    let repo = ctx.concert_repo();
    let uc = CreateConcert {
        concerts: repo.as_ref(),
    };
    let concert = uc
        .execute(&NewConcert {
            title: req.title,
            artist: req.artist,
            venue: req.venue,
            concert_date: req.concert_date,
            concert_time: req.concert_time,
            total_seats: req.total_seats,
            seat_price: req.seat_price,
        })
        .await?;
    let mut resp = ConcertResponse::bare(concert);
    resp.min_price = Some(req.seat_price);
    resp.max_price = Some(req.seat_price);
    created(resp, "concert created")
}

#[utoipa::path(
    get,
    path = "/api/concerts/available-dates",
    tag = "Concerts",
    params(PageQuery),
    responses((status = 200, body = ConcertPageResponse))
)]
pub async fn list_available(
    State(ctx): State<AppContext>,
    AppQuery(q): AppQuery<PageQuery>,
) -> ApiResult<ConcertPageResponse> {
    let concerts = ctx.concert_repo();
    let seats = ctx.seat_repo();
    let uc = ListAvailableConcerts {
        concerts: concerts.as_ref(),
        seats: seats.as_ref(),
    };
    let page = uc
        .execute(q.page.unwrap_or(0), q.size.unwrap_or(DEFAULT_PAGE_SIZE))
        .await?;
    ok(ConcertPageResponse {
        content: page.items.into_iter().map(ConcertResponse::from).collect(),
        page: page.page,
        size: page.size,
        total_elements: page.total_elements,
        total_pages: page.total_pages,
    })
}

#[utoipa::path(
    get,
    path = "/api/concerts/{id}",
    tag = "Concerts",
    params(("id" = i64, Path, description = "Concert ID")),
    responses((status = 200, body = ConcertResponse), (status = 404, description = "Not found"))
)]
pub async fn get_concert(
    State(ctx): State<AppContext>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ConcertResponse> {
    let concerts = ctx.concert_repo();
    let seats = ctx.seat_repo();
    let uc = GetConcert {
        concerts: concerts.as_ref(),
        seats: seats.as_ref(),
    };
    ok(uc.execute(id).await?.into())
}

#[utoipa::path(
    get,
    path = "/api/concerts/by-date",
    tag = "Concerts",
    params(DateQuery),
    responses((status = 200, body = [ConcertResponse]))
)]
pub async fn list_by_date(
    State(ctx): State<AppContext>,
    AppQuery(q): AppQuery<DateQuery>,
) -> ApiResult<Vec<ConcertResponse>> {
    let date = NaiveDate::parse_from_str(q.date.trim(), "%Y-%m-%d").map_err(|_| {
        ServiceError::InvalidArgument(format!("date must be YYYY-MM-DD: {}", q.date))
    })?;
    let concerts = ctx.concert_repo();
    let seats = ctx.seat_repo();
    let uc = ListConcertsByDate {
        concerts: concerts.as_ref(),
        seats: seats.as_ref(),
    };
    let rows = uc.execute(date).await?;
    ok(rows.into_iter().map(ConcertResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/concerts/search",
    tag = "Concerts",
    params(ArtistQuery),
    responses((status = 200, body = [ConcertResponse]))
)]
pub async fn search_by_artist(
    State(ctx): State<AppContext>,
    AppQuery(q): AppQuery<ArtistQuery>,
) -> ApiResult<Vec<ConcertResponse>> {
    let concerts = ctx.concert_repo();
    let seats = ctx.seat_repo();
    let uc = SearchConcertsByArtist {
        concerts: concerts.as_ref(),
        seats: seats.as_ref(),
    };
    let rows = uc.execute(&q.artist).await?;
    ok(rows.into_iter().map(ConcertResponse::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/concerts/{id}/seats",
    tag = "Concerts",
    params(("id" = i64, Path, description = "Concert ID")),
    responses(
        (status = 200, body = ConcertSeatsResponse),
        (status = 401, description = "Missing queue token"),
        (status = 403, description = "Queue token not active")
    ),
    security(("queue_token" = []))
)]
pub async fn get_seats(
    State(ctx): State<AppContext>,
    _token: ActiveQueueToken,
    AppPath(id): AppPath<i64>,
) -> ApiResult<ConcertSeatsResponse> {
    let concerts = ctx.concert_repo();
    let seats = ctx.seat_repo();
    let uc = GetConcertSeats {
        concerts: concerts.as_ref(),
        seats: seats.as_ref(),
    };
    ok(uc.execute(id).await?.into())
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/concerts", post(create_concert))
        .route("/concerts/available-dates", get(list_available))
        .route("/concerts/by-date", get(list_by_date))
        .route("/concerts/search", get(search_by_artist))
        .route("/concerts/:id", get(get_concert))
        .route("/concerts/:id/seats", get(get_seats))
        .with_state(ctx)
}
