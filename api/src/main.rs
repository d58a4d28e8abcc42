use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tokio::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use concert_api::application::ports::data_platform::DataPlatformClient;
use concert_api::application::ports::event_bus::{EventPublisher, EventSubscriber};
use concert_api::application::services::events::EventHandler;
use concert_api::application::services::events::data_platform::DataPlatformEventHandler;
use concert_api::application::services::events::notification::NotificationEventHandler;
use concert_api::application::services::events::ranking::RankingEventHandler;
use concert_api::bootstrap::app_context::{AppContext, AppServices};
use concert_api::bootstrap::background::{self, TaskHandle};
use concert_api::bootstrap::config::Config;
use concert_api::infrastructure::db::repositories::{
    balance_repository_sqlx::SqlxBalanceRepository,
    concert_repository_sqlx::SqlxConcertRepository,
    failed_transfer_repository_sqlx::SqlxFailedTransferRepository,
    payment_repository_sqlx::SqlxPaymentRepository,
    reservation_repository_sqlx::SqlxReservationRepository,
    seat_repository_sqlx::SqlxSeatRepository,
};
use concert_api::infrastructure::events::broadcast_bus::BroadcastEventBus;
use concert_api::infrastructure::events::log_notifier::LogNotifier;
use concert_api::infrastructure::http::data_platform_reqwest::ReqwestDataPlatformClient;
use concert_api::infrastructure::redis::event_bus::RedisStreamEventBus;
use concert_api::infrastructure::redis::lock::RedisLock;
use concert_api::infrastructure::redis::queue_store::RedisQueueStore;
use concert_api::infrastructure::redis::ranking_store::RedisRankingStore;
use concert_api::presentation::http::health::HealthState;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

const BROADCAST_CAPACITY: usize = 1024;
const STREAM_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DATA_PLATFORM_TIMEOUT: Duration = Duration::from_secs(5);

struct QueueTokenScheme;

impl Modify for QueueTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "queue_token",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
        paths(
            concert_api::presentation::http::health::health,
            concert_api::presentation::http::queue::issue_token,
            concert_api::presentation::http::queue::queue_status,
            concert_api::presentation::http::queue::validate_token,
            concert_api::presentation::http::concerts::create_concert,
            concert_api::presentation::http::concerts::list_available,
            concert_api::presentation::http::concerts::get_concert,
            concert_api::presentation::http::concerts::list_by_date,
            concert_api::presentation::http::concerts::search_by_artist,
            concert_api::presentation::http::concerts::get_seats,
            concert_api::presentation::http::reservations::reserve_seat,
            concert_api::presentation::http::reservations::get_reservation,
            concert_api::presentation::http::reservations::cancel_reservation,
            concert_api::presentation::http::balance::charge_balance,
            concert_api::presentation::http::balance::get_balance,
            concert_api::presentation::http::balance::list_transactions,
            concert_api::presentation::http::payments::process_payment,
            concert_api::presentation::http::payments::get_payment,
            concert_api::presentation::http::payments::refund_payment,
            concert_api::presentation::http::payments::cancel_payment,
            concert_api::presentation::http::payments::retry_payment,
            concert_api::presentation::http::rankings::top_rankings,
            concert_api::presentation::http::rankings::booking_speed,
        ),
        components(schemas(
            concert_api::presentation::http::health::HealthResp,
            concert_api::presentation::http::response::ErrorBody,
            concert_api::presentation::http::queue::IssueTokenRequest,
            concert_api::presentation::http::queue::QueueTokenResponse,
            concert_api::presentation::http::concerts::CreateConcertRequest,
            concert_api::presentation::http::concerts::ConcertResponse,
            concert_api::presentation::http::concerts::ConcertPageResponse,
            concert_api::presentation::http::concerts::SeatResponse,
            concert_api::presentation::http::concerts::ConcertSeatsResponse,
            concert_api::presentation::http::reservations::ReserveSeatRequest,
            concert_api::presentation::http::reservations::ReservationResponse,
            concert_api::presentation::http::balance::ChargeRequest,
            concert_api::presentation::http::balance::BalanceResponse,
            concert_api::presentation::http::balance::TransactionResponse,
            concert_api::presentation::http::payments::PaymentRequest,
            concert_api::presentation::http::payments::ReasonRequest,
            concert_api::presentation::http::payments::PaymentResponse,
            concert_api::presentation::http::rankings::RankingResponse,
            concert_api::presentation::http::rankings::BookingSpeedResponse,
        )),
        modifiers(&QueueTokenScheme),
        tags(
            (name = "Health", description = "System health checks"),
            (name = "Queue", description = "Waiting room tokens"),
            (name = "Concerts", description = "Concerts and seats"),
            (name = "Reservations", description = "Temporary seat holds"),
            (name = "Balance", description = "Prepaid balance"),
            (name = "Payments", description = "Payments, refunds and retries"),
            (name = "Rankings", description = "Concert popularity rankings")
        )
    )]
struct ApiDoc;

fn build_cors(cfg: &Config) -> CorsLayer {
    let methods = [
        http::Method::GET,
        http::Method::POST,
        http::Method::PUT,
        http::Method::DELETE,
        http::Method::PATCH,
        http::Method::OPTIONS,
    ];
    let headers = [
        http::header::CONTENT_TYPE,
        http::header::AUTHORIZATION,
        http::HeaderName::from_static("x-session-id"),
        http::HeaderName::from_static("x-device-fingerprint"),
    ];
    let origin = match cfg.frontend_url.as_deref().map(HeaderValue::from_str) {
        Some(Ok(v)) => AllowOrigin::exact(v),
        _ if cfg.is_production => AllowOrigin::exact(HeaderValue::from_static("http://invalid")),
        _ => AllowOrigin::mirror_request(),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

async fn await_task(name: &'static str, handle: TaskHandle) {
    match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, task = name, "background task failed"),
        Err(e) => error!(?e, task = name, "background task panicked"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "concert_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting concert reservation backend");

    // Database
    let pool =
        concert_api::infrastructure::db::connect_pool(&cfg.database_url, cfg.database_max_connections)
            .await?;
    concert_api::infrastructure::db::migrate(&pool).await?;

    // Redis
    let (redis_client, redis_conn) = concert_api::infrastructure::redis::connect(&cfg.redis_url).await?;

    let (event_publisher, event_subscriber): (Arc<dyn EventPublisher>, Arc<dyn EventSubscriber>) =
        if cfg.cluster_mode {
            tracing::info!(prefix = %cfg.event_stream_prefix, "cluster_mode_enabled_using_redis_streams");
            let bus = Arc::new(RedisStreamEventBus::new(
                redis_client,
                redis_conn.clone(),
                cfg.event_stream_prefix.clone(),
                Some(cfg.event_stream_max_len),
                STREAM_POLL_INTERVAL,
            ));
            let publisher: Arc<dyn EventPublisher> = bus.clone();
            let subscriber: Arc<dyn EventSubscriber> = bus;
            (publisher, subscriber)
        } else {
            tracing::info!("cluster_mode_disabled_using_local_bus");
            let bus = Arc::new(BroadcastEventBus::new(BROADCAST_CAPACITY));
            let publisher: Arc<dyn EventPublisher> = bus.clone();
            let subscriber: Arc<dyn EventSubscriber> = bus;
            (publisher, subscriber)
        };

    let data_platform: Option<Arc<dyn DataPlatformClient>> = match cfg.data_platform_url.as_deref() {
        Some(url) => Some(Arc::new(ReqwestDataPlatformClient::new(
            url,
            DATA_PLATFORM_TIMEOUT,
        )?)),
        None => {
            tracing::info!("data_platform_disabled");
            None
        }
    };

    let failed_transfer_repo = Arc::new(SqlxFailedTransferRepository::new(pool.clone()));
    let ranking_store = Arc::new(RedisRankingStore::new(redis_conn.clone()));
    let notifier = Arc::new(LogNotifier);

    let services = AppServices::new(
        Arc::new(SqlxConcertRepository::new(pool.clone())),
        Arc::new(SqlxSeatRepository::new(pool.clone())),
        Arc::new(SqlxReservationRepository::new(pool.clone())),
        Arc::new(SqlxPaymentRepository::new(pool.clone())),
        Arc::new(SqlxBalanceRepository::new(pool.clone())),
        failed_transfer_repo.clone(),
        Arc::new(RedisQueueStore::new(redis_conn.clone())),
        Arc::new(RedisLock::new(redis_conn.clone())),
        ranking_store.clone(),
        event_publisher,
        event_subscriber.clone(),
        notifier.clone(),
        data_platform.clone(),
    );

    let ctx = AppContext::new(cfg.clone(), services);

    // Build API router
    let api_router = Router::new()
        .nest(
            "/api",
            concert_api::presentation::http::health::routes(HealthState {
                pool: pool.clone(),
                redis: redis_conn.clone(),
            }),
        )
        .nest("/api", concert_api::presentation::http::queue::routes(ctx.clone()))
        .nest("/api", concert_api::presentation::http::concerts::routes(ctx.clone()))
        .nest(
            "/api",
            concert_api::presentation::http::reservations::routes(ctx.clone()),
        )
        .nest("/api", concert_api::presentation::http::balance::routes(ctx.clone()))
        .nest("/api", concert_api::presentation::http::payments::routes(ctx.clone()))
        .nest("/api", concert_api::presentation::http::rankings::routes(ctx.clone()))
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(build_cors(&cfg))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: TaskHandle = tokio::spawn(async move {
        axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    });

    // Event consumers
    let mut handlers: Vec<Arc<dyn EventHandler>> = vec![
        Arc::new(RankingEventHandler {
            store: ranking_store,
        }),
        Arc::new(NotificationEventHandler { notifier }),
    ];
    if let Some(client) = data_platform {
        handlers.push(Arc::new(DataPlatformEventHandler {
            client,
            failures: failed_transfer_repo,
        }));
    }
    let consumer_handles = background::spawn_event_consumers(event_subscriber, handlers);

    // Schedulers
    let activation_handle = background::spawn_queue_activation(ctx.clone());
    let expiry_handle = background::spawn_reservation_expiry(ctx.clone());
    let retry_handle = background::spawn_transfer_retry(ctx.clone());

    await_task("api", api_handle).await;

    activation_handle.abort();
    expiry_handle.abort();
    if let Some(handle) = retry_handle {
        handle.abort();
    }
    for handle in consumer_handles {
        handle.abort();
    }
    Ok(())
}
