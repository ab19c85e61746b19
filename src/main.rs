use axum::{
    Json, Router,
    http::{Request, Response, StatusCode, Uri},
    routing::get,
};
use tokio_util::sync::CancellationToken;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use jmd_backoffice_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    response::{ApiResponse, Meta},
    routes::{create_api_router, doc::scalar_docs, health},
    services::pending_order_service::expire_stale,
    state::AppState,
};

const EXPIRY_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);
const MAX_BODY_BYTES: usize = 1024 * 1024;
const MAX_IN_FLIGHT: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = SocketAddr::from((config.host.parse::<IpAddr>()?, config.port));
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let (state, notification_worker) = AppState::build(orm, config).await?;
    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(expiry_sweep(state.clone(), shutdown.clone()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "back office listening");
    axum::serve(listener, http_app(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop intake, then let the worker drain what is already queued.
    shutdown.cancel();
    state.notifications.shutdown();
    if let Err(err) = sweeper.await {
        tracing::warn!(error = %err, "expiry sweep task failed");
    }
    if let Err(err) = notification_worker.await {
        tracing::warn!(error = %err, "notification worker failed");
    }

    tracing::info!("shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,jmd_backoffice_api=debug,sqlx=warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn http_app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .and_then(|id| id.header_value().to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id,
            )
        })
        .on_response(|response: &Response<_>, latency: Duration, _: &tracing::Span| {
            tracing::info!(
                status = response.status().as_u16(),
                ms = latency.as_millis() as u64,
                "served"
            );
        });

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(scalar_docs())
        .fallback(not_found)
        .layer(trace)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors_layer(&state.config))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .with_state(state)
}

async fn expiry_sweep(state: AppState, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(EXPIRY_SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = expire_stale(&state.orm).await {
                    tracing::warn!(error = %err, "pending order expiry sweep failed");
                }
            }
        }
    }
}

/// Cross-origin requests are only accepted in development.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let body = ApiResponse::success(
        "Not Found",
        serde_json::json!({ "path": uri.path() }),
        Some(Meta::empty()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
