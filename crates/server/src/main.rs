use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        HealthResponse, LastModifiedResponse, OrdersPayload, HEALTH_ROUTE, LAST_MODIFIED_ROUTE,
        ORDERS_ROUTE,
    },
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::{build_row_source, load_settings};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.upstream_timeout_seconds))
        .build()?;
    let source = build_row_source(&settings, http)?;

    let api = ApiContext::new(source, Duration::from_secs(settings.cache_ttl_seconds));
    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "orders proxy listening");
    for route in [HEALTH_ROUTE, ORDERS_ROUTE, LAST_MODIFIED_ROUTE] {
        info!(route, "GET");
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTH_ROUTE, get(health))
        .route(ORDERS_ROUTE, get(orders))
        .route(LAST_MODIFIED_ROUTE, get(last_modified))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        timestamp: Utc::now(),
    })
}

async fn orders(State(state): State<Arc<AppState>>) -> ApiResult<OrdersPayload> {
    api::load_orders(&state.api)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn last_modified(State(state): State<Arc<AppState>>) -> ApiResult<LastModifiedResponse> {
    api::last_modified(&state.api)
        .await
        .map(Json)
        .map_err(error_response)
}

fn error_response(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Upstream => StatusCode::BAD_GATEWAY,
    };
    (status, Json(error))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
