use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::core::store::WordStore;
use crate::db::operations::PgWordStore;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/live", get(live))
        .route("/info", get(info))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthInfoResponse {
    service: &'static str,
    version: &'static str,
    uptime: u64,
    catalogue_size: Option<usize>,
    sessions: Option<usize>,
}

async fn root(State(state): State<AppState>) -> Response {
    let connected = match state.db_proxy() {
        Some(proxy) => proxy.ping().await.is_ok(),
        None => false,
    };

    let response = HealthResponse {
        status: if connected { "ok" } else { "degraded" },
        database: if connected { "connected" } else { "disconnected" },
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let status_code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live() -> Response {
    StatusCode::OK.into_response()
}

async fn info(State(state): State<AppState>) -> Response {
    let catalogue_size = match state.db_proxy() {
        Some(proxy) => {
            let words = PgWordStore::new(proxy);
            words.count().await.ok()
        }
        None => None,
    };

    let response = HealthInfoResponse {
        service: "cardbot-backend",
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.uptime_seconds(),
        catalogue_size,
        sessions: state.controller().map(|controller| controller.session_count()),
    };

    Json(response).into_response()
}
