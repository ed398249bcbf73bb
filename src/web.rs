//! Read-only HTTP API over the latest price snapshot

use crate::coordinator::PriceSnapshot;
use crate::sensor::{Sensor, SensorState};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub snapshot_rx: watch::Receiver<Arc<PriceSnapshot>>,
    pub sensors: Arc<Vec<Sensor>>,
}

impl AppState {
    pub fn new(snapshot_rx: watch::Receiver<Arc<PriceSnapshot>>, sensors: Vec<Sensor>) -> Self {
        Self {
            snapshot_rx,
            sensors: Arc::new(sensors),
        }
    }

    fn snapshot(&self) -> Arc<PriceSnapshot> {
        self.snapshot_rx.borrow().clone()
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Full snapshot: price table, current price and derived tariffs
pub async fn prices(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.snapshot().as_ref().clone())
}

pub async fn sensors(State(state): State<AppState>) -> impl IntoResponse {
    let snap = state.snapshot();
    let readings: Vec<SensorState> = state.sensors.iter().map(|s| s.read(&snap)).collect();
    Json(readings)
}

pub async fn sensor(State(state): State<AppState>, Path(key): Path<String>) -> Response {
    match state.sensors.iter().find(|s| s.key == key) {
        Some(sensor) => Json(sensor.read(&state.snapshot())).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("unknown sensor '{}'", key)})),
        )
            .into_response(),
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/prices", get(prices))
        .route("/api/sensors", get(sensors))
        .route("/api/sensors/{key}", get(sensor))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let router = build_router(state);
    let logger = crate::logging::get_logger("web");

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router).await?;
    Ok(())
}
