use axum::{response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;

/// Service metadata returned from the root path
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub paths: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

/// Service name, version and the resource collection path
#[utoipa::path(
    get,
    path = "/",
    summary = "Service metadata",
    responses((status = 200, description = "Service metadata", body = ServiceInfo)),
    tag = "service"
)]
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "Account REST API Service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        paths: "/accounts".to_string(),
    })
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    summary = "Health check",
    responses((status = 200, description = "Service is up", body = HealthStatus)),
    tag = "service"
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK".to_string(),
    })
}
