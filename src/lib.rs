//! Account REST API Service
//!
//! A CRUD web service for customer account records backed by sea-orm.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod tracing;

use axum::{http::HeaderValue, routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::middleware_helpers::SecurityPolicy;
use crate::repositories::AccountRepository;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
}

impl AppState {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }
}

/// Builds the CORS layer; no configured origins means permissive.
pub fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        ::tracing::debug!("Using permissive CORS because no origins are configured");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Account and service routes without any middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::accounts::account_routes())
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .fallback(handlers::common::not_found)
}

/// The full application: routes plus CORS, security headers, HTTP tracing
/// and request ids (outermost).
pub fn app(state: AppState, cfg: &AppConfig) -> Router {
    let policy = SecurityPolicy::from_config(cfg);

    api_routes()
        .layer(cors_layer(cfg))
        .layer(axum::middleware::from_fn_with_state(
            policy,
            middleware_helpers::security_headers_middleware,
        ))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
