#![allow(dead_code)]

use std::sync::Arc;

use account_service::{
    config::AppConfig, db, repositories::SeaOrmAccountRepository, AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use fake::{
    faker::{
        address::en::{BuildingNumber, CityName, StreetName},
        internet::en::SafeEmail,
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Fake,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness for the full application backed by a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] but lets the caller adjust the configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("accounts_test.db").display()
        );

        let mut cfg = AppConfig::new(url, "127.0.0.1", 18_080, "test");
        cfg.testing = true;
        cfg.db_max_connections = 2;
        adjust(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let repository = SeaOrmAccountRepository::new(Arc::new(pool));
        let router = account_service::app(AppState::new(Arc::new(repository)), &cfg);

        Self {
            router,
            config: cfg,
            _dir: dir,
        }
    }

    /// Send a request, JSON-encoding `body` when present.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    /// Send a raw body with explicit headers.
    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: impl Into<Body>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        self.send(builder.body(body.into()).expect("failed to build request"))
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates an account and returns its JSON representation.
    pub async fn create_account(&self, payload: Value) -> Value {
        let response = self.request(Method::POST, "/accounts", Some(payload)).await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        read_json(response).await
    }

    pub async fn account_count(&self) -> usize {
        let response = self.request(Method::GET, "/accounts", None).await;
        read_json(response)
            .await
            .as_array()
            .map(|a| a.len())
            .expect("account list should be an array")
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

pub async fn read_body(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}

fn clip(value: String, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Produces valid account payloads.
pub struct AccountFactory;

impl AccountFactory {
    pub fn payload() -> Value {
        let street: String = StreetName().fake();
        let number: String = BuildingNumber().fake();
        let city: String = CityName().fake();

        json!({
            "name": clip(Name().fake::<String>(), 64),
            "email": clip(SafeEmail().fake::<String>(), 64),
            "address": clip(format!("{} {}, {}", number, street, city), 256),
            "phone_number": clip(PhoneNumber().fake::<String>(), 32),
        })
    }

    pub fn jane() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "address": "1 Main St",
            "phone_number": "555-1234"
        })
    }
}
