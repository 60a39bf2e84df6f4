use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::{
    entities::account::AccountPayload,
    errors::ServiceError,
    handlers::common::{location_header, method_not_allowed, AccountId, JsonBody},
    AppState,
};

/// Creates the router for account endpoints
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            get(list_accounts)
                .post(create_account)
                .fallback(method_not_allowed),
        )
        .route(
            "/accounts/:id",
            get(get_account)
                .put(update_account)
                .delete(delete_account)
                .fallback(method_not_allowed),
        )
}

/// Create a new account
#[utoipa::path(
    post,
    path = "/accounts",
    summary = "Create account",
    request_body(content = AccountPayload, content_type = "application/json"),
    responses(
        (status = 201, description = "Account created", body = crate::entities::account::Model,
            headers(("Location" = String, description = "URL of the new account"))
        ),
        (status = 400, description = "Invalid account data", body = crate::errors::ErrorResponse),
        (status = 415, description = "Body is not application/json", body = crate::errors::ErrorResponse),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn create_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> Result<Response, ServiceError> {
    let payload = AccountPayload::from_json(&body)?;
    let account = state.accounts.create(payload).await?;

    tracing::info!(account_id = account.id, "account created");

    let location = location_header(&headers, account.id)?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(account.to_json()),
    )
        .into_response())
}

/// List all accounts
#[utoipa::path(
    get,
    path = "/accounts",
    summary = "List accounts",
    responses(
        (status = 200, description = "All accounts in id order", body = [crate::entities::account::Model]),
        (status = 500, description = "Persistence failure", body = crate::errors::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    let accounts = state.accounts.list().await?;
    Ok(Json(Value::Array(
        accounts.iter().map(|account| account.to_json()).collect(),
    )))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/accounts/{id}",
    summary = "Get account",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account found", body = crate::entities::account::Model),
        (status = 400, description = "Id is not an integer", body = crate::errors::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::errors::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    AccountId(id): AccountId,
) -> Result<Json<Value>, ServiceError> {
    let account = state.accounts.get(id).await?;
    Ok(Json(account.to_json()))
}

/// Replace an account's fields
#[utoipa::path(
    put,
    path = "/accounts/{id}",
    summary = "Update account",
    params(("id" = i32, Path, description = "Account id")),
    request_body(content = AccountPayload, content_type = "application/json"),
    responses(
        (status = 200, description = "Account updated", body = crate::entities::account::Model),
        (status = 400, description = "Invalid account data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Account not found", body = crate::errors::ErrorResponse),
        (status = 415, description = "Body is not application/json", body = crate::errors::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn update_account(
    State(state): State<AppState>,
    AccountId(id): AccountId,
    JsonBody(body): JsonBody,
) -> Result<Json<Value>, ServiceError> {
    let payload = AccountPayload::from_json(&body)?;
    let account = state.accounts.update(id, payload).await?;

    tracing::info!(account_id = id, "account updated");
    Ok(Json(account.to_json()))
}

/// Delete an account; repeated deletes of the same id also succeed
#[utoipa::path(
    delete,
    path = "/accounts/{id}",
    summary = "Delete account",
    params(("id" = i32, Path, description = "Account id")),
    responses(
        (status = 204, description = "Account deleted or already absent"),
        (status = 400, description = "Id is not an integer", body = crate::errors::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn delete_account(
    State(state): State<AppState>,
    AccountId(id): AccountId,
) -> Result<StatusCode, ServiceError> {
    match state.accounts.delete(id).await {
        Ok(()) => {
            tracing::info!(account_id = id, "account deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(ServiceError::NotFound(_)) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::account::Model as AccountModel;
    use crate::repositories::MockAccountRepository;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(repo: MockAccountRepository) -> Router {
        account_routes().with_state(AppState::new(Arc::new(repo)))
    }

    fn sample(id: i32) -> AccountModel {
        AccountModel {
            id,
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            address: "1 Main St".into(),
            phone_number: "555-1234".into(),
            date_joined: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const VALID: &str = r#"{"name":"Jane Doe","email":"jane@example.com","address":"1 Main St","phone_number":"555-1234"}"#;

    #[tokio::test]
    async fn create_returns_location_relative_without_host() {
        let mut repo = MockAccountRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|_| Ok(sample(12)));

        let response = app(repo)
            .oneshot(json_request("POST", "/accounts", VALID))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/12"
        );
    }

    #[tokio::test]
    async fn create_persistence_failure_is_500_with_generic_message() {
        let mut repo = MockAccountRepository::new();
        repo.expect_create()
            .returning(|_| Err(ServiceError::database_error_message("disk full")));

        let response = app(repo)
            .oneshot(json_request("POST", "/accounts", VALID))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Database error");
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_repository() {
        let mut repo = MockAccountRepository::new();
        repo.expect_create().times(0);
        repo.expect_update().times(0);

        let app = app(repo);
        let response = app
            .clone()
            .oneshot(json_request("POST", "/accounts", r#"{"name":"Only"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request("PUT", "/accounts/3", "[1,2,3]"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_of_missing_account_is_still_no_content() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete()
            .withf(|id| *id == 404)
            .returning(|id| Err(ServiceError::NotFound(format!("Account {}", id))));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/accounts/404")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn delete_persistence_failure_is_not_swallowed() {
        let mut repo = MockAccountRepository::new();
        repo.expect_delete()
            .returning(|_| Err(ServiceError::database_error_message("locked")));

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/accounts/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn non_integer_id_is_bad_request() {
        let mut repo = MockAccountRepository::new();
        repo.expect_get().times(0);

        let response = app(repo)
            .oneshot(
                Request::builder()
                    .uri("/accounts/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unsupported_method_is_405_json() {
        let response = app(MockAccountRepository::new())
            .oneshot(
                Request::builder()
                    .method("PATCH")
                    .uri("/accounts/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], 405);
    }
}
