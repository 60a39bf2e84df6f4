use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Account REST API Service",
        description = r#"
# Account Service

CRUD endpoints for customer account records.

## Error Handling

Failed requests answer with a JSON body carrying the HTTP status:

```json
{
  "status": 404,
  "error": "Not Found",
  "message": "Not found: Account with id [42] could not be found.",
  "request_id": "2f1c2f64-3c2b-4a7e-9b8e-6d6f0b4c9e11",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

Every response carries `X-Frame-Options`, `X-XSS-Protection`,
`X-Content-Type-Options`, `Content-Security-Policy` and `Referrer-Policy`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "accounts", description = "Account management endpoints"),
        (name = "service", description = "Service metadata and health")
    ),
    paths(
        crate::handlers::health::index,
        crate::handlers::health::health,
        crate::handlers::accounts::create_account,
        crate::handlers::accounts::list_accounts,
        crate::handlers::accounts::get_account,
        crate::handlers::accounts::update_account,
        crate::handlers::accounts::delete_account,
    ),
    components(
        schemas(
            crate::entities::account::Model,
            crate::entities::account::AccountPayload,
            crate::handlers::health::ServiceInfo,
            crate::handlers::health::HealthStatus,
            crate::errors::ErrorResponse,
        )
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Account REST API Service"));
        assert!(json.contains("/accounts/{id}"));
        assert!(json.contains("\"Account\""));
        assert!(json.contains("ErrorResponse"));
    }
}
