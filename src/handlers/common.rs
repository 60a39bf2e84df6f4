use crate::{errors::ServiceError, middleware_helpers::forwarded_scheme};
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, OriginalUri, Path, Request,
    },
    http::{header, request::Parts, HeaderMap, HeaderValue, Method, StatusCode},
    Json,
};
use serde_json::Value;

/// Raw JSON request body with rejections mapped onto [`ServiceError`].
///
/// A missing or non-JSON `Content-Type` is a 415, an oversized body a 413 and
/// malformed JSON a 400.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

fn map_json_rejection(rejection: JsonRejection) -> ServiceError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ServiceError::UnsupportedMediaType(
            "Content-Type must be application/json".to_string(),
        ),
        JsonRejection::JsonSyntaxError(e) => {
            ServiceError::ValidationError(format!("Malformed JSON body: {}", e.body_text()))
        }
        JsonRejection::JsonDataError(e) => ServiceError::ValidationError(e.body_text()),
        other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            ServiceError::PayloadTooLarge(other.body_text())
        }
        other => ServiceError::BadRequest(other.body_text()),
    }
}

/// Integer `{id}` path segment; anything else is a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for AccountId
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i32>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(AccountId(id)),
            Err(PathRejection::FailedToDeserializePathParams(e)) => Err(
                ServiceError::ValidationError(format!("Invalid account id: {}", e.body_text())),
            ),
            Err(other) => Err(ServiceError::InternalError(other.body_text())),
        }
    }
}

/// Absolute URL of an account when the request names its host, else the path.
pub fn account_location(headers: &HeaderMap, id: i32) -> String {
    let path = format!("/accounts/{}", id);

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    match host {
        Some(host) => {
            let scheme = forwarded_scheme(headers).unwrap_or_else(|| "http".to_string());
            format!("{}://{}{}", scheme, host, path)
        }
        None => path,
    }
}

pub fn location_header(headers: &HeaderMap, id: i32) -> Result<HeaderValue, ServiceError> {
    HeaderValue::from_str(&account_location(headers, id))
        .map_err(|e| ServiceError::InternalError(format!("Invalid Location header: {}", e)))
}

/// Answers methods a route does not support.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> ServiceError {
    ServiceError::MethodNotAllowed(format!("{} is not supported on {}", method, uri.path()))
}

/// Answers paths no route matches.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ServiceError {
    ServiceError::NotFound(format!("No resource at {}", uri.path()))
}
