use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Headers stamped onto every response while the policy is enabled.
pub const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-frame-options", "SAMEORIGIN"),
    ("x-xss-protection", "1; mode=block"),
    ("x-content-type-options", "nosniff"),
    ("content-security-policy", "default-src 'self'; object-src 'none'"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Switches for the response post-processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityPolicy {
    pub enabled: bool,
    pub force_https: bool,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            force_https: false,
        }
    }
}

impl SecurityPolicy {
    pub fn from_config(config: &crate::config::AppConfig) -> Self {
        Self {
            enabled: config.security_headers_enabled,
            force_https: config.should_force_https(),
        }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        if !self.enabled {
            return;
        }
        for (name, value) in SECURITY_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
    }
}

/// First `x-forwarded-proto` entry, lowercased.
pub fn forwarded_scheme(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

/// Scheme the client used, honouring a terminating proxy's `x-forwarded-proto`.
pub fn effective_scheme(request: &Request) -> String {
    forwarded_scheme(request.headers())
        .or_else(|| request.uri().scheme_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| "http".to_string())
}

fn https_redirect(request: &Request) -> Option<Response> {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))?;
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = HeaderValue::from_str(&format!("https://{}{}", host, path)).ok()?;

    Some((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

pub async fn security_headers_middleware(
    State(policy): State<SecurityPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = if policy.force_https && effective_scheme(&request) != "https" {
        match https_redirect(&request) {
            Some(redirect) => {
                tracing::debug!(uri = %request.uri(), "redirecting plain HTTP request to HTTPS");
                redirect
            }
            None => next.run(request).await,
        }
    } else {
        next.run(request).await
    };

    policy.apply(response.headers_mut());
    response
}
