//! Static bearer-token gate for the protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::errors::AppError;
use crate::handlers::AppState;

pub const MISSING_KEY_MESSAGE: &str = "API Key inválida ou ausente";
pub const INVALID_KEY_MESSAGE: &str = "API Key inválida";

/// Middleware requiring `Authorization: Bearer <API_KEY>`.
pub async fn require_bearer(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Err(e) = check_bearer(request.headers(), &state.config.api_key) {
        return e.into_response();
    }

    next.run(request).await
}

/// Validates the header against the configured key.
pub fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized(MISSING_KEY_MESSAGE.to_string()))?;

    if !constant_time_compare(token, expected) {
        return Err(AppError::Unauthorized(INVALID_KEY_MESSAGE.to_string()));
    }

    Ok(())
}

/// Compares SHA-256 digests with an xor-fold so the timing depends on neither
/// the content nor the length of the inputs.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_matching_token() {
        assert!(check_bearer(&headers("Bearer s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn rejects_missing_header() {
        let err = check_bearer(&HeaderMap::new(), "s3cret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == MISSING_KEY_MESSAGE));
    }

    #[test]
    fn rejects_wrong_scheme() {
        let err = check_bearer(&headers("Basic s3cret"), "s3cret").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == MISSING_KEY_MESSAGE));
    }

    #[test]
    fn rejects_wrong_token() {
        for candidate in ["Bearer s3cre", "Bearer s3cret ", "Bearer S3CRET", "Bearer "] {
            let err = check_bearer(&headers(candidate), "s3cret").unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(ref m) if m == INVALID_KEY_MESSAGE));
        }
    }

    #[test]
    fn compare_is_exact() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(!constant_time_compare("", "a"));
    }
}
