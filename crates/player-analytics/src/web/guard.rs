// Route guard for the dashboard area.
//
// A stub: it only checks that an `auth_token` cookie is present. The token is
// never validated.

use axum::extract::Request;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

pub const AUTH_COOKIE: &str = "auth_token";
pub const LOGIN_PATH: &str = "/login";

/// Whether `path` is under `/dashboard`.
pub fn is_protected(path: &str) -> bool {
    path == "/dashboard" || path.starts_with("/dashboard/")
}

/// True when a non-empty `auth_token` cookie is present.
pub fn has_auth_token(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name.trim() == AUTH_COOKIE && !value.trim().is_empty())
}

/// Middleware: redirect protected requests without a token to the login page.
pub async fn require_auth_token(request: Request, next: Next) -> Response {
    if is_protected(request.uri().path()) && !has_auth_token(request.headers()) {
        debug!("no {} cookie for {}, redirecting", AUTH_COOKIE, request.uri().path());
        return Redirect::temporary(LOGIN_PATH).into_response();
    }
    next.run(request).await
}
