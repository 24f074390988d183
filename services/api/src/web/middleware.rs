//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;
use wandau_core::authenticate;

use crate::config::AUTH_COOKIE;
use crate::error::HttpError;
use crate::web::state::AppState;

/// Middleware that verifies the session cookie and resolves the caller.
///
/// If valid, inserts the `Identity` into request extensions for handlers to use.
/// If missing or invalid, returns 401 Unauthorized with the reason.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = read_cookie(req.headers(), AUTH_COOKIE);

    match authenticate(&state.tokens, token.as_deref()) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => {
            warn!(path = %req.uri().path(), reason = %e, "rejected unauthenticated request");
            HttpError(e).into_response()
        }
    }
}

/// Finds the value of cookie `name` across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|c| {
            let (key, value) = c.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; authToken=abc.def.ghi"));

        assert_eq!(read_cookie(&headers, "authToken").as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, "session"), None);
    }

    #[test]
    fn looks_through_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("authToken=t"));

        assert_eq!(read_cookie(&headers, "authToken").as_deref(), Some("t"));
    }
}
