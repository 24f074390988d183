//! services/api/src/web/auth.rs
//!
//! Endpoints that mint and clear the session cookie.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info};
use wandau_core::{CatalogError, PortError, SessionClaims};

use crate::config::{Config, DeploymentMode, AUTH_COOKIE};
use crate::error::{HttpError, HttpResult};
use crate::web::protocol::{StatusResponse, TokenRequest};
use crate::web::state::AppState;

//=========================================================================================
// Cookie Helpers
//=========================================================================================

fn cookie_attributes(config: &Config) -> &'static str {
    match config.mode {
        DeploymentMode::Production => "HttpOnly; Secure; SameSite=None; Path=/",
        DeploymentMode::Development => "HttpOnly; SameSite=Strict; Path=/",
    }
}

/// The `Set-Cookie` value that hands `token` to the browser.
pub fn session_cookie(config: &Config, token: &str) -> String {
    format!(
        "{}={}; {}; Max-Age={}",
        AUTH_COOKIE,
        token,
        cookie_attributes(config),
        config.token_ttl.num_seconds()
    )
}

/// The `Set-Cookie` value that makes the browser drop the session.
pub fn cleared_cookie(config: &Config) -> String {
    format!("{}=; {}; Max-Age=0", AUTH_COOKIE, cookie_attributes(config))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /jwt/create - Issue a session token for the given email
#[utoipa::path(
    post,
    path = "/jwt/create",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Session cookie set", body = StatusResponse),
        (status = 400, description = "Missing or invalid email"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_token_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> HttpResult<impl IntoResponse> {
    let mut fields: Map<String, Value> = serde_json::from_slice(&body)
        .map_err(|e| HttpError::bad_request(format!("Invalid JSON body: {}", e)))?;

    let email = match fields.remove("email") {
        Some(Value::String(email)) if !email.trim().is_empty() => email.trim().to_string(),
        _ => return Err(HttpError::bad_request("email is required")),
    };

    let claims = SessionClaims::new(email).with_extra(fields);
    let token = state
        .tokens
        .issue(&claims, state.config.token_ttl)
        .map_err(|e| {
            error!("Failed to issue session token: {:?}", e);
            HttpError(CatalogError::Store(PortError::Unexpected(
                "token issuance failed".to_string(),
            )))
        })?;
    info!(email = %claims.email, "session token issued");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state.config, &token))],
        Json(StatusResponse { status: true }),
    ))
}

/// POST /jwt/remove - Clear the session cookie
#[utoipa::path(
    post,
    path = "/jwt/remove",
    responses(
        (status = 200, description = "Session cookie cleared", body = StatusResponse)
    )
)]
pub async fn remove_token_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_cookie(&state.config))],
        Json(StatusResponse { status: true }),
    )
}
