pub mod artifacts;
pub mod auth;
pub mod extract;
pub mod likes;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::Config;

/// Builds the CORS policy from the configured frontend origins.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            // A wildcard inside an allow-list makes tower-http panic.
            Ok(value) if value == "*" => {
                warn!("ignoring wildcard CORS origin");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}

/// Creates the API router: public routes, guarded routes and CORS.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(rest::root_handler))
        .route("/jwt/create", post(auth::create_token_handler))
        .route("/jwt/remove", post(auth::remove_token_handler))
        .route("/artifacts", get(artifacts::list_artifacts_handler))
        .route("/artifacts-search", get(artifacts::search_artifacts_handler))
        .route("/artifact/{id}", get(artifacts::get_artifact_handler))
        .route("/featured-artifacts", get(artifacts::featured_artifacts_handler))
        .route("/liked-persons/{id}", get(likes::likers_handler));

    // Protected routes (valid session required, ownership checked per handler)
    let protected_routes = Router::new()
        .route("/add-artifacts", post(artifacts::create_artifact_handler))
        .route("/artifact-update/{id}", patch(artifacts::update_artifact_handler))
        .route("/artifact-delete/{id}", delete(artifacts::delete_artifact_handler))
        .route(
            "/user-added-artifacts/{email}",
            get(artifacts::user_artifacts_handler),
        )
        .route("/like/{id}", post(likes::like_artifact_handler))
        .route("/liked-artifacts/{email}", get(likes::liked_artifacts_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let cors = cors_layer(&state.config);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(state)
}
