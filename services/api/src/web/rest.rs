//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the
//! root banner endpoint.

use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::web::{artifacts, auth, likes, protocol};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::create_token_handler,
        auth::remove_token_handler,
        artifacts::create_artifact_handler,
        artifacts::list_artifacts_handler,
        artifacts::search_artifacts_handler,
        artifacts::get_artifact_handler,
        artifacts::update_artifact_handler,
        artifacts::delete_artifact_handler,
        artifacts::featured_artifacts_handler,
        artifacts::user_artifacts_handler,
        likes::like_artifact_handler,
        likes::liked_artifacts_handler,
        likes::likers_handler,
    ),
    components(
        schemas(
            ErrorBody,
            protocol::TokenRequest,
            protocol::ArtifactPayload,
            protocol::ArtifactView,
            protocol::LikeView,
            protocol::StatusResponse,
            protocol::InsertedId,
            protocol::InsertResponse,
            protocol::ArtifactResponse,
            protocol::ArtifactListResponse,
            protocol::SearchResponse,
            protocol::UpdateResponse,
            protocol::DeletedCount,
            protocol::DeleteResponse,
            protocol::LikeResponse,
            protocol::LikeListResponse,
        )
    ),
    tags(
        (name = "Wandau API", description = "Crowd-sourced catalog of historical artifacts.")
    )
)]
pub struct ApiDoc;

/// Renders the full OpenAPI document as pretty-printed JSON.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

//=========================================================================================
// Root
//=========================================================================================

pub const BANNER: &str = "Wandau Server Running.....";

/// GET / - Liveness banner
pub async fn root_handler() -> &'static str {
    BANNER
}
