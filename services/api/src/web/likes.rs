//! services/api/src/web/likes.rs
//!
//! Handlers for the like ledger. The artifact's like counter only moves when a
//! like is recorded here; there is no endpoint that bumps it directly.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use wandau_core::{Identity, LikeOutcome};

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::artifacts::parse_artifact_id;
use crate::web::protocol::{like_views, LikeListResponse, LikeParams, LikeResponse, LikeView};
use crate::web::state::AppState;

pub const ALREADY_LIKED: &str = "Already Liked This Artifact";

/// An empty body means "no extra fields"; anything else must be a JSON object.
fn parse_like_payload(body: &[u8]) -> HttpResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    serde_json::from_slice(body)
        .map_err(|e| HttpError::bad_request(format!("Like payload must be a JSON object: {}", e)))
}

/// POST /like/{id}?email=E - Like an artifact once
#[utoipa::path(
    post,
    path = "/like/{id}",
    params(
        ("id" = String, Path, description = "Artifact id"),
        ("email" = Option<String>, Query, description = "Liker email; must be the caller")
    ),
    request_body(content = Object, description = "Optional like payload"),
    responses(
        (status = 200, description = "Like recorded, or status:false when already liked", body = LikeResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 403, description = "Email is not the caller", body = ErrorBody),
        (status = 404, description = "No such artifact", body = ErrorBody)
    )
)]
pub async fn like_artifact_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    Query(params): Query<LikeParams>,
    body: Bytes,
) -> HttpResult<Json<LikeResponse>> {
    let id = parse_artifact_id(&id)?;
    let payload = parse_like_payload(&body)?;

    let response = match state
        .likes
        .record_like(&caller, id, params.email.as_deref(), payload)
        .await?
    {
        LikeOutcome::Created(like) => LikeResponse {
            status: true,
            result: Some(LikeView::from(like)),
            message: None,
        },
        LikeOutcome::AlreadyLiked => LikeResponse {
            status: false,
            result: None,
            message: Some(ALREADY_LIKED.to_string()),
        },
    };
    Ok(Json(response))
}

/// GET /liked-artifacts/{email} - Likes the caller has given
#[utoipa::path(
    get,
    path = "/liked-artifacts/{email}",
    params(("email" = String, Path, description = "Liker email; must be the caller")),
    responses(
        (status = 200, description = "The caller's likes", body = LikeListResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 403, description = "Email is not the caller", body = ErrorBody)
    )
)]
pub async fn liked_artifacts_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(email): Path<String>,
) -> HttpResult<Json<LikeListResponse>> {
    let likes = state.likes.list_liked_by_user(&caller, &email).await?;
    Ok(Json(LikeListResponse {
        status: true,
        data: like_views(likes),
    }))
}

/// GET /liked-persons/{id} - Everyone who liked an artifact
#[utoipa::path(
    get,
    path = "/liked-persons/{id}",
    params(("id" = String, Path, description = "Artifact id")),
    responses((status = 200, description = "Likes of the artifact", body = LikeListResponse))
)]
pub async fn likers_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HttpResult<Json<LikeListResponse>> {
    let id = parse_artifact_id(&id)?;
    let likes = state.likes.list_likers(id).await?;
    Ok(Json(LikeListResponse {
        status: true,
        data: like_views(likes),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_payload() {
        assert!(parse_like_payload(b"").unwrap().is_empty());
        assert!(parse_like_payload(b"  \n").unwrap().is_empty());
    }

    #[test]
    fn object_body_is_kept() {
        let payload = parse_like_payload(br#"{"artifactName":"Amphora"}"#).unwrap();
        assert_eq!(payload.get("artifactName"), Some(&Value::from("Amphora")));
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(parse_like_payload(b"[1,2]").is_err());
    }
}
