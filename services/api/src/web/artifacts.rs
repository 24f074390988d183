//! services/api/src/web/artifacts.rs
//!
//! Handlers for browsing, searching and managing artifacts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;
use wandau_core::{CatalogError, Identity};

use crate::error::{ErrorBody, HttpError, HttpResult};
use crate::web::extract::JsonBody;
use crate::web::protocol::{
    artifact_views, ArtifactListResponse, ArtifactPayload, ArtifactResponse, ArtifactView,
    DeleteResponse, InsertResponse, InsertedId, SearchParams, SearchResponse, UpdateResponse,
};
use crate::web::state::AppState;

/// Parses an artifact id from the path. Ids that cannot exist are reported
/// the same way as ids that do not exist.
pub fn parse_artifact_id(raw: &str) -> HttpResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| HttpError(CatalogError::NotFound(format!("Artifact {} not found", raw))))
}

/// POST /add-artifacts - Submit a new artifact owned by the caller
#[utoipa::path(
    post,
    path = "/add-artifacts",
    request_body = ArtifactPayload,
    responses(
        (status = 201, description = "Artifact created", body = InsertResponse),
        (status = 400, description = "Body is not a valid artifact", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 403, description = "Payload names another owner", body = ErrorBody)
    )
)]
pub async fn create_artifact_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    JsonBody(payload): JsonBody<ArtifactPayload>,
) -> HttpResult<impl IntoResponse> {
    let (fields, claimed_owner) = payload.into_parts();
    let artifact = state
        .artifacts
        .create(&caller, fields, claimed_owner.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(InsertResponse {
            status: true,
            data: InsertedId {
                inserted_id: artifact.id,
            },
        }),
    ))
}

/// GET /artifacts - List every artifact
#[utoipa::path(
    get,
    path = "/artifacts",
    responses((status = 200, description = "All artifacts", body = ArtifactListResponse))
)]
pub async fn list_artifacts_handler(
    State(state): State<Arc<AppState>>,
) -> HttpResult<Json<ArtifactListResponse>> {
    let artifacts = state.artifacts.list_all().await?;
    Ok(Json(ArtifactListResponse {
        status: true,
        data: artifact_views(artifacts),
    }))
}

/// GET /artifacts-search?search=X - Case-insensitive search on the artifact name
///
/// A missing or blank term answers 200 with `status:false` and an explanatory
/// message rather than the full listing.
#[utoipa::path(
    get,
    path = "/artifacts-search",
    params(("search" = Option<String>, Query, description = "Substring of the artifact name")),
    responses(
        (status = 200, description = "Matches, or a message when no term was given", body = SearchResponse)
    )
)]
pub async fn search_artifacts_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> HttpResult<Response> {
    let result = state.artifacts.search(params.search.as_deref()).await;
    match result {
        Ok(artifacts) => Ok(Json(SearchResponse {
            status: true,
            data: artifact_views(artifacts),
            query: params.search.unwrap_or_default(),
        })
        .into_response()),
        Err(CatalogError::BadInput(message)) => Ok(Json(ErrorBody {
            status: false,
            message,
        })
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// GET /artifact/{id} - Fetch one artifact
#[utoipa::path(
    get,
    path = "/artifact/{id}",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "The artifact", body = ArtifactResponse),
        (status = 404, description = "No such artifact", body = ErrorBody)
    )
)]
pub async fn get_artifact_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> HttpResult<Json<ArtifactResponse>> {
    let id = parse_artifact_id(&id)?;
    let artifact = state.artifacts.get(id).await?;
    Ok(Json(ArtifactResponse {
        status: true,
        data: ArtifactView::from(artifact),
    }))
}

/// PATCH /artifact-update/{id} - Change the supplied fields of an owned artifact
#[utoipa::path(
    patch,
    path = "/artifact-update/{id}",
    params(("id" = String, Path, description = "Artifact id")),
    request_body = ArtifactPayload,
    responses(
        (status = 200, description = "Updated artifact", body = UpdateResponse),
        (status = 400, description = "Body is not a valid artifact", body = ErrorBody),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 403, description = "Caller does not own the artifact", body = ErrorBody),
        (status = 404, description = "No such artifact", body = ErrorBody)
    )
)]
pub async fn update_artifact_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<ArtifactPayload>,
) -> HttpResult<Json<UpdateResponse>> {
    let id = parse_artifact_id(&id)?;
    let (patch, _) = payload.into_parts();
    let artifact = state.artifacts.update(&caller, id, patch).await?;
    Ok(Json(UpdateResponse {
        status: true,
        id,
        data: ArtifactView::from(artifact),
    }))
}

/// DELETE /artifact-delete/{id} - Delete an owned artifact and its likes
#[utoipa::path(
    delete,
    path = "/artifact-delete/{id}",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Deletion counts", body = DeleteResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 403, description = "Caller does not own the artifact", body = ErrorBody),
        (status = 404, description = "No such artifact", body = ErrorBody)
    )
)]
pub async fn delete_artifact_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> HttpResult<Json<DeleteResponse>> {
    let id = parse_artifact_id(&id)?;
    let summary = state.artifacts.delete(&caller, id).await?;
    Ok(Json(DeleteResponse::from(summary)))
}

/// GET /featured-artifacts - The most liked artifacts
#[utoipa::path(
    get,
    path = "/featured-artifacts",
    responses((status = 200, description = "Most liked first", body = ArtifactListResponse))
)]
pub async fn featured_artifacts_handler(
    State(state): State<Arc<AppState>>,
) -> HttpResult<Json<ArtifactListResponse>> {
    let artifacts = state.artifacts.list_featured().await?;
    Ok(Json(ArtifactListResponse {
        status: true,
        data: artifact_views(artifacts),
    }))
}

/// GET /user-added-artifacts/{email} - Artifacts submitted by the caller
#[utoipa::path(
    get,
    path = "/user-added-artifacts/{email}",
    params(("email" = String, Path, description = "Owner email; must be the caller")),
    responses(
        (status = 200, description = "The caller's artifacts", body = ArtifactListResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 403, description = "Email is not the caller", body = ErrorBody)
    )
)]
pub async fn user_artifacts_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(email): Path<String>,
) -> HttpResult<Json<ArtifactListResponse>> {
    let artifacts = state.artifacts.list_by_owner(&caller, &email).await?;
    Ok(Json(ArtifactListResponse {
        status: true,
        data: artifact_views(artifacts),
    }))
}
