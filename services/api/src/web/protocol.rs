//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the frontend and the API server.
//! Field names are camelCase on the wire; every successful response carries
//! `status: true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;
use wandau_core::{Artifact, ArtifactFields, DeleteSummary, Like};

//=========================================================================================
// Payloads Sent FROM the Client TO the Server
//=========================================================================================

/// Body of `POST /jwt/create`. Any extra fields are carried into the token.
#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
}

/// Artifact fields as submitted on create and update. Unknown keys are ignored,
/// missing keys are left absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPayload {
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub artifact_type: Option<String>,
    pub historical_context: Option<String>,
    pub created_at: Option<String>,
    pub discovered_at: Option<String>,
    pub discovered_by: Option<String>,
    pub present_location: Option<String>,
    /// Must match the caller when present. Ignored on update.
    #[serde(alias = "email")]
    pub owner_email: Option<String>,
}

impl ArtifactPayload {
    /// Splits the payload into the editable fields and the claimed owner.
    pub fn into_parts(self) -> (ArtifactFields, Option<String>) {
        let fields = ArtifactFields {
            name: self.name,
            image: self.image,
            artifact_type: self.artifact_type,
            historical_context: self.historical_context,
            created_at: self.created_at,
            discovered_at: self.discovered_at,
            discovered_by: self.discovered_by,
            present_location: self.present_location,
        };
        (fields, self.owner_email)
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct LikeParams {
    pub email: Option<String>,
}

//=========================================================================================
// Payloads Sent FROM the Server TO the Client
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovered_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub present_location: Option<String>,
    pub owner_email: String,
    pub like_count: i64,
    pub inserted_at: DateTime<Utc>,
}

impl From<Artifact> for ArtifactView {
    fn from(artifact: Artifact) -> Self {
        let f = artifact.fields;
        Self {
            id: artifact.id,
            name: f.name,
            image: f.image,
            artifact_type: f.artifact_type,
            historical_context: f.historical_context,
            created_at: f.created_at,
            discovered_at: f.discovered_at,
            discovered_by: f.discovered_by,
            present_location: f.present_location,
            owner_email: artifact.owner_email,
            like_count: artifact.like_count,
            inserted_at: artifact.inserted_at,
        }
    }
}

pub fn artifact_views(artifacts: Vec<Artifact>) -> Vec<ArtifactView> {
    artifacts.into_iter().map(ArtifactView::from).collect()
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    pub id: Uuid,
    pub artifact_id: Uuid,
    pub email: String,
    #[schema(value_type = Object)]
    pub payload: Map<String, Value>,
    pub liked_at: DateTime<Utc>,
}

impl From<Like> for LikeView {
    fn from(like: Like) -> Self {
        Self {
            id: like.id,
            artifact_id: like.artifact_id,
            email: like.email,
            payload: like.payload,
            liked_at: like.liked_at,
        }
    }
}

pub fn like_views(likes: Vec<Like>) -> Vec<LikeView> {
    likes.into_iter().map(LikeView::from).collect()
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertedId {
    pub inserted_id: Uuid,
}

#[derive(Serialize, ToSchema)]
pub struct InsertResponse {
    pub status: bool,
    pub data: InsertedId,
}

#[derive(Serialize, ToSchema)]
pub struct ArtifactResponse {
    pub status: bool,
    pub data: ArtifactView,
}

#[derive(Serialize, ToSchema)]
pub struct ArtifactListResponse {
    pub status: bool,
    pub data: Vec<ArtifactView>,
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub status: bool,
    pub data: Vec<ArtifactView>,
    pub query: String,
}

#[derive(Serialize, ToSchema)]
pub struct UpdateResponse {
    pub status: bool,
    pub id: Uuid,
    pub data: ArtifactView,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCount {
    pub deleted_count: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub status: bool,
    pub result_from_artifacts_collection: DeletedCount,
    pub result_from_artifacts_like_collection: DeletedCount,
}

impl From<DeleteSummary> for DeleteResponse {
    fn from(summary: DeleteSummary) -> Self {
        Self {
            status: true,
            result_from_artifacts_collection: DeletedCount {
                deleted_count: summary.artifacts_deleted,
            },
            result_from_artifacts_like_collection: DeletedCount {
                deleted_count: summary.likes_deleted,
            },
        }
    }
}

/// `status:false` plus a message when the like already existed.
#[derive(Serialize, ToSchema)]
pub struct LikeResponse {
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<LikeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LikeListResponse {
    pub status: bool,
    pub data: Vec<LikeView>,
}
