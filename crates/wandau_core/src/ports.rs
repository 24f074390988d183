//! crates/wandau_core/src/ports.rs
//!
//! Defines the storage contract for the catalog core.
//! The trait forms the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete store (PostgreSQL, in-memory).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Artifact, ArtifactFields, DeleteSummary, Like, LikeOutcome, NewArtifact, NewLike};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying store driver.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Port
//=========================================================================================

/// Persistent storage for artifacts and the like ledger.
///
/// Every method is atomic on its own. Methods that touch both collections
/// (`delete_artifact`, `record_like`) must apply all of their writes or none.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- Artifacts ---
    async fn insert_artifact(&self, artifact: NewArtifact) -> PortResult<Artifact>;

    /// Returns `None` when no artifact has this id.
    async fn get_artifact(&self, id: Uuid) -> PortResult<Option<Artifact>>;

    /// All artifacts in insertion order.
    async fn list_artifacts(&self) -> PortResult<Vec<Artifact>>;

    /// Case-insensitive literal substring match on the artifact name.
    async fn search_artifacts_by_name(&self, needle: &str) -> PortResult<Vec<Artifact>>;

    async fn list_artifacts_by_owner(&self, owner_email: &str) -> PortResult<Vec<Artifact>>;

    /// Artifacts ordered by like count (descending), then insertion time,
    /// then id; at most `limit` of them.
    async fn list_most_liked(&self, limit: usize) -> PortResult<Vec<Artifact>>;

    /// Merges the supplied fields into the stored artifact.
    /// Returns `None` when the artifact does not exist.
    async fn patch_artifact(&self, id: Uuid, patch: ArtifactFields) -> PortResult<Option<Artifact>>;

    /// Deletes the artifact and every like that references it.
    async fn delete_artifact(&self, id: Uuid) -> PortResult<DeleteSummary>;

    /// Adds one to the artifact's like counter. Both stores run this same step
    /// inside `record_like`; on its own it only feeds `reconcile_like_count`
    /// drift checks, and no route exposes it.
    async fn increment_like_count(&self, id: Uuid) -> PortResult<()>;

    // --- Like ledger ---

    /// Inserts the like and bumps the artifact's counter together, unless the
    /// (artifact, email) pair is already present.
    async fn record_like(&self, like: NewLike) -> PortResult<LikeOutcome>;

    async fn likes_by_email(&self, email: &str) -> PortResult<Vec<Like>>;

    async fn likes_for_artifact(&self, artifact_id: Uuid) -> PortResult<Vec<Like>>;

    /// Recomputes the counter from the ledger and returns the stored value.
    async fn reconcile_like_count(&self, artifact_id: Uuid) -> PortResult<i64>;
}
