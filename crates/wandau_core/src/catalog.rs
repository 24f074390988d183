//! crates/wandau_core/src/catalog.rs
//!
//! The artifact catalog and the like ledger: the application services that sit
//! between the HTTP handlers and the `CatalogStore` port. Every user-scoped
//! operation takes the verified caller and checks ownership before touching
//! the store.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Artifact, ArtifactFields, DeleteSummary, Like, LikeOutcome, NewArtifact, NewLike};
use crate::error::{CatalogError, CatalogResult};
use crate::guard::Identity;
use crate::ports::CatalogStore;

/// How many artifacts the featured listing returns unless configured otherwise.
pub const DEFAULT_FEATURED_LIMIT: usize = 6;

/// Message returned when a search is issued without a term.
pub const NO_SEARCH_VALUE: &str = "No search value provided";

fn artifact_not_found(id: Uuid) -> CatalogError {
    CatalogError::NotFound(format!("Artifact {id} not found"))
}

//=========================================================================================
// Artifact Catalog
//=========================================================================================

#[derive(Clone)]
pub struct ArtifactCatalog {
    store: Arc<dyn CatalogStore>,
    featured_limit: usize,
}

impl ArtifactCatalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            featured_limit: DEFAULT_FEATURED_LIMIT,
        }
    }

    pub fn with_featured_limit(mut self, limit: usize) -> Self {
        self.featured_limit = limit;
        self
    }

    /// Stores a new artifact owned by `caller`.
    ///
    /// `claimed_owner` is the owner email the client put in the payload, if
    /// any; it must name the caller.
    pub async fn create(
        &self,
        caller: &Identity,
        fields: ArtifactFields,
        claimed_owner: Option<&str>,
    ) -> CatalogResult<Artifact> {
        if let Some(owner) = claimed_owner {
            caller.ensure_owns(owner)?;
        }
        let artifact = self
            .store
            .insert_artifact(NewArtifact {
                fields,
                owner_email: caller.email().to_string(),
            })
            .await?;
        info!(artifact_id = %artifact.id, owner = %artifact.owner_email, "artifact created");
        Ok(artifact)
    }

    pub async fn get(&self, id: Uuid) -> CatalogResult<Artifact> {
        self.store
            .get_artifact(id)
            .await?
            .ok_or_else(|| artifact_not_found(id))
    }

    pub async fn list_all(&self) -> CatalogResult<Vec<Artifact>> {
        Ok(self.store.list_artifacts().await?)
    }

    /// Case-insensitive substring search on the artifact name.
    /// A missing or blank term is `BadInput`, never a full listing.
    pub async fn search(&self, term: Option<&str>) -> CatalogResult<Vec<Artifact>> {
        let term = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CatalogError::BadInput(NO_SEARCH_VALUE.to_string()))?;
        Ok(self.store.search_artifacts_by_name(term).await?)
    }

    /// Applies the supplied fields to an artifact the caller owns.
    pub async fn update(
        &self,
        caller: &Identity,
        id: Uuid,
        patch: ArtifactFields,
    ) -> CatalogResult<Artifact> {
        let current = self.get(id).await?;
        caller.ensure_owns(&current.owner_email)?;

        if patch.is_empty() {
            debug!(artifact_id = %id, "empty patch, nothing to update");
            return Ok(current);
        }

        let updated = self
            .store
            .patch_artifact(id, patch)
            .await?
            .ok_or_else(|| artifact_not_found(id))?;
        info!(artifact_id = %id, "artifact updated");
        Ok(updated)
    }

    /// Deletes an artifact the caller owns, along with all of its likes.
    pub async fn delete(&self, caller: &Identity, id: Uuid) -> CatalogResult<DeleteSummary> {
        let current = self.get(id).await?;
        caller.ensure_owns(&current.owner_email)?;

        let summary = self.store.delete_artifact(id).await?;
        info!(
            artifact_id = %id,
            likes_deleted = summary.likes_deleted,
            "artifact deleted"
        );
        Ok(summary)
    }

    pub async fn list_by_owner(&self, caller: &Identity, owner: &str) -> CatalogResult<Vec<Artifact>> {
        caller.ensure_owns(owner)?;
        Ok(self.store.list_artifacts_by_owner(caller.email()).await?)
    }

    pub async fn list_featured(&self) -> CatalogResult<Vec<Artifact>> {
        Ok(self.store.list_most_liked(self.featured_limit).await?)
    }
}

//=========================================================================================
// Like Ledger
//=========================================================================================

#[derive(Clone)]
pub struct LikeLedger {
    store: Arc<dyn CatalogStore>,
}

impl LikeLedger {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Records that `email` likes the artifact, at most once per pair.
    ///
    /// The counter on the artifact moves in the same store write as the
    /// ledger insert. When `email` is omitted the caller's own email is used.
    pub async fn record_like(
        &self,
        caller: &Identity,
        artifact_id: Uuid,
        email: Option<&str>,
        payload: Map<String, Value>,
    ) -> CatalogResult<LikeOutcome> {
        if let Some(email) = email {
            caller.ensure_owns(email)?;
        }

        let outcome = self
            .store
            .record_like(NewLike {
                artifact_id,
                email: caller.email().to_string(),
                payload,
            })
            .await?;

        match &outcome {
            LikeOutcome::Created(like) => {
                info!(artifact_id = %artifact_id, email = %like.email, "like recorded")
            }
            LikeOutcome::AlreadyLiked => {
                debug!(artifact_id = %artifact_id, email = %caller.email(), "duplicate like ignored")
            }
        }
        Ok(outcome)
    }

    pub async fn list_liked_by_user(&self, caller: &Identity, email: &str) -> CatalogResult<Vec<Like>> {
        caller.ensure_owns(email)?;
        Ok(self.store.likes_by_email(caller.email()).await?)
    }

    /// Public: anyone may see who liked an artifact.
    pub async fn list_likers(&self, artifact_id: Uuid) -> CatalogResult<Vec<Like>> {
        Ok(self.store.likes_for_artifact(artifact_id).await?)
    }
}
