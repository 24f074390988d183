//! crates/wandau_core/src/memory.rs
//!
//! An in-process `CatalogStore` kept behind a single lock. Multi-step writes
//! (cascade delete, like plus counter) happen under one guard, so they are
//! atomic with respect to other callers. Used by the test suites and for
//! running the API without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Artifact, ArtifactFields, DeleteSummary, Like, LikeOutcome, NewArtifact, NewLike};
use crate::ports::{CatalogStore, PortError, PortResult};

#[derive(Default)]
struct Collections {
    /// Insertion order doubles as the tiebreaker for listings.
    artifacts: Vec<Artifact>,
    likes: Vec<Like>,
}

impl Collections {
    fn artifact_mut(&mut self, id: Uuid) -> Option<&mut Artifact> {
        self.artifacts.iter_mut().find(|a| a.id == id)
    }

    fn increment(&mut self, id: Uuid) -> PortResult<()> {
        let artifact = self
            .artifact_mut(id)
            .ok_or_else(|| PortError::NotFound(format!("Artifact {id} not found")))?;
        artifact.like_count += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Collections>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_artifact(&self, artifact: NewArtifact) -> PortResult<Artifact> {
        let stored = Artifact {
            id: Uuid::new_v4(),
            fields: artifact.fields,
            owner_email: artifact.owner_email,
            like_count: 0,
            inserted_at: Utc::now(),
        };
        self.inner.write().await.artifacts.push(stored.clone());
        Ok(stored)
    }

    async fn get_artifact(&self, id: Uuid) -> PortResult<Option<Artifact>> {
        let inner = self.inner.read().await;
        Ok(inner.artifacts.iter().find(|a| a.id == id).cloned())
    }

    async fn list_artifacts(&self) -> PortResult<Vec<Artifact>> {
        Ok(self.inner.read().await.artifacts.clone())
    }

    async fn search_artifacts_by_name(&self, needle: &str) -> PortResult<Vec<Artifact>> {
        let needle = needle.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .iter()
            .filter(|a| {
                a.fields
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn list_artifacts_by_owner(&self, owner_email: &str) -> PortResult<Vec<Artifact>> {
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .iter()
            .filter(|a| a.owner_email == owner_email)
            .cloned()
            .collect())
    }

    async fn list_most_liked(&self, limit: usize) -> PortResult<Vec<Artifact>> {
        let mut artifacts = self.inner.read().await.artifacts.clone();
        // Stable sort keeps insertion order among equal counts.
        artifacts.sort_by(|a, b| b.like_count.cmp(&a.like_count));
        artifacts.truncate(limit);
        Ok(artifacts)
    }

    async fn patch_artifact(&self, id: Uuid, patch: ArtifactFields) -> PortResult<Option<Artifact>> {
        let mut inner = self.inner.write().await;
        Ok(inner.artifact_mut(id).map(|artifact| {
            artifact.fields.merge(patch);
            artifact.clone()
        }))
    }

    async fn delete_artifact(&self, id: Uuid) -> PortResult<DeleteSummary> {
        let mut inner = self.inner.write().await;

        let artifacts_before = inner.artifacts.len();
        inner.artifacts.retain(|a| a.id != id);
        let likes_before = inner.likes.len();
        inner.likes.retain(|l| l.artifact_id != id);

        Ok(DeleteSummary {
            artifacts_deleted: (artifacts_before - inner.artifacts.len()) as u64,
            likes_deleted: (likes_before - inner.likes.len()) as u64,
        })
    }

    async fn increment_like_count(&self, id: Uuid) -> PortResult<()> {
        self.inner.write().await.increment(id)
    }

    async fn record_like(&self, like: NewLike) -> PortResult<LikeOutcome> {
        let mut inner = self.inner.write().await;

        let duplicate = inner
            .likes
            .iter()
            .any(|l| l.artifact_id == like.artifact_id && l.email == like.email);
        if duplicate {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        inner.increment(like.artifact_id)?;
        let stored = Like {
            id: Uuid::new_v4(),
            artifact_id: like.artifact_id,
            email: like.email,
            payload: like.payload,
            liked_at: Utc::now(),
        };
        inner.likes.push(stored.clone());
        Ok(LikeOutcome::Created(stored))
    }

    async fn likes_by_email(&self, email: &str) -> PortResult<Vec<Like>> {
        let inner = self.inner.read().await;
        Ok(inner.likes.iter().filter(|l| l.email == email).cloned().collect())
    }

    async fn likes_for_artifact(&self, artifact_id: Uuid) -> PortResult<Vec<Like>> {
        let inner = self.inner.read().await;
        Ok(inner
            .likes
            .iter()
            .filter(|l| l.artifact_id == artifact_id)
            .cloned()
            .collect())
    }

    async fn reconcile_like_count(&self, artifact_id: Uuid) -> PortResult<i64> {
        let mut inner = self.inner.write().await;
        let count = inner
            .likes
            .iter()
            .filter(|l| l.artifact_id == artifact_id)
            .count() as i64;
        let artifact = inner
            .artifact_mut(artifact_id)
            .ok_or_else(|| PortError::NotFound(format!("Artifact {artifact_id} not found")))?;
        artifact.like_count = count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn new_artifact(name: &str) -> NewArtifact {
        NewArtifact {
            fields: ArtifactFields {
                name: Some(name.to_string()),
                ..Default::default()
            },
            owner_email: "owner@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn bare_increment_drifts_and_reconcile_repairs_it() {
        let store = InMemoryCatalogStore::new();
        let artifact = store.insert_artifact(new_artifact("Coin")).await.unwrap();

        store.increment_like_count(artifact.id).await.unwrap();
        assert_eq!(store.get_artifact(artifact.id).await.unwrap().unwrap().like_count, 1);

        assert_eq!(store.reconcile_like_count(artifact.id).await.unwrap(), 0);
        assert_eq!(store.get_artifact(artifact.id).await.unwrap().unwrap().like_count, 0);
    }

    #[tokio::test]
    async fn increment_of_unknown_artifact_is_not_found() {
        let store = InMemoryCatalogStore::new();
        assert!(matches!(
            store.increment_like_count(Uuid::new_v4()).await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn like_for_missing_artifact_leaves_ledger_untouched() {
        let store = InMemoryCatalogStore::new();
        let missing = Uuid::new_v4();

        let result = store
            .record_like(NewLike {
                artifact_id: missing,
                email: "bob@x.com".to_string(),
                payload: Map::new(),
            })
            .await;

        assert!(matches!(result, Err(PortError::NotFound(_))));
        assert!(store.likes_for_artifact(missing).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ties_in_like_count_keep_insertion_order() {
        let store = InMemoryCatalogStore::new();
        let first = store.insert_artifact(new_artifact("First")).await.unwrap();
        let second = store.insert_artifact(new_artifact("Second")).await.unwrap();

        let listed = store.list_most_liked(10).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn artifacts_without_a_name_never_match_a_search() {
        let store = InMemoryCatalogStore::new();
        store
            .insert_artifact(NewArtifact {
                fields: ArtifactFields::default(),
                owner_email: "owner@x.com".to_string(),
            })
            .await
            .unwrap();

        assert!(store.search_artifacts_by_name("a").await.unwrap().is_empty());
    }
}
