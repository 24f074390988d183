//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CatalogStore` port from the core crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Writes that span both tables run inside one transaction: deleting an
//! artifact removes its likes in the same commit, and a like is only kept if
//! the artifact's counter was bumped alongside it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;
use wandau_core::domain::{
    Artifact, ArtifactFields, DeleteSummary, Like, LikeOutcome, NewArtifact, NewLike,
};
use wandau_core::ports::{CatalogStore, PortError, PortResult};

const ARTIFACT_COLUMNS: &str = "id, name, image, artifact_type, historical_context, created_at, \
     discovered_at, discovered_by, present_location, owner_email, like_count, inserted_at";

const LIKE_COLUMNS: &str = "id, artifact_id, email, payload, liked_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CatalogStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Closes every pooled connection. Called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

/// Adds one to an artifact's like counter on any connection, pooled or
/// inside a transaction.
async fn bump_like_count<'e, E>(executor: E, id: Uuid) -> PortResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let updated = sqlx::query("UPDATE artifacts SET like_count = like_count + 1 WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await
        .map_err(unexpected)?
        .rows_affected();
    if updated == 0 {
        return Err(PortError::NotFound(format!("Artifact {} not found", id)));
    }
    Ok(())
}

/// Escapes `LIKE` wildcards so the search term matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ArtifactRecord {
    id: Uuid,
    name: Option<String>,
    image: Option<String>,
    artifact_type: Option<String>,
    historical_context: Option<String>,
    created_at: Option<String>,
    discovered_at: Option<String>,
    discovered_by: Option<String>,
    present_location: Option<String>,
    owner_email: String,
    like_count: i64,
    inserted_at: DateTime<Utc>,
}
impl ArtifactRecord {
    fn to_domain(self) -> Artifact {
        Artifact {
            id: self.id,
            fields: ArtifactFields {
                name: self.name,
                image: self.image,
                artifact_type: self.artifact_type,
                historical_context: self.historical_context,
                created_at: self.created_at,
                discovered_at: self.discovered_at,
                discovered_by: self.discovered_by,
                present_location: self.present_location,
            },
            owner_email: self.owner_email,
            like_count: self.like_count,
            inserted_at: self.inserted_at,
        }
    }
}

#[derive(FromRow)]
struct LikeRecord {
    id: Uuid,
    artifact_id: Uuid,
    email: String,
    payload: Json<Map<String, Value>>,
    liked_at: DateTime<Utc>,
}
impl LikeRecord {
    fn to_domain(self) -> Like {
        Like {
            id: self.id,
            artifact_id: self.artifact_id,
            email: self.email,
            payload: self.payload.0,
            liked_at: self.liked_at,
        }
    }
}

fn artifacts_to_domain(records: Vec<ArtifactRecord>) -> Vec<Artifact> {
    records.into_iter().map(|r| r.to_domain()).collect()
}

fn likes_to_domain(records: Vec<LikeRecord>) -> Vec<Like> {
    records.into_iter().map(|r| r.to_domain()).collect()
}

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStore for DbAdapter {
    async fn insert_artifact(&self, artifact: NewArtifact) -> PortResult<Artifact> {
        let f = artifact.fields;
        let sql = format!(
            "INSERT INTO artifacts (id, name, image, artifact_type, historical_context, created_at, \
             discovered_at, discovered_by, present_location, owner_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {ARTIFACT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(f.name)
            .bind(f.image)
            .bind(f.artifact_type)
            .bind(f.historical_context)
            .bind(f.created_at)
            .bind(f.discovered_at)
            .bind(f.discovered_by)
            .bind(f.present_location)
            .bind(artifact.owner_email)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_artifact(&self, id: Uuid) -> PortResult<Option<Artifact>> {
        let sql = format!("SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE id = $1");
        let record = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(ArtifactRecord::to_domain))
    }

    async fn list_artifacts(&self) -> PortResult<Vec<Artifact>> {
        let sql = format!("SELECT {ARTIFACT_COLUMNS} FROM artifacts ORDER BY inserted_at, id");
        let records = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(artifacts_to_domain(records))
    }

    async fn search_artifacts_by_name(&self, needle: &str) -> PortResult<Vec<Artifact>> {
        let sql = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE name ILIKE $1 ESCAPE '\\' \
             ORDER BY inserted_at, id"
        );
        let records = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .bind(like_pattern(needle))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(artifacts_to_domain(records))
    }

    async fn list_artifacts_by_owner(&self, owner_email: &str) -> PortResult<Vec<Artifact>> {
        let sql = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE owner_email = $1 ORDER BY inserted_at, id"
        );
        let records = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .bind(owner_email)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(artifacts_to_domain(records))
    }

    async fn list_most_liked(&self, limit: usize) -> PortResult<Vec<Artifact>> {
        let sql = format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts \
             ORDER BY like_count DESC, inserted_at ASC, id ASC LIMIT $1"
        );
        let records = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(artifacts_to_domain(records))
    }

    async fn patch_artifact(&self, id: Uuid, patch: ArtifactFields) -> PortResult<Option<Artifact>> {
        let sql = format!(
            "UPDATE artifacts SET \
             name = COALESCE($2, name), \
             image = COALESCE($3, image), \
             artifact_type = COALESCE($4, artifact_type), \
             historical_context = COALESCE($5, historical_context), \
             created_at = COALESCE($6, created_at), \
             discovered_at = COALESCE($7, discovered_at), \
             discovered_by = COALESCE($8, discovered_by), \
             present_location = COALESCE($9, present_location) \
             WHERE id = $1 RETURNING {ARTIFACT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ArtifactRecord>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.image)
            .bind(patch.artifact_type)
            .bind(patch.historical_context)
            .bind(patch.created_at)
            .bind(patch.discovered_at)
            .bind(patch.discovered_by)
            .bind(patch.present_location)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(ArtifactRecord::to_domain))
    }

    async fn delete_artifact(&self, id: Uuid) -> PortResult<DeleteSummary> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let likes_deleted = sqlx::query("DELETE FROM artifact_likes WHERE artifact_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?
            .rows_affected();
        let artifacts_deleted = sqlx::query("DELETE FROM artifacts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?
            .rows_affected();

        tx.commit().await.map_err(unexpected)?;
        Ok(DeleteSummary {
            artifacts_deleted,
            likes_deleted,
        })
    }

    async fn increment_like_count(&self, id: Uuid) -> PortResult<()> {
        bump_like_count(&self.pool, id).await
    }

    async fn record_like(&self, like: NewLike) -> PortResult<LikeOutcome> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Bumping the counter first locks the artifact row, which serializes
        // concurrent likes of the same artifact.
        if let Err(e) = bump_like_count(&mut *tx, like.artifact_id).await {
            tx.rollback().await.map_err(unexpected)?;
            return Err(e);
        }

        let sql = format!(
            "INSERT INTO artifact_likes (id, artifact_id, email, payload) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (artifact_id, email) DO NOTHING RETURNING {LIKE_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, LikeRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(like.artifact_id)
            .bind(&like.email)
            .bind(Json(&like.payload))
            .fetch_optional(&mut *tx)
            .await
            .map_err(unexpected)?;

        match inserted {
            Some(record) => {
                tx.commit().await.map_err(unexpected)?;
                Ok(LikeOutcome::Created(record.to_domain()))
            }
            None => {
                // Duplicate pair: undo the counter bump.
                tx.rollback().await.map_err(unexpected)?;
                Ok(LikeOutcome::AlreadyLiked)
            }
        }
    }

    async fn likes_by_email(&self, email: &str) -> PortResult<Vec<Like>> {
        let sql = format!(
            "SELECT {LIKE_COLUMNS} FROM artifact_likes WHERE email = $1 ORDER BY liked_at, id"
        );
        let records = sqlx::query_as::<_, LikeRecord>(&sql)
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(likes_to_domain(records))
    }

    async fn likes_for_artifact(&self, artifact_id: Uuid) -> PortResult<Vec<Like>> {
        let sql = format!(
            "SELECT {LIKE_COLUMNS} FROM artifact_likes WHERE artifact_id = $1 ORDER BY liked_at, id"
        );
        let records = sqlx::query_as::<_, LikeRecord>(&sql)
            .bind(artifact_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(likes_to_domain(records))
    }

    async fn reconcile_like_count(&self, artifact_id: Uuid) -> PortResult<i64> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE artifacts SET like_count = \
             (SELECT COUNT(*) FROM artifact_likes WHERE artifact_id = $1) \
             WHERE id = $1 RETURNING like_count",
        )
        .bind(artifact_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        count.ok_or_else(|| PortError::NotFound(format!("Artifact {} not found", artifact_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_wraps_and_escapes_wildcards() {
        assert_eq!(like_pattern("sword"), "%sword%");
        assert_eq!(like_pattern("100%_pure\\"), "%100\\%\\_pure\\\\%");
    }
}
