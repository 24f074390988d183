//! crates/wandau_core/src/domain.rs
//!
//! Defines the pure, core data structures for the catalog.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A cataloged historical item, owned by the user who submitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: Uuid,
    pub fields: ArtifactFields,
    pub owner_email: String,
    /// Denormalized count of likes in the ledger for this artifact.
    pub like_count: i64,
    pub inserted_at: DateTime<Utc>,
}

/// The user-editable attributes of an artifact. Every field is optional:
/// submissions are accepted partially filled and absent values stay absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactFields {
    pub name: Option<String>,
    pub image: Option<String>,
    pub artifact_type: Option<String>,
    pub historical_context: Option<String>,
    /// Free text as entered, e.g. "circa 100 BC".
    pub created_at: Option<String>,
    pub discovered_at: Option<String>,
    pub discovered_by: Option<String>,
    pub present_location: Option<String>,
}

impl ArtifactFields {
    /// Overwrites only the fields that are present in `patch`.
    pub fn merge(&mut self, patch: ArtifactFields) {
        let ArtifactFields {
            name,
            image,
            artifact_type,
            historical_context,
            created_at,
            discovered_at,
            discovered_by,
            present_location,
        } = patch;

        merge_field(&mut self.name, name);
        merge_field(&mut self.image, image);
        merge_field(&mut self.artifact_type, artifact_type);
        merge_field(&mut self.historical_context, historical_context);
        merge_field(&mut self.created_at, created_at);
        merge_field(&mut self.discovered_at, discovered_at);
        merge_field(&mut self.discovered_by, discovered_by);
        merge_field(&mut self.present_location, present_location);
    }

    /// True when no field would change on merge.
    pub fn is_empty(&self) -> bool {
        *self == ArtifactFields::default()
    }
}

fn merge_field(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// An artifact that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub fields: ArtifactFields,
    pub owner_email: String,
}

/// A user's endorsement of one artifact. Unique per (artifact, email).
#[derive(Debug, Clone, PartialEq)]
pub struct Like {
    pub id: Uuid,
    pub artifact_id: Uuid,
    pub email: String,
    /// Auxiliary fields the client sent along with the like.
    pub payload: Map<String, Value>,
    pub liked_at: DateTime<Utc>,
}

/// A like that has not been recorded yet.
#[derive(Debug, Clone)]
pub struct NewLike {
    pub artifact_id: Uuid,
    pub email: String,
    pub payload: Map<String, Value>,
}

/// Result of trying to record a like.
#[derive(Debug, Clone, PartialEq)]
pub enum LikeOutcome {
    Created(Like),
    /// The (artifact, email) pair was already in the ledger; nothing changed.
    AlreadyLiked,
}

/// How many documents a cascading artifact delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub artifacts_deleted: u64,
    pub likes_deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_fields_missing_from_patch() {
        let mut fields = ArtifactFields {
            name: Some("Bronze Sword".to_string()),
            present_location: Some("British Museum".to_string()),
            ..Default::default()
        };

        fields.merge(ArtifactFields {
            name: Some("Iron Sword".to_string()),
            ..Default::default()
        });

        assert_eq!(fields.name.as_deref(), Some("Iron Sword"));
        assert_eq!(fields.present_location.as_deref(), Some("British Museum"));
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ArtifactFields::default().is_empty());
        let patch = ArtifactFields {
            image: Some("https://img".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
