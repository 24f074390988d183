//! crates/wandau_core/src/guard.rs
//!
//! Ownership checks applied before any user-scoped operation.

use crate::error::{CatalogError, CatalogResult};
use crate::token::{SessionClaims, TokenCodec};

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    claims: SessionClaims,
}

impl Identity {
    pub fn new(claims: SessionClaims) -> Self {
        Self { claims }
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    /// Fails with `Forbidden` unless this identity is `owner`.
    pub fn ensure_owns(&self, owner: &str) -> CatalogResult<()> {
        if same_email(self.email(), owner) {
            Ok(())
        } else {
            Err(CatalogError::Forbidden)
        }
    }
}

/// Resolves the caller from the raw credential found on a request.
///
/// `None` means the request carried no credential at all.
pub fn authenticate(codec: &TokenCodec, token: Option<&str>) -> CatalogResult<Identity> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| CatalogError::Unauthenticated("Unauthorized Access!".to_string()))?;
    let claims = codec
        .verify(token)
        .map_err(|e| CatalogError::Unauthenticated(e.to_string()))?;
    Ok(Identity::new(claims))
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}
