//! crates/wandau_core/src/error.rs
//!
//! The error taxonomy shared by the catalog services.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No credential, or one that failed verification.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but not the owner of the target resource.
    #[error("Forbidden Access!")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadInput(String),

    /// Any failure of the underlying store.
    #[error("Store failure: {0}")]
    Store(#[source] PortError),
}

impl From<PortError> for CatalogError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => CatalogError::NotFound(what),
            other => CatalogError::Store(other),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
