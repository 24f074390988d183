//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every request.

use crate::config::Config;
use std::sync::Arc;
use wandau_core::{ArtifactCatalog, CatalogStore, LikeLedger, TokenCodec, TokenError};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub tokens: TokenCodec,
    pub artifacts: ArtifactCatalog,
    pub likes: LikeLedger,
}

impl AppState {
    /// Wires the catalog services to `store` and keys the token codec with the
    /// configured secret.
    pub fn new(config: Arc<Config>, store: Arc<dyn CatalogStore>) -> Result<Self, TokenError> {
        let tokens = TokenCodec::new(config.token_secret.as_bytes())?;
        let artifacts = ArtifactCatalog::new(store.clone()).with_featured_limit(config.featured_limit);
        let likes = LikeLedger::new(store);
        Ok(Self {
            config,
            tokens,
            artifacts,
            likes,
        })
    }
}
