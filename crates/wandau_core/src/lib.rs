pub mod catalog;
pub mod domain;
pub mod error;
pub mod guard;
pub mod memory;
pub mod ports;
pub mod token;

pub use catalog::{ArtifactCatalog, LikeLedger, DEFAULT_FEATURED_LIMIT, NO_SEARCH_VALUE};
pub use domain::{Artifact, ArtifactFields, DeleteSummary, Like, LikeOutcome, NewArtifact, NewLike};
pub use error::{CatalogError, CatalogResult};
pub use guard::{authenticate, Identity};
pub use memory::InMemoryCatalogStore;
pub use ports::{CatalogStore, PortError, PortResult};
pub use token::{SessionClaims, TokenCodec, TokenError};
