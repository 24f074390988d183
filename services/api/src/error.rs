//! services/api/src/error.rs
//!
//! Defines the startup error type for the API service and the mapping of
//! catalog errors onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};
use wandau_core::{CatalogError, TokenError};

use crate::config::ConfigError;

/// The primary error type for starting and running the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The token signing secret could not be used.
    #[error("Token codec error: {0}")]
    Token(#[from] TokenError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the schema migrations failed.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

//=========================================================================================
// HTTP Error Responses
//=========================================================================================

/// JSON body of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub status: bool,
    pub message: String,
}

/// A catalog error on its way out of a handler.
#[derive(Debug)]
pub struct HttpError(pub CatalogError);

impl From<CatalogError> for HttpError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(CatalogError::BadInput(message.into()))
    }

    fn status(&self) -> StatusCode {
        match &self.0 {
            CatalogError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            CatalogError::Forbidden => StatusCode::FORBIDDEN,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::BadInput(_) => StatusCode::BAD_REQUEST,
            CatalogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            CatalogError::Store(detail) => {
                // Do not leak store details to clients.
                error!(error = %detail, "store failure");
                "Internal server error".to_string()
            }
            other => {
                debug!(error = %other, status = %status, "request rejected");
                other.to_string()
            }
        };
        (
            status,
            Json(ErrorBody {
                status: false,
                message,
            }),
        )
            .into_response()
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
