//! services/api/src/web/extract.rs
//!
//! Request extractors that report failures with the same JSON error body as
//! every other rejection in the API.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// `axum::Json`, except that a missing content type, malformed JSON or a
/// field of the wrong type answers 400 with `{status:false, message}`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
