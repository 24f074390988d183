//! services/api/src/bin/openapi.rs
//!
//! Writes the catalog's OpenAPI document so frontends can generate clients
//! without starting the server. Usage: `openapi [OUTPUT]` (default
//! `openapi.json`).

use api_lib::{error::ApiError, web::rest};

fn main() -> Result<(), ApiError> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());

    let document = rest::openapi_json()
        .map_err(|e| ApiError::Internal(format!("could not render the OpenAPI document: {e}")))?;
    std::fs::write(&output, document)?;

    eprintln!("wrote {output}");
    Ok(())
}
