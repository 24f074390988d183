//! crates/wandau_core/src/token.rs
//!
//! Session tokens signed with HMAC-SHA256.
//!
//! Tokens use the compact JWT layout so any HS256-aware client can inspect
//! them:
//!
//! ```text
//! base64url(header) "." base64url(payload) "." base64url(signature)
//! ```
//!
//! The payload is a JSON object holding the caller-supplied claims, the
//! `email` the token vouches for, and `iat`/`exp` in Unix seconds. Nothing is
//! stored server-side; expiry is the only invalidation mechanism.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
const RESERVED_CLAIMS: [&str; 3] = ["email", "iat", "exp"];

/// Reasons a token is rejected. The messages are shown to API clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("jwt malformed")]
    Malformed,
    #[error("invalid algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("jwt expired")]
    Expired,
    #[error("token signing secret must not be empty")]
    EmptySecret,
    #[error("failed to encode token payload: {0}")]
    Encoding(String),
}

/// The identity claims carried by a session token.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims {
    pub email: String,
    /// Any other fields the client sent when the token was minted.
    pub extra: Map<String, Value>,
}

impl SessionClaims {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Issues and verifies session tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec keyed with `secret`.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::EmptySecret)?;
        Ok(Self { mac })
    }

    /// Issues a token for `claims` that expires `ttl` from now.
    pub fn issue(&self, claims: &SessionClaims, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        claims: &SessionClaims,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let mut payload: Map<String, Value> = claims
            .extra
            .iter()
            .filter(|(key, _)| !RESERVED_CLAIMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        payload.insert("email".to_string(), Value::String(claims.email.clone()));
        payload.insert("iat".to_string(), Value::from(now.timestamp()));
        payload.insert("exp".to_string(), Value::from((now + ttl).timestamp()));

        let payload_json =
            serde_json::to_vec(&payload).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER_JSON),
            URL_SAFE_NO_PAD.encode(payload_json)
        );
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verifies `token` and returns the claims it carries.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| TokenError::Malformed)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
        if header.alg != "HS256" {
            return Err(TokenError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| TokenError::InvalidSignature)?;
        let signing_input_len = header_b64.len() + 1 + payload_b64.len();
        let mut mac = self.mac.clone();
        mac.update(&token.as_bytes()[..signing_input_len]);
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let mut payload: Map<String, Value> =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

        let exp = payload
            .remove("exp")
            .and_then(|v| v.as_i64())
            .ok_or(TokenError::Malformed)?;
        if now.timestamp() >= exp {
            return Err(TokenError::Expired);
        }
        payload.remove("iat");

        let email = match payload.remove("email") {
            Some(Value::String(email)) => email,
            _ => return Err(TokenError::Malformed),
        };

        Ok(SessionClaims {
            email,
            extra: payload,
        })
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}
