//! services/api/src/lib.rs
//!
//! HTTP service for the artifact catalog: configuration, the PostgreSQL store
//! adapter, and the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
