//! Showcase API - HTTP client for the hosted backend.
//!
//! This crate provides a typed client over the three surfaces the site
//! uses: relational rows (`/rest/v1`), object storage (`/storage/v1`) and
//! password sessions (`/auth/v1`). It injects the project key and bearer
//! token, applies per-request timeouts and turns error bodies into
//! `ScError` values. There is no retry: a failed call fails once.

pub mod client;
pub mod endpoints;
pub mod response;

// Re-export key types
pub use client::{ApiClient, Surface};
pub use endpoints::rest::{Returning, SortOrder};
pub use response::ApiErrorBody;
