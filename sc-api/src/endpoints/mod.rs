//! API endpoint modules organized by backend surface.
//!
//! Each module adds typed methods to `ApiClient` for one surface.

pub mod rest;
pub mod storage;
pub mod auth;
