//! Backend traits.
//!
//! `DataService` reaches the record store, the object store and the
//! identity provider only through these traits. The HTTP client implements
//! all three (see `remote`); tests supply in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use sc_api::{Returning, SortOrder};
use sc_core::error::ScResult;
use sc_models::{Session, User};

/// Row-level access to named collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every row of `table`, ordered by `order_by`.
    async fn select(
        &self,
        table: &str,
        order_by: &str,
        order: SortOrder,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>>;

    /// Insert one row; returns the stored row unless `returning` is minimal.
    async fn insert(
        &self,
        table: &str,
        row: Value,
        returning: Returning,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>>;

    /// Patch the row with this id; returns the rows matched (possibly none).
    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>>;

    /// Delete the row with this id; returns the rows removed (possibly none).
    async fn delete(&self, table: &str, id: &str, bearer: Option<&str>) -> ScResult<Vec<Value>>;
}

/// Binary objects in named buckets.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        bearer: Option<&str>,
    ) -> ScResult<()>;

    /// Public URL for a stored object. No network call.
    fn public_url(&self, bucket: &str, key: &str) -> String;

    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
        bearer: Option<&str>,
    ) -> ScResult<()>;
}

/// Password-based session issuance.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ScResult<Session>;

    /// Revoke the session behind the token.
    async fn sign_out(&self, access_token: &str) -> ScResult<()>;

    /// User behind the token; `Ok(None)` when the token is rejected.
    async fn get_user(&self, access_token: &str) -> ScResult<Option<User>>;

    async fn refresh_session(&self, refresh_token: &str) -> ScResult<Session>;
}

/// The three backends a `DataService` is built from.
#[derive(Clone)]
pub struct Backends {
    pub records: Arc<dyn RecordStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backends {
    pub fn new(
        records: Arc<dyn RecordStore>,
        objects: Arc<dyn ObjectStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            records,
            objects,
            identity,
        }
    }
}
