//! Backend traits implemented over the HTTP client.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use sc_api::{ApiClient, Returning, SortOrder};
use sc_core::error::ScResult;
use sc_models::{Session, User};

use crate::backend::{Backends, IdentityProvider, ObjectStore, RecordStore};

#[async_trait]
impl RecordStore for ApiClient {
    async fn select(
        &self,
        table: &str,
        order_by: &str,
        order: SortOrder,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>> {
        self.select_rows(table, order_by, order, bearer).await
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        returning: Returning,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>> {
        self.insert_row(table, &row, returning, bearer).await
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>> {
        self.update_rows_by_id(table, id, &patch, bearer).await
    }

    async fn delete(&self, table: &str, id: &str, bearer: Option<&str>) -> ScResult<Vec<Value>> {
        self.delete_rows_by_id(table, id, bearer).await
    }
}

#[async_trait]
impl ObjectStore for ApiClient {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        bearer: Option<&str>,
    ) -> ScResult<()> {
        self.upload_object(bucket, key, bytes, content_type, bearer).await
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        self.public_object_url(bucket, key)
    }

    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
        bearer: Option<&str>,
    ) -> ScResult<()> {
        ApiClient::remove_objects(self, bucket, keys, bearer).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for ApiClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ScResult<Session> {
        ApiClient::sign_in_with_password(self, email, password).await
    }

    async fn sign_out(&self, access_token: &str) -> ScResult<()> {
        ApiClient::sign_out(self, access_token).await
    }

    async fn get_user(&self, access_token: &str) -> ScResult<Option<User>> {
        ApiClient::get_user(self, access_token).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> ScResult<Session> {
        ApiClient::refresh_session(self, refresh_token).await
    }
}

impl Backends {
    /// All three backends served by one HTTP client.
    pub fn remote(api: ApiClient) -> Self {
        let api = Arc::new(api);
        Self::new(api.clone(), api.clone(), api)
    }
}
