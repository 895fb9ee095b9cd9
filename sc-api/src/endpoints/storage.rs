//! Object storage endpoints (`/storage/v1/object`).

use reqwest::Method;
use sc_core::error::{ScError, ScResult};

use crate::client::{ApiClient, Surface};

impl ApiClient {
    /// Upload `bytes` to `bucket/key`. Fails if the key already exists.
    /// Uses the upload timeout.
    pub async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        bearer: Option<&str>,
    ) -> ScResult<()> {
        let size = bytes.len();
        let builder = self
            .request(
                Method::POST,
                Surface::Storage,
                &format!("/object/{bucket}/{key}"),
                bearer,
            )
            .timeout(self.upload_timeout())
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes);
        let label = format!("POST storage/{bucket}/{key} ({size} bytes)");
        self.send(Surface::Storage, builder, &label)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    /// Public URL under which `bucket/key` is served.
    pub fn public_object_url(&self, bucket: &str, key: &str) -> String {
        self.url(Surface::Storage, &format!("/object/public/{bucket}/{key}"))
    }

    /// Remove objects by key. Keys that do not exist are ignored by the
    /// backend; the returned list holds the objects actually removed.
    pub async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
        bearer: Option<&str>,
    ) -> ScResult<Vec<serde_json::Value>> {
        let body = serde_json::json!({ "prefixes": keys });
        let builder = self
            .request(Method::DELETE, Surface::Storage, &format!("/object/{bucket}"), bearer)
            .json(&body);
        let resp = self
            .send(Surface::Storage, builder, &format!("DELETE storage/{bucket} {keys:?}"))
            .await
            .map_err(storage_error)?;
        ApiClient::parse_json(resp).await
    }
}

/// Storage rejections are reported as `Storage` so callers can tell the
/// object step of a two-step operation from the row step.
fn storage_error(e: ScError) -> ScError {
    match e {
        ScError::ServerError { status, message } | ScError::Forbidden { status, message } => {
            ScError::Storage(format!("status {status}: {message}"))
        }
        other => other,
    }
}
