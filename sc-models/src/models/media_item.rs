//! Gallery media item model.

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;
use sc_core::error::{ScError, ScResult};

use super::{opaque_id, optional_text, timestamp};

/// A gallery image record pointing at a stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    /// Public URL of the stored object, stored as `image_url`.
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

impl MediaItem {
    /// Create a MediaItem from a REST row. The image URL is required.
    pub fn from_server_map(map: &serde_json::Value) -> ScResult<Self> {
        let image_ref = optional_text(map, "image_url")
            .ok_or_else(|| ScError::Serialization("gallery row has no image_url".into()))?;
        Ok(Self {
            id: opaque_id(map)?,
            image_ref,
            created_at: timestamp(map, "created_at")?,
        })
    }

    /// Row body inserted after the object upload succeeds.
    pub fn new_row(image_ref: &str) -> serde_json::Value {
        serde_json::json!({ "image_url": image_ref })
    }

    /// Storage key of the backing object (last path segment of the URL).
    pub fn storage_key(&self) -> Option<String> {
        storage_key_from_ref(&self.image_ref)
    }
}

/// Derive an object key from a public URL: the last path segment, with
/// query string and fragment removed and percent-escapes decoded. Input
/// that is not an absolute URL is treated as a bare key.
pub fn storage_key_from_ref(image_ref: &str) -> Option<String> {
    let image_ref = image_ref.trim();
    let segment = match Url::parse(image_ref) {
        Ok(url) => url.path_segments()?.filter(|s| !s.is_empty()).last()?.to_string(),
        Err(_) => {
            let key = image_ref.split(|c| c == '?' || c == '#').next().unwrap_or_default();
            let segment = key.trim_end_matches('/').rsplit('/').next()?;
            if segment.contains(':') {
                return None;
            }
            segment.to_string()
        }
    };
    if segment.is_empty() {
        return None;
    }
    percent_decode_str(&segment)
        .decode_utf8()
        .ok()
        .map(|key| key.into_owned())
}
