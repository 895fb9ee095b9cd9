//! Gallery media: listing, upload and deletion.
//!
//! Upload and delete each span the object store and the record store. Each
//! runs its steps in a fixed order and undoes the first step when the second
//! fails; a leftover that cannot be undone goes to the reconciliation log.

use std::path::Path;

use tracing::{debug, info, warn};
use uuid::Uuid;

use sc_api::{Returning, SortOrder};
use sc_core::constants::{content_type_for_extension, CREATED_AT_COLUMN};
use sc_core::error::{ScError, ScResult};
use sc_models::models::media_item::storage_key_from_ref;
use sc_models::MediaItem;

use crate::data_service::{bounded, require_id, sort_newest_first, DataService};
use crate::reconcile::ReconciliationEntry;

const FALLBACK_EXTENSION: &str = "bin";

impl DataService {
    /// All media items, newest first.
    pub async fn list_media_items(&self) -> ScResult<Vec<MediaItem>> {
        let bearer = self.bearer().await;
        let rows = bounded(
            self.op_timeout,
            "list media items",
            self.backends.records.select(
                &self.collections.media_items,
                CREATED_AT_COLUMN,
                SortOrder::Descending,
                bearer.as_deref(),
            ),
        )
        .await?;

        let mut items = rows
            .iter()
            .map(MediaItem::from_server_map)
            .collect::<ScResult<Vec<_>>>()?;
        sort_newest_first(&mut items, |item| item.created_at);
        debug!("listed {} media items", items.len());
        Ok(items)
    }

    /// Store `content` under a fresh key and record it in the gallery.
    ///
    /// The object is written before the record. If the record insert fails
    /// the object is removed again. If the insert times out its outcome is
    /// unknown, so the object is kept and the upload is logged for
    /// reconciliation.
    pub async fn upload_media_item(&self, content: Vec<u8>, file_name_hint: &str) -> ScResult<MediaItem> {
        if content.is_empty() {
            return Err(ScError::Validation("media content is empty".into()));
        }

        let extension = storage_extension(file_name_hint);
        let key = format!("{}.{}", Uuid::new_v4().simple(), extension);
        let content_type = content_type_for_extension(&extension);
        let bucket = &self.collections.media_bucket;
        let bearer = self.bearer().await;

        debug!("uploading {} bytes to {bucket}/{key} as {content_type}", content.len());
        bounded(
            self.upload_timeout,
            "upload object",
            self.backends
                .objects
                .put_object(bucket, &key, content, content_type, bearer.as_deref()),
        )
        .await?;

        let image_ref = self.backends.objects.public_url(bucket, &key);
        let inserted = bounded(
            self.op_timeout,
            "insert media item",
            self.backends.records.insert(
                &self.collections.media_items,
                MediaItem::new_row(&image_ref),
                Returning::Representation,
                bearer.as_deref(),
            ),
        )
        .await;

        let rows = match inserted {
            Ok(rows) => rows,
            Err(e @ ScError::Timeout(_)) => {
                // The insert may still have committed; the object stays.
                self.reconciliation.record(ReconciliationEntry::UnconfirmedRecord {
                    table: self.collections.media_items.clone(),
                    bucket: bucket.clone(),
                    key,
                    image_ref,
                    reason: e.to_string(),
                });
                return Err(e);
            }
            Err(e) => {
                warn!("media record insert failed, removing {bucket}/{key}: {e}");
                self.remove_uploaded_object(&key, &e, bearer.as_deref()).await;
                return Err(e);
            }
        };

        let row = rows
            .first()
            .ok_or_else(|| ScError::Internal("insert returned no media item".into()))?;
        let item = MediaItem::from_server_map(row)?;
        info!("uploaded media item {} ({key})", item.id);
        Ok(item)
    }

    /// Delete media item `id` and the object behind `image_ref`.
    ///
    /// The object goes first; if that fails the record is left alone. Once
    /// the object is gone, a record delete that fails or matches nothing is
    /// logged for reconciliation.
    pub async fn delete_media_item(&self, id: &str, image_ref: &str) -> ScResult<()> {
        let id = require_id(id)?;
        let key = storage_key_from_ref(image_ref).ok_or_else(|| {
            ScError::Validation(format!("no storage key in image reference {image_ref:?}"))
        })?;
        let bucket = &self.collections.media_bucket;
        let table = &self.collections.media_items;
        let bearer = self.bearer().await;

        bounded(
            self.op_timeout,
            "remove object",
            self.backends
                .objects
                .remove_objects(bucket, std::slice::from_ref(&key), bearer.as_deref()),
        )
        .await?;

        let deleted = bounded(
            self.op_timeout,
            "delete media item",
            self.backends.records.delete(table, id, bearer.as_deref()),
        )
        .await;

        match deleted {
            Ok(rows) if rows.is_empty() => {
                self.reconciliation.record(ReconciliationEntry::DanglingRecord {
                    table: table.clone(),
                    id: id.to_string(),
                    image_ref: image_ref.to_string(),
                    reason: "object removed but no record matched the id".into(),
                });
                Err(ScError::NotFound(format!("media item {id}")))
            }
            Ok(_) => {
                info!("deleted media item {id} ({key})");
                Ok(())
            }
            Err(e) => {
                self.reconciliation.record(ReconciliationEntry::DanglingRecord {
                    table: table.clone(),
                    id: id.to_string(),
                    image_ref: image_ref.to_string(),
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Undo an upload whose record insert failed.
    async fn remove_uploaded_object(&self, key: &str, cause: &ScError, bearer: Option<&str>) {
        let bucket = &self.collections.media_bucket;
        let keys = [key.to_string()];
        let removed = bounded(
            self.op_timeout,
            "remove uploaded object",
            self.backends.objects.remove_objects(bucket, &keys, bearer),
        )
        .await;
        match removed {
            Ok(()) => debug!("removed {bucket}/{key} after failed insert"),
            Err(e) => self.reconciliation.record(ReconciliationEntry::OrphanedObject {
                bucket: bucket.clone(),
                key: key.to_string(),
                reason: format!("insert failed: {cause}; removal failed: {e}"),
            }),
        }
    }
}

/// Lower-cased extension of `file_name`, or `bin` when it has none usable.
fn storage_extension(file_name: &str) -> String {
    Path::new(file_name.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
