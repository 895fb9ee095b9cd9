//! Reconciliation log for half-finished media operations.
//!
//! Uploading and deleting a media item each touch two stores. When the
//! second step fails and cannot be undone, the leftover is recorded here so
//! an operator can clean it up by hand.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::warn;

/// A cross-store inconsistency left behind by a failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationEntry {
    /// Stored object with no record pointing at it.
    OrphanedObject {
        bucket: String,
        key: String,
        reason: String,
    },
    /// Kept object whose record insert timed out; the record may or may
    /// not exist.
    UnconfirmedRecord {
        table: String,
        bucket: String,
        key: String,
        image_ref: String,
        reason: String,
    },
    /// Record whose object has already been removed.
    DanglingRecord {
        table: String,
        id: String,
        image_ref: String,
        reason: String,
    },
}

impl std::fmt::Display for ReconciliationEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanedObject { bucket, key, reason } => {
                write!(f, "orphaned object {bucket}/{key} ({reason})")
            }
            Self::UnconfirmedRecord {
                table,
                bucket,
                key,
                image_ref,
                reason,
            } => write!(
                f,
                "unconfirmed record in {table} for {bucket}/{key} -> {image_ref} ({reason})"
            ),
            Self::DanglingRecord {
                table,
                id,
                image_ref,
                reason,
            } => write!(f, "dangling record {table}#{id} -> {image_ref} ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRecord {
    pub recorded_at: DateTime<Utc>,
    pub entry: ReconciliationEntry,
}

/// Shared, in-memory list of pending reconciliation entries.
#[derive(Clone, Default)]
pub struct ReconciliationLog {
    entries: Arc<Mutex<Vec<ReconciliationRecord>>>,
}

impl ReconciliationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry and log it at warn level.
    pub fn record(&self, entry: ReconciliationEntry) {
        warn!("needs reconciliation: {entry}");
        self.lock().push(ReconciliationRecord {
            recorded_at: Utc::now(),
            entry,
        });
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn pending(&self) -> Vec<ReconciliationRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all entries, returning them.
    pub fn clear(&self) -> Vec<ReconciliationRecord> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReconciliationRecord>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ReconciliationLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationLog")
            .field("pending", &self.len())
            .finish()
    }
}
