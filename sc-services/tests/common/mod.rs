//! Shared test utilities for integration tests.
//!
//! In-memory stand-ins for the record store, object store and identity
//! provider, each with switches to make individual calls fail.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use sc_api::{Returning, SortOrder};
use sc_core::config::CollectionsConfig;
use sc_core::error::{ScError, ScResult};
use sc_models::{Session, User};
use sc_services::{Backends, DataService, IdentityProvider, ObjectStore, RecordStore, ServiceOptions};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";
pub const ADMIN_ID: &str = "6f1c2b7e-admin";
pub const PUBLIC_BASE: &str = "https://test.local/storage/v1/object/public";

/// Await `condition` for up to a second; callbacks run on their own task.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

// ---- Record store ----

/// Rows per table. Ids are numeric, timestamps strictly increasing.
#[derive(Default)]
pub struct MemoryRecords {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicU64,
    pub fail_select: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Every call sleeps this long first (milliseconds).
    pub delay_ms: AtomicU64,
    /// Inserts commit, then sleep this long before answering (milliseconds).
    pub stall_after_insert_ms: AtomicU64,
    /// Writes are refused by the table's row-level access rules.
    pub deny_writes: AtomicBool,
    pub last_order: Mutex<Option<(String, SortOrder)>>,
    pub bearers: Mutex<Vec<Option<String>>>,
}

impl MemoryRecords {
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Insert a row directly, bypassing the service.
    pub fn seed(&self, table: &str, mut row: Value, created_at: DateTime<Utc>) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        row["id"] = json!(id);
        row["created_at"] = json!(created_at.to_rfc3339());
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row);
        id.to_string()
    }

    async fn enter(&self, flag: &AtomicBool, what: &str, bearer: Option<&str>) -> ScResult<()> {
        self.bearers.lock().unwrap().push(bearer.map(String::from));
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if flag.load(Ordering::SeqCst) {
            return Err(ScError::ServerError {
                status: 500,
                message: format!("{what} failed"),
            });
        }
        Ok(())
    }

    fn check_write_access(&self) -> ScResult<()> {
        if self.deny_writes.load(Ordering::SeqCst) {
            return Err(ScError::Forbidden {
                status: 403,
                message: "new row violates row-level security policy [42501]".into(),
            });
        }
        Ok(())
    }

    fn next_timestamp(&self, id: u64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + id as i64, 0).unwrap()
    }
}

fn id_matches(row: &Value, id: &str) -> bool {
    match &row["id"] {
        Value::Number(n) => n.to_string() == id,
        Value::String(s) => s == id,
        _ => false,
    }
}

#[async_trait]
impl RecordStore for MemoryRecords {
    async fn select(
        &self,
        table: &str,
        order_by: &str,
        order: SortOrder,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>> {
        self.enter(&self.fail_select, "select", bearer).await?;
        *self.last_order.lock().unwrap() = Some((order_by.to_string(), order));
        // Insertion order; callers must sort.
        Ok(self.rows(table))
    }

    async fn insert(
        &self,
        table: &str,
        mut row: Value,
        returning: Returning,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>> {
        self.enter(&self.fail_insert, "insert", bearer).await?;
        self.check_write_access()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        row["id"] = json!(id);
        row["created_at"] = json!(self.next_timestamp(id).to_rfc3339());
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        let stall = self.stall_after_insert_ms.load(Ordering::SeqCst);
        if stall > 0 {
            tokio::time::sleep(Duration::from_millis(stall)).await;
        }
        match returning {
            Returning::Representation => Ok(vec![row]),
            Returning::Minimal => Ok(Vec::new()),
        }
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        bearer: Option<&str>,
    ) -> ScResult<Vec<Value>> {
        self.enter(&self.fail_update, "update", bearer).await?;
        self.check_write_access()?;
        let mut tables = self.tables.lock().unwrap();
        let mut updated = Vec::new();
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if id_matches(row, id) {
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str, bearer: Option<&str>) -> ScResult<Vec<Value>> {
        self.enter(&self.fail_delete, "delete", bearer).await?;
        self.check_write_access()?;
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| id_matches(row, id));
        *rows = kept;
        Ok(removed)
    }
}

// ---- Object store ----

#[derive(Default)]
pub struct MemoryObjects {
    objects: Mutex<HashMap<(String, String), (Vec<u8>, String)>>,
    pub fail_put: AtomicBool,
    pub fail_remove: AtomicBool,
}

impl MemoryObjects {
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn put_direct(&self, bucket: &str, key: &str, bytes: &[u8]) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            (bytes.to_vec(), "application/octet-stream".into()),
        );
    }
}

#[async_trait]
impl ObjectStore for MemoryObjects {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        _bearer: Option<&str>,
    ) -> ScResult<()> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(ScError::Storage("upload rejected".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        let slot = (bucket.to_string(), key.to_string());
        if objects.contains_key(&slot) {
            return Err(ScError::Storage("The resource already exists".into()));
        }
        objects.insert(slot, (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("{PUBLIC_BASE}/{bucket}/{key}")
    }

    async fn remove_objects(
        &self,
        bucket: &str,
        keys: &[String],
        _bearer: Option<&str>,
    ) -> ScResult<()> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(ScError::Storage("remove rejected".into()));
        }
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }
}

// ---- Identity provider ----

pub struct MemoryIdentity {
    access_tokens: Mutex<HashSet<String>>,
    refresh_tokens: Mutex<HashSet<String>>,
    counter: AtomicU64,
    /// Lifetime of issued sessions, in seconds. May be negative.
    pub ttl_secs: Mutex<i64>,
    pub fail_sign_out: AtomicBool,
    pub fail_get_user: AtomicBool,
    pub sign_out_calls: AtomicU64,
    pub refresh_calls: AtomicU64,
}

impl Default for MemoryIdentity {
    fn default() -> Self {
        Self {
            access_tokens: Mutex::new(HashSet::new()),
            refresh_tokens: Mutex::new(HashSet::new()),
            counter: AtomicU64::new(0),
            ttl_secs: Mutex::new(3600),
            fail_sign_out: AtomicBool::new(false),
            fail_get_user: AtomicBool::new(false),
            sign_out_calls: AtomicU64::new(0),
            refresh_calls: AtomicU64::new(0),
        }
    }
}

impl MemoryIdentity {
    /// Forget every issued token, as a server-side revocation would.
    pub fn revoke_all(&self) {
        self.access_tokens.lock().unwrap().clear();
        self.refresh_tokens.lock().unwrap().clear();
    }

    pub fn is_access_token_valid(&self, token: &str) -> bool {
        self.access_tokens.lock().unwrap().contains(token)
    }

    fn issue(&self) -> Session {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{n}");
        let refresh = format!("refresh-{n}");
        self.access_tokens.lock().unwrap().insert(access.clone());
        self.refresh_tokens.lock().unwrap().insert(refresh.clone());
        let ttl = *self.ttl_secs.lock().unwrap();
        Session {
            access_token: access,
            refresh_token: refresh,
            token_type: "bearer".into(),
            expires_at: Some(Utc::now() + chrono::Duration::seconds(ttl)),
            user: admin_user(),
        }
    }
}

pub fn admin_user() -> User {
    User {
        id: ADMIN_ID.into(),
        email: Some(ADMIN_EMAIL.into()),
        role: Some("authenticated".into()),
        last_sign_in_at: None,
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> ScResult<Session> {
        if email == ADMIN_EMAIL && password == ADMIN_PASSWORD {
            Ok(self.issue())
        } else {
            Err(ScError::AuthFailed("Invalid login credentials".into()))
        }
    }

    async fn sign_out(&self, access_token: &str) -> ScResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ScError::Http("connection reset".into()));
        }
        self.access_tokens.lock().unwrap().remove(access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> ScResult<Option<User>> {
        if self.fail_get_user.load(Ordering::SeqCst) {
            return Err(ScError::Http("connection reset".into()));
        }
        if self.is_access_token_valid(access_token) {
            Ok(Some(admin_user()))
        } else {
            Ok(None)
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> ScResult<Session> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        if !self.refresh_tokens.lock().unwrap().remove(refresh_token) {
            return Err(ScError::AuthFailed("Invalid Refresh Token".into()));
        }
        Ok(self.issue())
    }
}

// ---- Harness ----

/// One set of fakes and the handles needed to inspect them.
pub struct TestBackend {
    pub records: Arc<MemoryRecords>,
    pub objects: Arc<MemoryObjects>,
    pub identity: Arc<MemoryIdentity>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self {
            records: Arc::new(MemoryRecords::default()),
            objects: Arc::new(MemoryObjects::default()),
            identity: Arc::new(MemoryIdentity::default()),
        }
    }

    pub fn backends(&self) -> Backends {
        Backends::new(self.records.clone(), self.objects.clone(), self.identity.clone())
    }

    /// A service over these fakes with a short operation timeout and no
    /// background watcher.
    pub fn service(&self) -> DataService {
        DataService::new(self.backends(), test_options())
    }

    pub fn service_with(&self, options: ServiceOptions) -> DataService {
        DataService::new(self.backends(), options)
    }
}

pub fn test_options() -> ServiceOptions {
    ServiceOptions {
        collections: CollectionsConfig::default(),
        op_timeout: Duration::from_millis(500),
        upload_timeout: Duration::from_millis(500),
        auto_refresh: false,
        refresh_margin: Duration::from_secs(60),
        event_capacity: 32,
    }
}
