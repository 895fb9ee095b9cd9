//! `DataService`: the single entry point for reads, writes, uploads and
//! sessions.
//!
//! A `DataService` is built explicitly from injected backends; there is no
//! process-wide client. Operations are split by area across `offerings`,
//! `media`, `contact` and `auth`.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use sc_api::ApiClient;
use sc_core::config::{AppConfig, CollectionsConfig};
use sc_core::constants::{DEFAULT_API_TIMEOUT_MS, DEFAULT_UPLOAD_TIMEOUT_MS};
use sc_core::error::{ScError, ScResult};

use crate::auth::AuthCore;
use crate::backend::Backends;
use crate::event_bus::AuthEventBus;
use crate::reconcile::ReconciliationLog;
use crate::service::{Service, ServiceState};

const DEFAULT_EVENT_CAPACITY: usize = 64;
const DEFAULT_REFRESH_MARGIN_SECS: u64 = 60;

/// Tunables for a `DataService`.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub collections: CollectionsConfig,
    /// Upper bound on every backend call except object uploads.
    pub op_timeout: Duration,
    pub upload_timeout: Duration,
    /// Start the session watcher on `init`.
    pub auto_refresh: bool,
    /// How long before expiry the watcher refreshes.
    pub refresh_margin: Duration,
    pub event_capacity: usize,
}

impl ServiceOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            collections: config.collections.clone(),
            op_timeout: Duration::from_millis(config.backend.api_timeout_ms),
            upload_timeout: Duration::from_millis(config.backend.upload_timeout_ms),
            auto_refresh: config.auth.auto_refresh,
            refresh_margin: Duration::from_secs(config.auth.refresh_margin_secs),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            collections: CollectionsConfig::default(),
            op_timeout: Duration::from_millis(DEFAULT_API_TIMEOUT_MS),
            upload_timeout: Duration::from_millis(DEFAULT_UPLOAD_TIMEOUT_MS),
            auto_refresh: true,
            refresh_margin: Duration::from_secs(DEFAULT_REFRESH_MARGIN_SECS),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Data access for the public site and the admin tools.
pub struct DataService {
    pub(crate) backends: Backends,
    pub(crate) collections: CollectionsConfig,
    pub(crate) op_timeout: Duration,
    pub(crate) upload_timeout: Duration,
    pub(crate) auth: AuthCore,
    pub(crate) reconciliation: ReconciliationLog,
    auto_refresh: bool,
    refresh_margin: Duration,
    state: ServiceState,
    watcher: Option<JoinHandle<()>>,
}

impl DataService {
    pub fn new(backends: Backends, options: ServiceOptions) -> Self {
        let events = AuthEventBus::new(options.event_capacity);
        let auth = AuthCore::new(backends.identity.clone(), events, options.op_timeout);
        Self {
            backends,
            collections: options.collections,
            op_timeout: options.op_timeout,
            upload_timeout: options.upload_timeout,
            auth,
            reconciliation: ReconciliationLog::new(),
            auto_refresh: options.auto_refresh,
            refresh_margin: options.refresh_margin,
            state: ServiceState::Created,
            watcher: None,
        }
    }

    /// Build a service talking to the configured backend over HTTP.
    pub fn from_config(config: &AppConfig) -> ScResult<Self> {
        config.require_backend()?;
        let api = ApiClient::new(&config.backend)?;
        info!("data service targeting {}", api.base_url());
        Ok(Self::new(Backends::remote(api), ServiceOptions::from_config(config)))
    }

    pub fn collections(&self) -> &CollectionsConfig {
        &self.collections
    }

    /// Entries left behind by media operations that failed halfway.
    pub fn reconciliation(&self) -> &ReconciliationLog {
        &self.reconciliation
    }

    /// Start the background refresh of the active session.
    ///
    /// Returns false when there is no tokio runtime to run it on or a
    /// watcher is already running.
    pub fn start_session_watch(&mut self) -> bool {
        if self.watcher.as_ref().map_or(false, |task| !task.is_finished()) {
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime, session watcher not started");
            return false;
        };
        let core = self.auth.clone();
        let margin = self.refresh_margin;
        self.watcher = Some(runtime.spawn(async move { core.watch(margin).await }));
        debug!("session watcher started");
        true
    }

    fn stop_session_watch(&mut self) {
        if let Some(task) = self.watcher.take() {
            task.abort();
            debug!("session watcher stopped");
        }
    }

    /// Bearer token for the next call: the session's access token, if any,
    /// refreshed first when it has expired.
    pub(crate) async fn bearer(&self) -> Option<String> {
        self.auth.access_token().await
    }
}

impl Service for DataService {
    fn name(&self) -> &str {
        "data"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> ScResult<()> {
        if self.auto_refresh {
            self.start_session_watch();
        }
        self.state = ServiceState::Running;
        Ok(())
    }

    fn shutdown(&mut self) -> ScResult<()> {
        self.stop_session_watch();
        self.state = ServiceState::Stopped;
        Ok(())
    }
}

impl Drop for DataService {
    fn drop(&mut self) {
        self.stop_session_watch();
    }
}

/// Run a backend call under `limit`, mapping expiry to `ScError::Timeout`.
pub(crate) async fn bounded<T, F>(limit: Duration, label: &str, call: F) -> ScResult<T>
where
    F: Future<Output = ScResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ScError::Timeout(format!(
            "{label} did not finish within {}ms",
            limit.as_millis()
        ))),
    }
}

/// Stable sort, newest first.
pub(crate) fn sort_newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

/// Reject blank identifiers before they reach a filter.
pub(crate) fn require_id(id: &str) -> ScResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ScError::Validation("id is required".into()));
    }
    Ok(id)
}
