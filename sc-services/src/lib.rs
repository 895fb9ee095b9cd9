//! Showcase Services - the data-access layer consumed by the public site
//! and the admin tools.
//!
//! This crate provides:
//! - Backend traits (record store, object store, identity provider) that
//!   the HTTP client implements and tests replace with in-memory fakes
//! - `DataService`, the only entry point for reads, writes, uploads and
//!   sessions
//! - Auth event bus and subscription handles
//! - Reconciliation log for half-finished two-step media operations
//! - Session persistence for command-line use
//! - Service lifecycle trait

pub mod service;
pub mod backend;
pub mod remote;
pub mod event_bus;
pub mod reconcile;
pub mod session_store;
pub mod data_service;
pub mod offerings;
pub mod media;
pub mod contact;
pub mod auth;

// Re-export key types
pub use service::{Service, ServiceState};
pub use backend::{Backends, IdentityProvider, ObjectStore, RecordStore};
pub use event_bus::{AuthEvent, AuthEventBus, AuthEventKind, AuthSubscription};
pub use reconcile::{ReconciliationEntry, ReconciliationLog, ReconciliationRecord};
pub use session_store::SessionFile;
pub use data_service::{DataService, ServiceOptions};
