//! Showcase Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other Showcase crates:
//! - Application configuration (backend endpoint, anon key, collection names)
//! - Global error type and its store/auth classification
//! - Structured logging with tracing
//! - Platform directory lookup
//! - Common constants

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{ErrorKind, ScError, ScResult};
pub use logging::init_logging;
pub use platform::Platform;
