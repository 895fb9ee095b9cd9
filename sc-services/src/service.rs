//! Service trait and lifecycle state.
//!
//! Long-lived services implement `Service` so owners can start background
//! work once and release it deterministically on teardown.

use sc_core::error::ScResult;

/// Lifecycle state of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Service has been created but not initialized.
    Created,
    /// Service is running and ready.
    Running,
    /// Service has been stopped.
    Stopped,
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Standard lifecycle and health-checking interface.
pub trait Service: Send + Sync {
    /// Human-readable name of this service.
    fn name(&self) -> &str;

    /// Current state of this service.
    fn state(&self) -> ServiceState;

    /// Start background work. Called once by the owner.
    fn init(&mut self) -> ScResult<()>;

    /// Release background work. Safe to call more than once.
    fn shutdown(&mut self) -> ScResult<()>;

    /// Health check. Returns true if the service is operational.
    fn is_healthy(&self) -> bool {
        self.state() == ServiceState::Running
    }
}
