//! Auth state event bus.
//!
//! Uses a tokio broadcast channel so the session owner can announce
//! transitions without knowing who is listening. Each subscription gets its
//! own delivery task; callbacks never run on the emitting task.

use std::sync::Arc;

use sc_models::Session;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Kind of session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    /// First delivery to every subscriber: the session at subscribe time.
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    /// The token was rejected or could not be refreshed.
    SessionExpired,
}

impl AuthEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialSession => "INITIAL_SESSION",
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::SessionExpired => "SESSION_EXPIRED",
        }
    }
}

impl std::fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition and the session after it (`None` once signed out or expired).
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    pub fn new(kind: AuthEventKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }
}

/// Fan-out bus for auth events: every subscriber gets every event.
///
/// A subscriber that falls more than `capacity` events behind skips the
/// oldest ones and keeps going.
#[derive(Clone)]
pub struct AuthEventBus {
    sender: Arc<broadcast::Sender<AuthEvent>>,
}

impl AuthEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: AuthEvent) {
        let label = event.kind.as_str();
        match self.sender.send(event) {
            Ok(count) => debug!("auth_events: emitted {label} to {count} subscriber(s)"),
            Err(_) => debug!("auth_events: no subscribers for {label}"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Deliver `initial` and then every bus event to `callback`, one at a
    /// time and in order, on a dedicated task.
    ///
    /// `receiver` must have been taken before `initial` was read so no
    /// transition falls between the two.
    pub(crate) fn spawn_delivery<F>(
        mut receiver: broadcast::Receiver<AuthEvent>,
        initial: Option<Session>,
        mut callback: F,
    ) -> AuthSubscription
    where
        F: FnMut(AuthEventKind, Option<Session>) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            callback(AuthEventKind::InitialSession, initial);
            loop {
                match receiver.recv().await {
                    Ok(event) => callback(event.kind, event.session),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("auth subscriber lagged, skipped {skipped} event(s)");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        AuthSubscription { task: Some(task) }
    }
}

/// Handle to a live auth subscription. Dropping it also unsubscribes.
pub struct AuthSubscription {
    task: Option<JoinHandle<()>>,
}

impl AuthSubscription {
    /// Stop delivery. No callback runs after this returns.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
