//! Session operations and the background session watcher.

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use sc_core::constants::INVALID_CREDENTIALS;
use sc_core::error::{ScError, ScResult};
use sc_models::{Session, User};

use crate::backend::IdentityProvider;
use crate::data_service::{bounded, DataService};
use crate::event_bus::{AuthEvent, AuthEventBus, AuthEventKind, AuthSubscription};

const MIN_REFRESH_GAP: Duration = Duration::from_secs(10);

/// Session state shared between the service and its watcher task.
#[derive(Clone)]
pub(crate) struct AuthCore {
    identity: Arc<dyn IdentityProvider>,
    session: Arc<RwLock<Option<Session>>>,
    events: AuthEventBus,
    op_timeout: Duration,
}

impl AuthCore {
    pub(crate) fn new(
        identity: Arc<dyn IdentityProvider>,
        events: AuthEventBus,
        op_timeout: Duration,
    ) -> Self {
        Self {
            identity,
            session: Arc::new(RwLock::new(None)),
            events,
            op_timeout,
        }
    }

    pub(crate) fn snapshot(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Access token for the next data call.
    ///
    /// An expired session is refreshed first. If the refresh token is
    /// rejected the session ends and the call goes out anonymously; if the
    /// refresh cannot complete the call also goes out anonymously, keeping
    /// the session for a later attempt.
    pub(crate) async fn access_token(&self) -> Option<String> {
        let session = self.snapshot()?;
        if !session.is_expired_at(Utc::now()) {
            return Some(session.access_token);
        }
        match self.refresh().await {
            Ok(session) => Some(session.access_token),
            Err(e) if e.is_auth() => {
                debug!("expired session dropped, continuing anonymously");
                None
            }
            Err(e) => {
                warn!("could not refresh expired session, continuing anonymously: {e}");
                None
            }
        }
    }

    fn replace(&self, session: Option<Session>) -> Option<Session> {
        let mut guard = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::replace(&mut *guard, session)
    }

    /// Install a session and announce it.
    fn install(&self, session: Session, kind: AuthEventKind) {
        self.replace(Some(session.clone()));
        self.events.emit(AuthEvent::new(kind, Some(session)));
    }

    /// Drop the session, announcing `SessionExpired` if there was one.
    fn expire(&self, reason: &str) {
        if self.replace(None).is_some() {
            info!("session expired: {reason}");
            self.events.emit(AuthEvent::new(AuthEventKind::SessionExpired, None));
        }
    }

    /// Exchange the refresh token. A rejected token expires the session.
    async fn refresh(&self) -> ScResult<Session> {
        let current = self.snapshot().ok_or(ScError::NotAuthenticated)?;
        let result = bounded(
            self.op_timeout,
            "refresh session",
            self.identity.refresh_session(&current.refresh_token),
        )
        .await;
        match result {
            Ok(session) => {
                debug!("session refreshed, expires at {:?}", session.expires_at);
                self.install(session.clone(), AuthEventKind::TokenRefreshed);
                Ok(session)
            }
            Err(e) if e.is_auth() => {
                self.expire("refresh token rejected");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Refresh the session `margin` before it expires, for as long as the
    /// bus is alive. A failed refresh ends the session.
    pub(crate) async fn watch(self, margin: Duration) {
        let margin = chrono::Duration::from_std(margin).unwrap_or_else(|_| chrono::Duration::zero());
        let mut events = self.events.subscribe();
        let mut last_refresh: Option<Instant> = None;
        loop {
            let due = self
                .snapshot()
                .and_then(|session| session.refresh_due_in(Utc::now(), margin));
            let Some(mut wait) = due else {
                // Nothing to refresh until the session changes.
                if wait_for_change(&mut events).await {
                    continue;
                }
                break;
            };

            // At most one refresh per MIN_REFRESH_GAP.
            if let Some(last) = last_refresh {
                wait = wait.max((last + MIN_REFRESH_GAP).saturating_duration_since(Instant::now()));
            }

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    last_refresh = Some(Instant::now());
                    if let Err(e) = self.refresh().await {
                        warn!("background session refresh failed: {e}");
                        self.expire("background refresh failed");
                    }
                }
                alive = wait_for_change(&mut events) => {
                    if !alive {
                        break;
                    }
                }
            }
        }
        debug!("session watcher exiting");
    }
}

/// Wait for the next bus event. False once the bus is gone.
async fn wait_for_change(events: &mut broadcast::Receiver<AuthEvent>) -> bool {
    match events.recv().await {
        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => true,
        Err(broadcast::error::RecvError::Closed) => false,
    }
}

impl DataService {
    /// Sign in with email and password.
    ///
    /// Every failure reports the same opaque message; the cause is logged.
    pub async fn sign_in(&self, email: &str, password: &str) -> ScResult<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ScError::AuthFailed(INVALID_CREDENTIALS.into()));
        }

        let result = bounded(
            self.op_timeout,
            "sign in",
            self.backends.identity.sign_in_with_password(email, password),
        )
        .await;

        match result {
            Ok(session) => {
                info!("signed in as {}", session.user.id);
                self.auth.install(session.clone(), AuthEventKind::SignedIn);
                Ok(session)
            }
            Err(e) => {
                warn!("sign in failed: {e}");
                Err(ScError::AuthFailed(INVALID_CREDENTIALS.into()))
            }
        }
    }

    /// End the session. Always succeeds locally; a no-op when signed out.
    pub async fn sign_out(&self) {
        let Some(session) = self.auth.replace(None) else {
            debug!("sign out without a session");
            return;
        };

        let result = bounded(
            self.op_timeout,
            "sign out",
            self.backends.identity.sign_out(&session.access_token),
        )
        .await;
        if let Err(e) = result {
            warn!("remote sign out failed, session cleared locally: {e}");
        }

        info!("signed out {}", session.user.id);
        self.auth
            .events
            .emit(AuthEvent::new(AuthEventKind::SignedOut, None));
    }

    /// The user behind the active session, validated against the identity
    /// surface. A rejected token ends the session and yields `None`.
    pub async fn current_user(&self) -> ScResult<Option<User>> {
        let Some(mut session) = self.auth.snapshot() else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now()) {
            session = match self.auth.refresh().await {
                Ok(session) => session,
                Err(e) if e.is_auth() => return Ok(None),
                Err(e) => return Err(e),
            };
        }

        let user = bounded(
            self.op_timeout,
            "get user",
            self.backends.identity.get_user(&session.access_token),
        )
        .await?;

        if user.is_none() {
            self.auth.expire("access token rejected");
        }
        Ok(user)
    }

    /// Exchange the refresh token for a new session.
    pub async fn refresh_session(&self) -> ScResult<Session> {
        self.auth.refresh().await
    }

    /// Install a previously issued session, e.g. one read from disk.
    pub fn restore_session(&self, session: Session) {
        debug!("restoring session for {}", session.user.id);
        self.auth.install(session, AuthEventKind::SignedIn);
    }

    /// The active session, without a network call.
    pub fn session(&self) -> Option<Session> {
        self.auth.snapshot()
    }

    /// Call `callback` for every session transition, starting with
    /// `InitialSession`. Callbacks run one at a time on their own task.
    pub fn subscribe_auth_state<F>(&self, callback: F) -> AuthSubscription
    where
        F: FnMut(AuthEventKind, Option<Session>) + Send + 'static,
    {
        let receiver = self.auth.events.subscribe();
        let initial = self.auth.snapshot();
        AuthEventBus::spawn_delivery(receiver, initial, callback)
    }

    /// Raw stream of session transitions.
    pub fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.events.subscribe()
    }
}
