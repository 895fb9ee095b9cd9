//! Authenticated session and user models.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sc_core::error::{ScError, ScResult};

use super::{optional_text, optional_timestamp};

/// The signed-in administrator identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// An issued session: bearer token, refresh token and the user it belongs to.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Absolute expiry. `None` when the identity surface did not say.
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

impl User {
    /// Create a User from an identity-surface JSON object.
    pub fn from_server_map(map: &serde_json::Value) -> ScResult<Self> {
        let id = map
            .get("id")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScError::Serialization("user has no id".into()))?;
        Ok(Self {
            id: id.to_string(),
            email: optional_text(map, "email"),
            role: optional_text(map, "role"),
            last_sign_in_at: optional_timestamp(map, "last_sign_in_at"),
        })
    }
}

impl Session {
    /// Create a Session from a token-grant response.
    ///
    /// `expires_at` (unix seconds) wins; otherwise `expires_in` is added to `now`.
    pub fn from_token_response(map: &serde_json::Value, now: DateTime<Utc>) -> ScResult<Self> {
        let access_token = map
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScError::Serialization("token response has no access_token".into()))?;
        let user = map
            .get("user")
            .ok_or_else(|| ScError::Serialization("token response has no user".into()))
            .and_then(User::from_server_map)?;

        let expires_at = map
            .get("expires_at")
            .and_then(|v| v.as_i64())
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .or_else(|| {
                map.get("expires_in")
                    .and_then(|v| v.as_i64())
                    .map(|secs| now + Duration::seconds(secs))
            });

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: optional_text(map, "refresh_token").unwrap_or_default(),
            token_type: optional_text(map, "token_type").unwrap_or_else(|| "bearer".into()),
            expires_at,
            user,
        })
    }

    /// Whether the access token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |exp| exp <= now)
    }

    /// Time left before `margin` ahead of expiry, zero if already past it.
    /// `None` when the session has no known expiry.
    pub fn refresh_due_in(&self, now: DateTime<Utc>, margin: Duration) -> Option<std::time::Duration> {
        let due = self.expires_at? - margin;
        Some((due - now).to_std().unwrap_or_default())
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}
