//! Contact form message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sc_core::error::ScResult;

use super::{opaque_id, text, timestamp};

/// A message left through the public contact form. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Fields submitted by the contact form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// Create a ContactMessage from a REST row.
    pub fn from_server_map(map: &serde_json::Value) -> ScResult<Self> {
        Ok(Self {
            id: opaque_id(map)?,
            name: text(map, "name"),
            email: text(map, "email"),
            message: text(map, "message"),
            created_at: timestamp(map, "created_at")?,
        })
    }
}

impl ContactFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Trim name and email; the message body keeps inner formatting.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }

    /// JSON row body for the insert request.
    pub fn to_row(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "email": self.email,
            "message": self.message,
        })
    }
}
