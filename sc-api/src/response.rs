//! Error body decoding.
//!
//! The three backend surfaces report failures with different JSON shapes:
//! ```json
//! { "code": "23502", "message": "null value ...", "details": null, "hint": null }
//! { "statusCode": "404", "error": "not_found", "message": "Object not found" }
//! { "error": "invalid_grant", "error_description": "Invalid login credentials" }
//! { "code": 400, "msg": "Invalid login credentials" }
//! ```
//! `ApiErrorBody` accepts all of them.

use serde::{Deserialize, Serialize};

/// Union of the error fields used by the rest, storage and auth surfaces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Rest/storage message.
    #[serde(default)]
    pub message: Option<String>,
    /// Auth message (newer auth servers).
    #[serde(default)]
    pub msg: Option<String>,
    /// Short error identifier (`invalid_grant`, `not_found`).
    #[serde(default)]
    pub error: Option<String>,
    /// Auth long-form message (older auth servers).
    #[serde(default)]
    pub error_description: Option<String>,
    /// Error code; a string for the rest surface, a number for auth.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ApiErrorBody {
    /// Parse a response body, falling back to treating it as plain text.
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => parsed,
            Err(_) => Self {
                message: Some(body.trim().to_string()).filter(|s| !s.is_empty()),
                ..Self::default()
            },
        }
    }

    /// The most descriptive message available.
    pub fn best_message(&self) -> String {
        let base = self
            .message
            .as_ref()
            .or(self.msg.as_ref())
            .or(self.error_description.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| "no error message".to_string());

        match (self.code_str(), self.details.as_deref()) {
            (Some(code), Some(details)) => format!("{base} [{code}] ({details})"),
            (Some(code), None) => format!("{base} [{code}]"),
            (None, Some(details)) => format!("{base} ({details})"),
            (None, None) => base,
        }
    }

    /// The code as text, whichever form it arrived in.
    pub fn code_str(&self) -> Option<String> {
        match self.code.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
