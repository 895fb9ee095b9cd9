//! HTTP client for the hosted backend.
//!
//! Handles project-key and bearer headers, timeout management, TLS
//! options, status checking and error classification.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use sc_core::config::{AppConfig, BackendConfig};
use sc_core::constants;
use sc_core::error::{ScError, ScResult};

use crate::response::ApiErrorBody;

/// Backend surface a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Relational rows.
    Rest,
    /// Binary objects.
    Storage,
    /// Password sessions.
    Auth,
}

impl Surface {
    fn path_prefix(&self) -> &'static str {
        match self {
            Surface::Rest => "rest",
            Surface::Storage => "storage",
            Surface::Auth => "auth",
        }
    }
}

/// HTTP client for communicating with the backend.
///
/// Wraps reqwest::Client with the project key, bearer-token injection and
/// error mapping. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Project URL (scheme + host, no trailing slash).
    base_url: String,
    /// Public anon key, sent as `apikey` and as the default bearer.
    anon_key: String,
    /// Default request timeout.
    timeout: Duration,
    /// Timeout for object uploads.
    upload_timeout: Duration,
}

impl ApiClient {
    /// Create a new ApiClient from backend configuration.
    pub fn new(config: &BackendConfig) -> ScResult<Self> {
        let base_url = AppConfig::sanitize_backend_url(&config.url);
        if base_url.is_empty() {
            return Err(ScError::MissingConfig("backend.url".into()));
        }
        if config.anon_key.trim().is_empty() {
            return Err(ScError::MissingConfig("backend.anon_key".into()));
        }

        let mut builder = Client::builder()
            .timeout(Duration::from_millis(config.api_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(format!("{}/{}", constants::APP_NAME, constants::APP_VERSION));

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| ScError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url,
            anon_key: config.anon_key.trim().to_string(),
            timeout: Duration::from_millis(config.api_timeout_ms),
            upload_timeout: Duration::from_millis(config.upload_timeout_ms),
        })
    }

    /// Get the project base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a path on one of the surfaces.
    pub fn url(&self, surface: Surface, path: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.base_url,
            surface.path_prefix(),
            constants::API_VERSION,
            path
        )
    }

    /// Build a request with the project key and bearer token applied.
    ///
    /// Without a session token the anon key doubles as the bearer, which is
    /// what unauthenticated public reads and the contact insert use.
    pub(crate) fn request(
        &self,
        method: Method,
        surface: Surface,
        path: &str,
        bearer: Option<&str>,
    ) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.anon_key);
        self.inner
            .request(method, self.url(surface, path))
            .timeout(self.timeout)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Timeout applied to object uploads.
    pub(crate) fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    /// Send a request to `surface` and check its status.
    pub(crate) async fn send(
        &self,
        surface: Surface,
        builder: RequestBuilder,
        label: &str,
    ) -> ScResult<Response> {
        debug!("{label}");
        let response = builder.send().await.map_err(Self::classify_error)?;
        Self::check_status(surface, response).await
    }

    /// Deserialize a JSON response body.
    pub async fn parse_json<T: DeserializeOwned>(response: Response) -> ScResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ScError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Check the HTTP status code and convert to ScError if needed.
    async fn check_status(surface: Surface, response: Response) -> ScResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(surface, status, &body))
    }

    /// Map a non-success status and its body to an error.
    ///
    /// 401 and 403 are session failures only on the auth surface. On the
    /// row and object surfaces they are access-rule denials of the data
    /// operation itself.
    pub(crate) fn status_error(surface: Surface, status: StatusCode, body: &str) -> ScError {
        let message = ApiErrorBody::parse(body).best_message();
        let denied = status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN;
        match surface {
            Surface::Auth if denied => {
                ScError::AuthFailed(format!("backend returned {status}: {message}"))
            }
            Surface::Rest | Surface::Storage if denied => ScError::Forbidden {
                status: status.as_u16(),
                message,
            },
            _ => ScError::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Classify a reqwest error into a ScError variant.
    fn classify_error(e: reqwest::Error) -> ScError {
        if e.is_timeout() {
            ScError::Timeout(e.to_string())
        } else if e.is_connect() {
            ScError::Http(format!("connection failed: {e}"))
        } else {
            ScError::Http(e.to_string())
        }
    }
}
