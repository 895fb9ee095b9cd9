//! Password session endpoints (`/auth/v1`).

use chrono::Utc;
use reqwest::{Method, StatusCode};
use sc_core::error::{ScError, ScResult};
use sc_models::{Session, User};

use crate::client::{ApiClient, Surface};

impl ApiClient {
    /// Exchange email and password for a session.
    ///
    /// Any 4xx from the token endpoint becomes `AuthFailed`; the backend
    /// uses 400 for bad credentials, not 401.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> ScResult<Session> {
        let body = serde_json::json!({ "email": email, "password": password });
        let builder = self
            .request(Method::POST, Surface::Auth, "/token", None)
            .query(&[("grant_type", "password")])
            .json(&body);
        self.token_grant(builder, "POST auth/token (password)").await
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh_session(&self, refresh_token: &str) -> ScResult<Session> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let builder = self
            .request(Method::POST, Surface::Auth, "/token", None)
            .query(&[("grant_type", "refresh_token")])
            .json(&body);
        self.token_grant(builder, "POST auth/token (refresh)").await
    }

    /// Revoke the session behind `access_token`.
    ///
    /// A token the backend no longer recognises counts as signed out.
    pub async fn sign_out(&self, access_token: &str) -> ScResult<()> {
        let builder = self.request(Method::POST, Surface::Auth, "/logout", Some(access_token));
        match self.send(Surface::Auth, builder, "POST auth/logout").await {
            Ok(_) => Ok(()),
            Err(ScError::AuthFailed(_)) | Err(ScError::ServerError { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Look up the user behind `access_token`; `None` if the token is rejected.
    pub async fn get_user(&self, access_token: &str) -> ScResult<Option<User>> {
        let builder = self.request(Method::GET, Surface::Auth, "/user", Some(access_token));
        match self.send(Surface::Auth, builder, "GET auth/user").await {
            Ok(resp) => {
                let body: serde_json::Value = ApiClient::parse_json(resp).await?;
                User::from_server_map(&body).map(Some)
            }
            Err(ScError::AuthFailed(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn token_grant(&self, builder: reqwest::RequestBuilder, label: &str) -> ScResult<Session> {
        let resp = match self.send(Surface::Auth, builder, label).await {
            Ok(resp) => resp,
            Err(ScError::ServerError { status, message })
                if StatusCode::from_u16(status).map_or(false, |s| s.is_client_error()) =>
            {
                return Err(ScError::AuthFailed(message));
            }
            Err(e) => return Err(e),
        };
        let body: serde_json::Value = ApiClient::parse_json(resp).await?;
        Session::from_token_response(&body, Utc::now())
    }
}
