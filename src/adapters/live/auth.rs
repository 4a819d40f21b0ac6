//! Live adapter for the `AuthSession` port over `/auth/v1`.

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use super::http::{check_status, RestClient};
use crate::error::RemoteError;
use crate::ports::auth::{AuthSession, SessionUser};
use crate::ports::tables::RemoteFuture;

/// Resolves the configured access token to a user.
pub struct LiveAuth {
    rest: RestClient,
}

impl LiveAuth {
    /// Creates an auth client sharing `rest`.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
    role: Option<String>,
}

impl AuthSession for LiveAuth {
    fn current_user(&self) -> RemoteFuture<'_, Option<SessionUser>> {
        Box::pin(async move {
            if self.rest.access_token().is_none() {
                return Ok(None);
            }
            let response = self.rest.request(Method::GET, "/auth/v1/user").send().await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                tracing::warn!("access token rejected, continuing as guest");
                return Ok(None);
            }
            let body = check_status(response).await?;
            let user: AuthUser =
                serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))?;
            Ok(Some(SessionUser { id: user.id, email: user.email, role: user.role }))
        })
    }
}
