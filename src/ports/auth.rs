//! Auth session port.

use serde::{Deserialize, Serialize};

use super::tables::RemoteFuture;

/// Id used for the signed-out user.
pub const GUEST_ID: &str = "guest";

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Auth user id (also the profile id).
    pub id: String,
    /// Email, when known.
    pub email: Option<String>,
    /// Auth role (e.g. `authenticated`).
    pub role: Option<String>,
}

impl SessionUser {
    /// The signed-out user.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            id: GUEST_ID.to_string(),
            email: Some("guest@example.com".to_string()),
            role: Some("guest".to_string()),
        }
    }

    /// Whether this is the signed-out user.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.id == GUEST_ID
    }
}

/// Resolves the current session.
///
/// Sign-in flows are owned by the hosted service; the port only reports who
/// the configured session belongs to.
pub trait AuthSession: Send + Sync {
    /// Returns the signed-in user, or `None` when there is no valid session.
    ///
    /// # Errors
    ///
    /// Returns an error if the auth service cannot be reached.
    fn current_user(&self) -> RemoteFuture<'_, Option<SessionUser>>;
}
