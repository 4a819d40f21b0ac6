//! Fixed session for the in-memory backend.

use crate::ports::auth::{AuthSession, SessionUser};
use crate::ports::tables::RemoteFuture;

/// Auth port answering with a fixed user, or no session at all.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuth {
    user: Option<SessionUser>,
}

impl MemoryAuth {
    /// A session signed in as `user`.
    #[must_use]
    pub fn signed_in(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    /// No session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl AuthSession for MemoryAuth {
    fn current_user(&self) -> RemoteFuture<'_, Option<SessionUser>> {
        let user = self.user.clone();
        Box::pin(async move { Ok(user) })
    }
}
