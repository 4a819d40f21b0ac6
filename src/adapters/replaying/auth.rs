//! Replaying adapter for the `AuthSession` port.

use super::{next_output, replay_result};
use crate::cassette::config::SharedReplayer;
use crate::ports::auth::{AuthSession, SessionUser};
use crate::ports::tables::RemoteFuture;

/// Serves recorded session lookups.
pub struct ReplayingAuth {
    replayer: Option<SharedReplayer>,
}

impl ReplayingAuth {
    /// An auth port reading from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer: Some(replayer) }
    }

    /// An auth port with no cassette. Panics when called.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { replayer: None }
    }
}

impl AuthSession for ReplayingAuth {
    fn current_user(&self) -> RemoteFuture<'_, Option<SessionUser>> {
        let output = next_output(self.replayer.as_ref(), "auth", "current_user");
        Box::pin(async move { replay_result(output) })
    }
}
