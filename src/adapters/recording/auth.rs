//! Recording adapter for the `AuthSession` port.

use std::sync::Arc;

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::auth::{AuthSession, SessionUser};
use crate::ports::tables::RemoteFuture;

/// Records session lookups while delegating to an inner implementation.
pub struct RecordingAuth {
    inner: Box<dyn AuthSession>,
    recorder: SharedRecorder,
}

impl RecordingAuth {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn AuthSession>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl AuthSession for RecordingAuth {
    fn current_user(&self) -> RemoteFuture<'_, Option<SessionUser>> {
        let recorder = Arc::clone(&self.recorder);
        Box::pin(async move {
            let result = self.inner.current_user().await;
            record_result(&recorder, "auth", "current_user", &serde_json::json!({}), &result);
            result
        })
    }
}
