//! Recording adapter for the Clock port.

use chrono::{DateTime, Utc};

use super::record_interaction;
use crate::cassette::session::SharedRecorder;
use crate::ports::clock::Clock;

/// Records every timestamp handed out by the inner clock.
pub struct RecordingClock {
    inner: Box<dyn Clock>,
    recorder: SharedRecorder,
}

impl RecordingClock {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn Clock>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.inner.now();
        record_interaction(&self.recorder, "clock", "now", &serde_json::json!({}), &now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::FixedClock;
    use crate::cassette::recorder::CassetteRecorder;
    use std::sync::{Arc, Mutex};

    #[test]
    fn records_each_reading() {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new("/dev/null", "t", "memory")));
        let instant: DateTime<Utc> = "2025-01-01T00:00:00Z".parse().unwrap();
        let clock = RecordingClock::new(Box::new(FixedClock(instant)), Arc::clone(&recorder));

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(recorder.lock().unwrap().len(), 2);
    }
}
