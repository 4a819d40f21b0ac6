//! Clock port for timestamps the client stamps itself.

use chrono::{DateTime, NaiveDate, Utc};

/// Provides the current time.
///
/// Contract signatures are stamped client-side; routing them through this
/// port keeps replays and tests deterministic.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current UTC calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
