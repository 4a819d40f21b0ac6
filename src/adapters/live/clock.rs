//! System clock.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use crate::ports::clock::Clock;

/// Wall-clock time at millisecond precision, the precision the web client
/// writes signature stamps with.
pub struct LiveClock;

impl Clock for LiveClock {
    fn now(&self) -> DateTime<Utc> {
        let now = Utc::now();
        now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn whole_milliseconds_near_now() {
        let before = Utc::now() - TimeDelta::milliseconds(1);
        let now = LiveClock.now();
        assert!(now >= before && now <= Utc::now());
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }
}
