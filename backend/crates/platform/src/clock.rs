//! Clock abstraction
//!
//! Cooldowns, code expiry, token expiry and daily bookkeeping all read time
//! through [`Clock`] so tests can move time forward without sleeping.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Millisecond resolution.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now_ms: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now_ms.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.now_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Midnight (server local time) of the calendar day containing `instant`.
///
/// When local midnight does not exist (DST gap) the earliest valid instant of
/// that day is used.
pub fn start_of_local_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    let local_date = instant.with_timezone(&Local).date_naive();
    let midnight = local_date.and_time(NaiveTime::MIN);

    Local
        .from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(instant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::minutes(6));
        assert_eq!(clock.now(), start + Duration::minutes(6));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_start_of_local_day() {
        let noon = Local
            .with_ymd_and_hms(2026, 3, 10, 12, 30, 0)
            .unwrap()
            .with_timezone(&Utc);
        let start = start_of_local_day(noon);

        let local_start = start.with_timezone(&Local);
        assert_eq!(local_start.date_naive(), noon.with_timezone(&Local).date_naive());
        assert_eq!(local_start.time(), NaiveTime::MIN);
        assert!(start <= noon);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
