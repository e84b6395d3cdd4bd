//! Local calendar date and time source

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::sync::Mutex;

/// Source of the current local date and time
///
/// The client works in local wall-clock time, matching the naive timestamps
/// the API stores.
pub trait DateProvider: Send + Sync {
    /// Current local timestamp
    fn now(&self) -> NaiveDateTime;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// The machine's local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl DateProvider for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock
///
/// # Examples
///
/// ```
/// use rounds::core::clock::{DateProvider, FixedClock};
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(23, 59, 0).unwrap();
/// let clock = FixedClock::new(start);
/// clock.advance(chrono::Duration::minutes(2));
/// assert_eq!(clock.today().to_string(), "2024-05-02");
/// ```
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock reading 08:00 on `day`
    pub fn on(day: NaiveDate) -> Self {
        Self::new(day.and_hms_opt(8, 0, 0).unwrap_or_default())
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl DateProvider for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
            .lock()
            .map(|guard| *guard)
            .unwrap_or_default()
    }
}
