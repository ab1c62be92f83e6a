//! Injectable time source.
//!
//! Streak and fasting logic never read the wall clock directly; they ask a
//! `Clock`. "Today" is the local calendar day at the moment of the call, so
//! travelling across timezones moves today with the device and entries stay
//! keyed by the day the user saw when they were written.

use std::sync::Mutex;

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset,
    TimeZone, Utc,
};

pub trait Clock {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current local calendar day
    fn today(&self) -> NaiveDate;

    /// Resolve a local wall-clock time to an instant
    ///
    /// Ambiguous times (DST fall-back) resolve to the earlier instant;
    /// nonexistent times (DST spring-forward) are shifted forward an hour.
    fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc>;
}

/// The device clock in the system timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        resolve(&Local, local)
    }
}

/// A settable clock in a fixed UTC offset, for tests and simulations
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
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

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset).date_naive()
    }

    fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        resolve(&self.offset, local)
    }
}

fn resolve<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match tz.from_local_datetime(&(local + Duration::hours(1))) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&local),
        },
    }
}
