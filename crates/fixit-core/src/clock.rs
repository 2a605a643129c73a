//! # Clock and Shop Calendar
//!
//! The single place where instants become calendar days.
//!
//! ## Why One Conversion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Stored:  2026-10-15T20:00:00Z  (UTC, every timestamp column)          │
//! │                │                                                        │
//! │                ▼  local_date(instant, Asia/Kolkata)                     │
//! │  Local:   2026-10-16 01:30 IST  ──►  calendar day 2026-10-16           │
//! │                                                                         │
//! │  "Today's revenue", the trend series, the payment breakdown and the    │
//! │  expenditure totals all bucket through local_date(). If any one of     │
//! │  them used the UTC date instead, an order taken at 01:30 IST would     │
//! │  count for yesterday in one figure and today in another.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The shop's default timezone.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

// =============================================================================
// Calendar Conversions
// =============================================================================

/// Local calendar date of a stored instant.
#[inline]
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// The instant a local calendar day begins.
///
/// Used when a clerk backdates an expenditure to a day rather than a time.
/// If midnight does not exist locally (a DST jump), the first valid instant
/// after the gap is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => {
            let shifted = naive + chrono::Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
        }
    }
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day0(0).unwrap_or(date)
}

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" and of the shop's timezone.
///
/// Operations take the clock as a dependency so tests can pin the instant.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The shop's fixed local timezone.
    fn timezone(&self) -> Tz;

    /// Today's local calendar date.
    fn today(&self) -> NaiveDate {
        local_date(self.now(), self.timezone())
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        SystemClock { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new(DEFAULT_TIMEZONE)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        FixedClock { now, tz }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn timezone(&self) -> Tz {
        self.tz
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evening_utc_is_next_day_in_india() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 15, 20, 0, 0).unwrap();
        assert_eq!(
            local_date(instant, DEFAULT_TIMEZONE),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );
        assert_eq!(
            local_date(instant, chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
        );
    }

    #[test]
    fn test_local_midnight_round_trips_to_same_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let midnight = local_midnight(day, DEFAULT_TIMEZONE);
        // IST is +05:30, so local midnight is 18:30 UTC the day before
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 2, 28, 18, 30, 0).unwrap());
        assert_eq!(local_date(midnight, DEFAULT_TIMEZONE), day);
    }

    #[test]
    fn test_local_midnight_across_dst_gap() {
        // Havana skips 00:00-01:00 on its spring-forward night
        let tz: Tz = "America/Havana".parse().unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let start = local_midnight(day, tz);
        assert_eq!(local_date(start, tz), day);
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2026, 10, 15, 18, 29, 59).unwrap(),
            DEFAULT_TIMEZONE,
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
    }

    #[test]
    fn test_first_of_month() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(first_of_month(date), NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
    }
}
