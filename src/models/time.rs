//! Calendar dates and clock times.
//!
//! Both types are plain values with exact integer arithmetic — no timezone
//! handling and no floating point. `ClockTime` round-trips through the
//! packed `HHMM` integer used on the wire (930 ↔ 9:30), `Date` through a
//! day/month/year triple.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Days in each month of a non-leap year, 1-indexed by month.
const DAYS_IN_MONTH: [u32; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Day-of-week label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Display label ("Monday", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A calendar date (year, month, day).
///
/// Field order gives derived ordering the chronological meaning directly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Date {
    /// Calendar year (e.g. 2026).
    pub year: i32,
    /// Month 1-12.
    pub month: u32,
    /// Day of month 1-31.
    pub day: u32,
}

impl Date {
    /// Creates a date. Components are taken as given; the planner validates
    /// ranges up front via the `validation` module.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Whether `year` is a leap year (Gregorian rules).
    pub fn is_leap_year(year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    /// Number of days in the given month of the given year.
    pub fn days_in_month(year: i32, month: u32) -> u32 {
        if month == 2 && Self::is_leap_year(year) {
            29
        } else {
            DAYS_IN_MONTH[month as usize]
        }
    }

    /// The next calendar day, rolling over month and year boundaries.
    pub fn succ(&self) -> Date {
        if self.day < Self::days_in_month(self.year, self.month) {
            Date::new(self.year, self.month, self.day + 1)
        } else if self.month < 12 {
            Date::new(self.year, self.month + 1, 1)
        } else {
            Date::new(self.year + 1, 1, 1)
        }
    }

    /// Canonical sortable identifier: `year * 10_000 + month * 100 + day`.
    ///
    /// Used as the key of the plan's ordered date → day mapping.
    #[inline]
    pub fn sort_key(&self) -> u32 {
        self.year as u32 * 10_000 + self.month * 100 + self.day
    }

    /// Day of week via Sakamoto's method.
    pub fn weekday(&self) -> Weekday {
        const T: [i32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
        let mut y = self.year;
        if self.month < 3 {
            y -= 1;
        }
        let w =
            (y + y / 4 - y / 100 + y / 400 + T[(self.month - 1) as usize] + self.day as i32) % 7;
        match w {
            0 => Weekday::Sunday,
            1 => Weekday::Monday,
            2 => Weekday::Tuesday,
            3 => Weekday::Wednesday,
            4 => Weekday::Thursday,
            5 => Weekday::Friday,
            _ => Weekday::Saturday,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// A clock time within a day.
///
/// Packed wire form is the `HHMM` integer: `930` is 9:30, `1745` is 17:45.
/// Arithmetic saturates at midnight on the low end; on the high end the hour
/// field simply grows (the planner's day-window keeps placements inside a
/// day, so an out-of-range hour never reaches a block).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "u32", into = "u32")]
pub struct ClockTime {
    /// Hour component (0-23 in any placed block).
    pub hour: u32,
    /// Minute component (0-59).
    pub minute: u32,
}

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: ClockTime = ClockTime { hour: 0, minute: 0 };

    /// Creates a clock time from hour and minute components.
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Unpacks an `HHMM` integer encoding (930 → 9:30).
    #[inline]
    pub fn from_encoded(encoded: u32) -> Self {
        Self {
            hour: encoded / 100,
            minute: encoded % 100,
        }
    }

    /// Packs into the `HHMM` integer encoding (9:30 → 930).
    #[inline]
    pub fn encoded(&self) -> u32 {
        self.hour * 100 + self.minute
    }

    /// Minutes since midnight.
    #[inline]
    pub fn total_minutes(&self) -> i64 {
        self.hour as i64 * 60 + self.minute as i64
    }

    /// Adds minutes, carrying overflow into the hour field.
    pub fn add_minutes(&self, minutes: u32) -> ClockTime {
        Self::from_total(self.total_minutes() + minutes as i64)
    }

    /// Subtracts minutes, clamping results below midnight to 00:00.
    pub fn sub_minutes(&self, minutes: u32) -> ClockTime {
        Self::from_total(self.total_minutes() - minutes as i64)
    }

    /// Signed minutes from `self` to `later` (negative if `later` is earlier).
    #[inline]
    pub fn minutes_until(&self, later: ClockTime) -> i64 {
        later.total_minutes() - self.total_minutes()
    }

    /// 24-hour display, e.g. `09:30`.
    pub fn format_24h(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// 12-hour display, e.g. `9:30 AM`.
    pub fn format_12h(&self) -> String {
        let hour = self.hour % 24;
        let suffix = if hour < 12 { "AM" } else { "PM" };
        let display = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", display, self.minute, suffix)
    }

    fn from_total(total: i64) -> ClockTime {
        let total = total.max(0);
        ClockTime {
            hour: (total / 60) as u32,
            minute: (total % 60) as u32,
        }
    }
}

impl From<u32> for ClockTime {
    fn from(encoded: u32) -> Self {
        ClockTime::from_encoded(encoded)
    }
}

impl From<ClockTime> for u32 {
    fn from(t: ClockTime) -> u32 {
        t.encoded()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_24h())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_ordering() {
        let a = Date::new(2026, 3, 15);
        let b = Date::new(2026, 3, 16);
        let c = Date::new(2026, 4, 1);
        let d = Date::new(2027, 1, 1);

        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert_eq!(a, Date::new(2026, 3, 15));
    }

    #[test]
    fn test_date_succ_within_month() {
        assert_eq!(Date::new(2026, 3, 15).succ(), Date::new(2026, 3, 16));
    }

    #[test]
    fn test_date_succ_month_rollover() {
        assert_eq!(Date::new(2026, 4, 30).succ(), Date::new(2026, 5, 1));
        assert_eq!(Date::new(2026, 12, 31).succ(), Date::new(2027, 1, 1));
    }

    #[test]
    fn test_date_succ_leap_february() {
        assert_eq!(Date::new(2028, 2, 28).succ(), Date::new(2028, 2, 29));
        assert_eq!(Date::new(2028, 2, 29).succ(), Date::new(2028, 3, 1));
        assert_eq!(Date::new(2026, 2, 28).succ(), Date::new(2026, 3, 1));
    }

    #[test]
    fn test_leap_year_rules() {
        assert!(Date::is_leap_year(2000));
        assert!(Date::is_leap_year(2028));
        assert!(!Date::is_leap_year(1900));
        assert!(!Date::is_leap_year(2026));
    }

    #[test]
    fn test_sort_key() {
        assert_eq!(Date::new(2026, 8, 6).sort_key(), 20260806);
        assert!(Date::new(2026, 8, 6).sort_key() < Date::new(2026, 12, 1).sort_key());
    }

    #[test]
    fn test_weekday() {
        // 2026-08-06 is a Thursday.
        assert_eq!(Date::new(2026, 8, 6).weekday(), Weekday::Thursday);
        // 2000-01-01 was a Saturday.
        assert_eq!(Date::new(2000, 1, 1).weekday(), Weekday::Saturday);
        assert_eq!(Date::new(2026, 8, 6).weekday().label(), "Thursday");
    }

    #[test]
    fn test_clock_encoding_roundtrip() {
        let t = ClockTime::from_encoded(930);
        assert_eq!(t.hour, 9);
        assert_eq!(t.minute, 30);
        assert_eq!(t.encoded(), 930);

        let t2 = ClockTime::from_encoded(1745);
        assert_eq!((t2.hour, t2.minute), (17, 45));
    }

    #[test]
    fn test_clock_add_carries_into_hour() {
        let t = ClockTime::new(9, 45).add_minutes(30);
        assert_eq!(t, ClockTime::new(10, 15));

        let t2 = ClockTime::new(9, 0).add_minutes(125);
        assert_eq!(t2, ClockTime::new(11, 5));
    }

    #[test]
    fn test_clock_sub_clamps_at_midnight() {
        let t = ClockTime::new(0, 30).sub_minutes(45);
        assert_eq!(t, ClockTime::MIDNIGHT);

        let t2 = ClockTime::new(10, 15).sub_minutes(30);
        assert_eq!(t2, ClockTime::new(9, 45));
    }

    #[test]
    fn test_clock_ordering_matches_encoding() {
        let a = ClockTime::new(9, 59);
        let b = ClockTime::new(10, 0);
        assert!(a < b);
        assert!(a.encoded() < b.encoded());
    }

    #[test]
    fn test_minutes_until() {
        let a = ClockTime::new(9, 0);
        let b = ClockTime::new(10, 30);
        assert_eq!(a.minutes_until(b), 90);
        assert_eq!(b.minutes_until(a), -90);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(ClockTime::new(9, 30).format_24h(), "09:30");
        assert_eq!(ClockTime::new(9, 30).format_12h(), "9:30 AM");
        assert_eq!(ClockTime::new(0, 5).format_12h(), "12:05 AM");
        assert_eq!(ClockTime::new(12, 0).format_12h(), "12:00 PM");
        assert_eq!(ClockTime::new(17, 45).format_12h(), "5:45 PM");
    }

    #[test]
    fn test_clock_serde_as_hhmm() {
        let t = ClockTime::new(9, 30);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "930");

        let back: ClockTime = serde_json::from_str("1745").unwrap();
        assert_eq!(back, ClockTime::new(17, 45));
    }
}
