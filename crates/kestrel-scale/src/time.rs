//! UTC calendar intervals and the "nice" tick interval chooser.
//!
//! Intervals follow d3-time semantics: `floor`/`ceil` snap to unit boundaries, and stepped
//! intervals (`every(n)`) keep only the boundaries whose calendar field is a multiple of `n`
//! (seconds of the minute, hours of the day, day of the month minus one, ...). All arithmetic
//! is done in UTC; instants are milliseconds since the Unix epoch.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::ticks::tick_step;

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
pub const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;
pub const MS_PER_MONTH: i64 = 30 * MS_PER_DAY;
pub const MS_PER_YEAR: i64 = 365 * MS_PER_DAY;

// Upper bound on field-alignment walks; the widest field (day of month) needs < 31 steps.
const MAX_ALIGN_STEPS: usize = 64;

/// Calendar unit. Also used as the serialized "time precision" of zoom bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

pub type TimePrecision = TimeUnit;

impl TimeUnit {
    pub const ALL: [TimeUnit; 8] = [
        TimeUnit::Millisecond,
        TimeUnit::Second,
        TimeUnit::Minute,
        TimeUnit::Hour,
        TimeUnit::Day,
        TimeUnit::Week,
        TimeUnit::Month,
        TimeUnit::Year,
    ];

    /// Nominal duration: months are 30 days and years 365 days.
    pub fn duration_ms(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => MS_PER_SECOND,
            TimeUnit::Minute => MS_PER_MINUTE,
            TimeUnit::Hour => MS_PER_HOUR,
            TimeUnit::Day => MS_PER_DAY,
            TimeUnit::Week => MS_PER_WEEK,
            TimeUnit::Month => MS_PER_MONTH,
            TimeUnit::Year => MS_PER_YEAR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Millisecond => "millisecond",
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }

    /// Floors `ms` to the start of the enclosing unit.
    pub fn floor(self, ms: i64) -> i64 {
        match self {
            TimeUnit::Millisecond => ms,
            TimeUnit::Second | TimeUnit::Minute | TimeUnit::Hour | TimeUnit::Day => {
                let d = self.duration_ms();
                ms.div_euclid(d).saturating_mul(d)
            }
            TimeUnit::Week => {
                // Weeks start on Sunday; 1970-01-04 is the first Sunday after the epoch.
                let sunday = 3 * MS_PER_DAY;
                ms.saturating_sub(sunday)
                    .div_euclid(MS_PER_WEEK)
                    .saturating_mul(MS_PER_WEEK)
                    .saturating_add(sunday)
            }
            TimeUnit::Month => {
                let Some(dt) = naive(ms) else {
                    return ms;
                };
                ymd_ms(dt.year(), dt.month(), 1).unwrap_or(ms)
            }
            TimeUnit::Year => {
                let Some(dt) = naive(ms) else {
                    return ms;
                };
                ymd_ms(dt.year(), 1, 1).unwrap_or(ms)
            }
        }
    }

    /// Moves `ms` by `n` whole units. Month and year offsets keep the time of day and
    /// clamp the day of month to the target month's length.
    pub fn offset(self, ms: i64, n: i64) -> i64 {
        match self {
            TimeUnit::Month => add_months(ms, n).unwrap_or(ms),
            TimeUnit::Year => add_months(ms, n.saturating_mul(12)).unwrap_or(ms),
            _ => ms.saturating_add(n.saturating_mul(self.duration_ms())),
        }
    }

    pub fn ceil(self, ms: i64) -> i64 {
        let floored = self.floor(ms.saturating_sub(1));
        self.floor(self.offset(floored, 1))
    }

    /// Number of unit boundaries crossed between the floors of `start` and `end`.
    pub fn count(self, start: i64, end: i64) -> i64 {
        let t0 = self.floor(start);
        let t1 = self.floor(end);
        match self {
            TimeUnit::Month | TimeUnit::Year => {
                let (Some(a), Some(b)) = (naive(t0), naive(t1)) else {
                    return 0;
                };
                let months = (b.year() - a.year()) as i64 * 12 + b.month() as i64 - a.month() as i64;
                if self == TimeUnit::Year {
                    months / 12
                } else {
                    months
                }
            }
            _ => t1.saturating_sub(t0).div_euclid(self.duration_ms()),
        }
    }

    /// The calendar field used to align stepped intervals, or `None` when alignment counts
    /// whole units since the epoch.
    fn field(self, ms: i64) -> Option<i64> {
        let dt = naive(ms)?;
        match self {
            TimeUnit::Second => Some(dt.second() as i64),
            TimeUnit::Minute => Some(dt.minute() as i64),
            TimeUnit::Hour => Some(dt.hour() as i64),
            TimeUnit::Day => Some(dt.day0() as i64),
            TimeUnit::Month => Some(dt.month0() as i64),
            TimeUnit::Year => Some(dt.year() as i64),
            TimeUnit::Millisecond | TimeUnit::Week => None,
        }
    }

    pub fn every(self, step: u32) -> TimeInterval {
        TimeInterval::new(self, step)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar unit taken `step` at a time (`10 minutes`, `3 months`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub unit: TimeUnit,
    pub step: u32,
}

impl TimeInterval {
    pub fn new(unit: TimeUnit, step: u32) -> Self {
        Self {
            unit,
            step: step.max(1),
        }
    }

    pub fn nominal_duration_ms(&self) -> i64 {
        self.unit.duration_ms() * self.step as i64
    }

    fn is_aligned(&self, ms: i64) -> bool {
        let step = self.step as i64;
        if step == 1 {
            return true;
        }
        match self.unit.field(ms) {
            Some(field) => field.rem_euclid(step) == 0,
            None => self.unit.count(0, ms).rem_euclid(step) == 0,
        }
    }

    pub fn floor(&self, ms: i64) -> i64 {
        let step = self.step as i64;
        match self.unit {
            TimeUnit::Millisecond => ms.div_euclid(step).saturating_mul(step),
            TimeUnit::Year => {
                let Some(dt) = naive(ms) else {
                    return ms;
                };
                let year = (dt.year() as i64).div_euclid(step) * step;
                ymd_ms(year as i32, 1, 1).unwrap_or(ms)
            }
            unit => {
                let mut cur = unit.floor(ms);
                for _ in 0..MAX_ALIGN_STEPS {
                    if self.is_aligned(cur) {
                        break;
                    }
                    cur = unit.floor(cur.saturating_sub(1));
                }
                cur
            }
        }
    }

    /// Advances by `n` aligned boundaries.
    pub fn offset(&self, ms: i64, n: i64) -> i64 {
        let step = self.step as i64;
        match self.unit {
            TimeUnit::Millisecond | TimeUnit::Year => self.unit.offset(ms, n.saturating_mul(step)),
            unit => {
                let mut cur = ms;
                for _ in 0..n.max(0) {
                    for _ in 0..MAX_ALIGN_STEPS {
                        cur = unit.offset(cur, 1);
                        if self.is_aligned(cur) {
                            break;
                        }
                    }
                }
                cur
            }
        }
    }

    pub fn ceil(&self, ms: i64) -> i64 {
        let floored = self.floor(ms.saturating_sub(1));
        self.floor(self.offset(floored, 1))
    }

    /// Every aligned boundary in `[start, stop)`.
    pub fn range(&self, start: i64, stop: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut cur = self.ceil(start);
        // Tick ranges are bounded by the planner; this cap only guards pathological inputs.
        while cur < stop && out.len() < 10_000 {
            out.push(cur);
            let next = self.floor(self.offset(cur, 1));
            if next <= cur {
                break;
            }
            cur = next;
        }
        out
    }

    /// Aligned boundaries crossed between the floors of `start` and `end`; negative when
    /// `end` precedes `start`.
    pub fn count(&self, start: i64, end: i64) -> i64 {
        if end < start {
            return -self.count(end, start);
        }
        if self.step == 1 {
            return self.unit.count(start, end);
        }
        let (t0, t1) = (self.floor(start), self.floor(end));
        self.range(t0.saturating_add(1), t1.saturating_add(1)).len() as i64
    }

    /// Boundaries in `[start, stop]`, the range d3 uses for time-scale ticks.
    pub fn ticks(&self, start: i64, stop: i64) -> Vec<i64> {
        let (lo, hi) = if start <= stop { (start, stop) } else { (stop, start) };
        self.range(lo, hi.saturating_add(1))
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "1 {}", self.unit)
        } else {
            write!(f, "{} {}s", self.step, self.unit)
        }
    }
}

/// Candidate tick intervals, ascending by nominal duration.
pub const TICK_INTERVALS: [(TimeUnit, u32, i64); 37] = [
    (TimeUnit::Second, 1, MS_PER_SECOND),
    (TimeUnit::Second, 2, 2 * MS_PER_SECOND),
    (TimeUnit::Second, 3, 3 * MS_PER_SECOND),
    (TimeUnit::Second, 4, 4 * MS_PER_SECOND),
    (TimeUnit::Second, 5, 5 * MS_PER_SECOND),
    (TimeUnit::Second, 10, 10 * MS_PER_SECOND),
    (TimeUnit::Second, 15, 15 * MS_PER_SECOND),
    (TimeUnit::Second, 30, 30 * MS_PER_SECOND),
    (TimeUnit::Minute, 1, MS_PER_MINUTE),
    (TimeUnit::Minute, 2, 2 * MS_PER_MINUTE),
    (TimeUnit::Minute, 3, 3 * MS_PER_MINUTE),
    (TimeUnit::Minute, 4, 4 * MS_PER_MINUTE),
    (TimeUnit::Minute, 5, 5 * MS_PER_MINUTE),
    (TimeUnit::Minute, 10, 10 * MS_PER_MINUTE),
    (TimeUnit::Minute, 15, 15 * MS_PER_MINUTE),
    (TimeUnit::Minute, 30, 30 * MS_PER_MINUTE),
    (TimeUnit::Hour, 1, MS_PER_HOUR),
    (TimeUnit::Hour, 2, 2 * MS_PER_HOUR),
    (TimeUnit::Hour, 3, 3 * MS_PER_HOUR),
    (TimeUnit::Hour, 4, 4 * MS_PER_HOUR),
    (TimeUnit::Hour, 6, 6 * MS_PER_HOUR),
    (TimeUnit::Hour, 8, 8 * MS_PER_HOUR),
    (TimeUnit::Hour, 12, 12 * MS_PER_HOUR),
    (TimeUnit::Day, 1, MS_PER_DAY),
    (TimeUnit::Day, 2, 2 * MS_PER_DAY),
    (TimeUnit::Day, 3, 3 * MS_PER_DAY),
    (TimeUnit::Day, 4, 4 * MS_PER_DAY),
    (TimeUnit::Day, 5, 5 * MS_PER_DAY),
    (TimeUnit::Day, 6, 6 * MS_PER_DAY),
    (TimeUnit::Day, 10, 10 * MS_PER_DAY),
    (TimeUnit::Week, 1, MS_PER_WEEK),
    (TimeUnit::Month, 1, MS_PER_MONTH),
    (TimeUnit::Month, 2, 2 * MS_PER_MONTH),
    (TimeUnit::Month, 3, 3 * MS_PER_MONTH),
    (TimeUnit::Month, 4, 4 * MS_PER_MONTH),
    (TimeUnit::Month, 6, 6 * MS_PER_MONTH),
    (TimeUnit::Year, 1, MS_PER_YEAR),
];

/// Picks a calendar interval that yields roughly `count` ticks over `[start, stop]`.
///
/// Targets beyond the table fall back to a whole number of years; targets below it fall
/// back to `min_precision`, stepped by the numeric tick step in that unit. In between, the
/// neighbour whose duration is closer to the target in ratio terms wins; an exact tie
/// goes to the larger interval.
///
/// The below-table step is measured in `min_precision` units rather than milliseconds, so
/// a second-precision axis steps by whole seconds instead of a 1000-second stride.
pub fn choose_interval(start: f64, stop: f64, count: f64, min_precision: TimeUnit) -> TimeInterval {
    let count = if count.is_finite() && count > 0.0 { count } else { 1.0 };
    let target = (stop - start).abs() / count;
    let i = TICK_INTERVALS.partition_point(|&(_, _, d)| (d as f64) <= target);

    if i == TICK_INTERVALS.len() {
        let yr = MS_PER_YEAR as f64;
        let years = tick_step(start / yr, stop / yr, count).abs();
        return TimeUnit::Year.every(years.round().max(1.0) as u32);
    }
    if i == 0 {
        let unit_ms = min_precision.duration_ms() as f64;
        let step = tick_step(start / unit_ms, stop / unit_ms, count).abs();
        return min_precision.every(step.round().max(1.0) as u32);
    }

    let (u0, s0, d0) = TICK_INTERVALS[i - 1];
    let (u1, s1, d1) = TICK_INTERVALS[i];
    if target / (d0 as f64) < d1 as f64 / target {
        TimeInterval::new(u0, s0)
    } else {
        TimeInterval::new(u1, s1)
    }
}

/// How many `precision` units a domain spans, at least one.
pub fn time_tick_count(start: i64, stop: i64, precision: TimeUnit) -> i64 {
    precision.count(start, stop).max(1)
}

/// Epoch milliseconds clamped to the instants chrono can represent. NaN maps to the epoch.
pub fn epoch_ms(ms: f64) -> i64 {
    if ms.is_nan() {
        return 0;
    }
    let lo = DateTime::<Utc>::MIN_UTC.timestamp_millis();
    let hi = DateTime::<Utc>::MAX_UTC.timestamp_millis();
    ms.clamp(lo as f64, hi as f64) as i64
}

pub fn datetime_from_ms(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

fn naive(ms: i64) -> Option<NaiveDateTime> {
    datetime_from_ms(ms).map(|d| d.naive_utc())
}

fn ymd_ms(year: i32, month: u32, day: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

fn add_months(ms: i64, months: i64) -> Option<i64> {
    let dt = naive(ms)?;
    let total = dt.year() as i64 * 12 + dt.month0() as i64 + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let mut day = dt.day();
    let date = loop {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            break d;
        }
        if day <= 28 {
            return None;
        }
        day -= 1;
    };
    Some(date.and_time(dt.time()).and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn table_is_sorted_by_duration() {
        for w in TICK_INTERVALS.windows(2) {
            assert!(w[0].2 < w[1].2, "{:?} !< {:?}", w[0], w[1]);
        }
    }

    #[test]
    fn week_floor_lands_on_sunday() {
        // 2024-03-14 is a Thursday.
        let t = utc(2024, 3, 14, 15, 0, 0);
        assert_eq!(TimeUnit::Week.floor(t), utc(2024, 3, 10, 0, 0, 0));
    }

    #[test]
    fn stepped_days_reset_each_month() {
        let every3 = TimeUnit::Day.every(3);
        let ticks = every3.range(utc(2024, 1, 29, 0, 0, 0), utc(2024, 2, 6, 0, 0, 0));
        assert_eq!(
            ticks,
            vec![
                utc(2024, 1, 31, 0, 0, 0),
                utc(2024, 2, 1, 0, 0, 0),
                utc(2024, 2, 4, 0, 0, 0),
            ]
        );
    }

    #[test]
    fn month_offset_clamps_day_of_month() {
        let jan31 = utc(2023, 1, 31, 6, 0, 0);
        assert_eq!(TimeUnit::Month.offset(jan31, 1), utc(2023, 2, 28, 6, 0, 0));
    }

    #[test]
    fn count_uses_calendar_months() {
        let a = utc(2024, 1, 15, 0, 0, 0);
        let b = utc(2024, 7, 1, 0, 0, 0);
        assert_eq!(TimeUnit::Month.count(a, b), 6);
        assert_eq!(TimeUnit::Year.count(a, utc(2027, 1, 1, 0, 0, 0)), 3);
        assert_eq!(TimeUnit::Day.count(a, b), 168);
    }

    #[test]
    fn stepped_count_only_counts_aligned_boundaries() {
        let quarter = TimeUnit::Minute.every(15);
        let a = utc(2024, 3, 14, 10, 7, 0);
        let b = utc(2024, 3, 14, 11, 2, 0);
        assert_eq!(quarter.count(a, b), 4);
        assert_eq!(quarter.count(b, a), -4);
        assert_eq!(TimeUnit::Minute.every(1).count(a, b), 55);
    }

    #[test]
    fn tiny_spans_fall_back_to_precision() {
        let chosen = choose_interval(0.0, 100.0, 10.0, TimeUnit::Millisecond);
        assert_eq!(chosen, TimeUnit::Millisecond.every(10));
    }

    #[test]
    fn huge_spans_fall_back_to_years() {
        let start = utc(2000, 1, 1, 0, 0, 0) as f64;
        let stop = utc(2100, 1, 1, 0, 0, 0) as f64;
        assert_eq!(choose_interval(start, stop, 5.0, TimeUnit::Millisecond), TimeUnit::Year.every(20));
    }

    #[test]
    fn below_table_step_counts_precision_units() {
        assert_eq!(choose_interval(0.0, 3_000.0, 12.0, TimeUnit::Second), TimeUnit::Second.every(1));
        assert_eq!(choose_interval(0.0, 400.0, 4.0, TimeUnit::Millisecond), TimeUnit::Millisecond.every(100));
    }

    #[test]
    fn epoch_ms_clamps_to_representable_instants() {
        let lo = DateTime::<Utc>::MIN_UTC.timestamp_millis();
        let hi = DateTime::<Utc>::MAX_UTC.timestamp_millis();
        assert_eq!(epoch_ms(-1e19), lo);
        assert_eq!(epoch_ms(1e19), hi);
        assert_eq!(epoch_ms(f64::NAN), 0);
        assert_eq!(epoch_ms(1_500.7), 1_500);
        assert!(datetime_from_ms(epoch_ms(f64::NEG_INFINITY)).is_some());
    }

    #[test]
    fn extreme_millis_saturate_instead_of_overflowing() {
        for unit in [TimeUnit::Second, TimeUnit::Day, TimeUnit::Week, TimeUnit::Month] {
            let _ = unit.floor(i64::MIN);
            let _ = unit.ceil(i64::MIN);
            let _ = unit.floor(i64::MAX);
        }
        assert_eq!(TimeUnit::Hour.count(i64::MIN, i64::MAX), i64::MAX / TimeUnit::Hour.duration_ms());
        let _ = TimeUnit::Second.every(5).floor(i64::MIN + 1);
    }
}
