use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::linear::LinearScale;
use crate::time::{TimeInterval, TimeUnit, choose_interval, datetime_from_ms, epoch_ms};

/// Linear mapping over UTC instants, stored as epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    inner: LinearScale,
}

impl Default for TimeScale {
    fn default() -> Self {
        // d3 scaleTime defaults to 2000-01-01 .. 2000-01-02 (local); we use UTC.
        Self::from_millis([946_684_800_000.0, 946_771_200_000.0], [0.0, 1.0])
    }
}

impl TimeScale {
    pub fn new(domain: [DateTime<Utc>; 2], range: [f64; 2]) -> Self {
        Self::from_millis(
            [
                domain[0].timestamp_millis() as f64,
                domain[1].timestamp_millis() as f64,
            ],
            range,
        )
    }

    pub fn from_millis(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            inner: LinearScale::new(domain, range),
        }
    }

    pub fn with_round(mut self, round: bool) -> Self {
        self.inner.round = round;
        self
    }

    pub fn domain_ms(&self) -> [f64; 2] {
        self.inner.domain
    }

    pub fn set_domain_ms(&mut self, domain: [f64; 2]) {
        self.inner.domain = domain;
    }

    pub fn domain(&self) -> Option<[DateTime<Utc>; 2]> {
        Some([
            datetime_from_ms(epoch_ms(self.inner.domain[0].round()))?,
            datetime_from_ms(epoch_ms(self.inner.domain[1].round()))?,
        ])
    }

    pub fn range(&self) -> [f64; 2] {
        self.inner.range
    }

    pub fn set_range(&mut self, range: [f64; 2]) {
        self.inner.range = range;
    }

    pub fn round(&self) -> bool {
        self.inner.round
    }

    pub fn map_ms(&self, ms: f64) -> f64 {
        self.inner.map(ms)
    }

    pub fn map(&self, value: &DateTime<Utc>) -> f64 {
        self.map_ms(value.timestamp_millis() as f64)
    }

    pub fn invert_ms(&self, pixel: f64) -> f64 {
        self.inner.invert(pixel)
    }

    /// Inverts to the nearest representable millisecond. Instants outside chrono's range
    /// saturate to its bounds.
    pub fn invert(&self, pixel: f64) -> DateTime<Utc> {
        let ms = self.invert_ms(pixel).round();
        let ms = if ms.is_finite() { epoch_ms(ms) } else { 0 };
        datetime_from_ms(ms).unwrap_or(if ms < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    /// The tick interval a `count`-tick axis over the current domain would use.
    pub fn tick_interval(&self, count: f64, min_precision: TimeUnit) -> TimeInterval {
        let [d0, d1] = self.inner.domain;
        choose_interval(d0.min(d1), d0.max(d1), count, min_precision)
    }

    /// Floors the start and ceils the end of the domain to the interval chosen for ten ticks.
    pub fn nice(&mut self) {
        let [d0, d1] = self.inner.domain;
        if !(d0.is_finite() && d1.is_finite()) || d0 == d1 {
            return;
        }
        let interval = self.tick_interval(10.0, TimeUnit::Millisecond);
        let reversed = d1 < d0;
        let (lo, hi) = if reversed { (d1, d0) } else { (d0, d1) };
        let lo = interval.floor(epoch_ms(lo.floor())) as f64;
        let hi = interval.ceil(epoch_ms(hi.ceil())) as f64;
        self.inner.domain = if reversed { [hi, lo] } else { [lo, hi] };
    }

    pub fn ticks(&self, count: f64, min_precision: TimeUnit) -> (TimeInterval, Vec<i64>) {
        let [d0, d1] = self.inner.domain;
        let interval = self.tick_interval(count, min_precision);
        let values = interval.ticks(epoch_ms(d0.min(d1).ceil()), epoch_ms(d0.max(d1).floor()));
        (interval, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MS_PER_MINUTE;

    #[test]
    fn forty_seven_minutes_in_six_ticks_uses_ten_minute_steps() {
        let s = TimeScale::from_millis([0.0, (47 * MS_PER_MINUTE) as f64], [0.0, 470.0]);
        let (interval, values) = s.ticks(6.0, TimeUnit::Millisecond);
        assert_eq!(interval, TimeUnit::Minute.every(10));
        assert_eq!(values.len(), 5);
        assert_eq!(values[1], 10 * MS_PER_MINUTE);
    }

    #[test]
    fn nice_expands_to_interval_boundaries() {
        let mut s = TimeScale::from_millis(
            [(3 * MS_PER_MINUTE + 7_000) as f64, (58 * MS_PER_MINUTE) as f64],
            [0.0, 100.0],
        );
        s.nice();
        assert_eq!(s.domain_ms(), [0.0, (60 * MS_PER_MINUTE) as f64]);
    }
}
