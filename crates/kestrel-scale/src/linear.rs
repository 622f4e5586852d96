use serde::{Deserialize, Serialize};

use crate::ticks::{tick_increment, ticks};

/// Continuous linear mapping `[d0, d1] -> [r0, r1]`.
///
/// A zero-length domain maps every value to the middle of the range, and a zero-length
/// range inverts every pixel to the middle of the domain. Neither case produces NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
    /// Round output pixels (d3 `rangeRound`).
    #[serde(default)]
    pub round: bool,
}

impl Default for LinearScale {
    fn default() -> Self {
        Self {
            domain: [0.0, 1.0],
            range: [0.0, 1.0],
            round: false,
        }
    }
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn map(&self, value: f64) -> f64 {
        let t = normalize(self.domain, value);
        let px = self.range[0] + t * (self.range[1] - self.range[0]);
        if self.round { px.round() } else { px }
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let t = normalize(self.range, pixel);
        self.domain[0] + t * (self.domain[1] - self.domain[0])
    }

    /// Extends the domain outward to multiples of the tick step (d3 `linear.nice`).
    pub fn nice(&mut self, count: f64) {
        self.domain = nice_domain(self.domain, count);
    }

    pub fn ticks(&self, count: f64) -> Vec<f64> {
        ticks(self.domain[0], self.domain[1], count)
    }

    pub fn range_length(&self) -> f64 {
        (self.range[1] - self.range[0]).abs()
    }
}

fn normalize(extent: [f64; 2], value: f64) -> f64 {
    let span = extent[1] - extent[0];
    if span == 0.0 || !span.is_finite() {
        return 0.5;
    }
    (value - extent[0]) / span
}

pub fn nice_domain(domain: [f64; 2], count: f64) -> [f64; 2] {
    let reversed = domain[1] < domain[0];
    let (mut start, mut stop) = if reversed {
        (domain[1], domain[0])
    } else {
        (domain[0], domain[1])
    };

    let mut prestep: Option<f64> = None;
    for _ in 0..10 {
        let Some(step) = tick_increment(start, stop, count) else {
            break;
        };
        if prestep == Some(step) {
            break;
        }
        if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        }
        prestep = Some(step);
    }

    if reversed { [stop, start] } else { [start, stop] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_and_inverts_with_flipped_range() {
        let s = LinearScale::new([0.0, 10.0], [100.0, 0.0]);
        assert_eq!(s.map(0.0), 100.0);
        assert_eq!(s.map(2.5), 75.0);
        assert_eq!(s.invert(75.0), 2.5);
    }

    #[test]
    fn nice_rounds_outward() {
        assert_eq!(nice_domain([0.0, 10.0], 10.0), [0.0, 10.0]);
        assert_eq!(nice_domain([0.13, 0.96], 10.0), [0.1, 1.0]);
        assert_eq!(nice_domain([-3.2, 47.0], 10.0), [-5.0, 50.0]);
        assert_eq!(nice_domain([47.0, -3.2], 10.0), [50.0, -5.0]);
    }

    #[test]
    fn degenerate_extents_map_to_midpoints() {
        let flat_domain = LinearScale::new([5.0, 5.0], [0.0, 200.0]);
        assert_eq!(flat_domain.map(5.0), 100.0);
        let flat_range = LinearScale::new([0.0, 10.0], [40.0, 40.0]);
        assert_eq!(flat_range.invert(40.0), 5.0);
    }
}
