use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Ordinal band scale (d3 `scaleBand`): each category owns one equal slot of the range.
///
/// The domain keeps first-seen order and ignores duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBandScale")]
pub struct BandScale {
    domain: IndexSet<String>,
    range: [f64; 2],
    padding_inner: f64,
    padding_outer: f64,
    align: f64,
    round: bool,
    #[serde(skip)]
    layout: BandLayout,
}

/// Serialized fields only; the layout is recomputed on the way in.
#[derive(Deserialize)]
struct RawBandScale {
    domain: IndexSet<String>,
    range: [f64; 2],
    #[serde(default)]
    padding_inner: f64,
    #[serde(default)]
    padding_outer: f64,
    #[serde(default = "default_align")]
    align: f64,
    #[serde(default)]
    round: bool,
}

fn default_align() -> f64 {
    0.5
}

impl From<RawBandScale> for BandScale {
    fn from(raw: RawBandScale) -> Self {
        let mut scale = Self {
            domain: raw.domain,
            range: raw.range,
            padding_inner: raw.padding_inner.min(1.0),
            padding_outer: raw.padding_outer,
            align: raw.align,
            round: raw.round,
            layout: BandLayout::default(),
        };
        scale.rescale();
        scale
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BandLayout {
    start: f64,
    step: f64,
    bandwidth: f64,
    reverse: bool,
}

impl Default for BandScale {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), [0.0, 1.0])
    }
}

impl BandScale {
    pub fn new<I, S>(domain: I, range: [f64; 2]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scale = Self {
            domain: domain.into_iter().map(Into::into).collect(),
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            align: 0.5,
            round: false,
            layout: BandLayout::default(),
        };
        scale.rescale();
        scale
    }

    pub fn domain(&self) -> &IndexSet<String> {
        &self.domain
    }

    pub fn set_domain<I, S>(&mut self, domain: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain = domain.into_iter().map(Into::into).collect();
        self.rescale();
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn set_range(&mut self, range: [f64; 2]) {
        self.range = range;
        self.rescale();
    }

    pub fn round(&self) -> bool {
        self.round
    }

    pub fn set_round(&mut self, round: bool) {
        self.round = round;
        self.rescale();
    }

    pub fn padding_inner(&self) -> f64 {
        self.padding_inner
    }

    pub fn padding_outer(&self) -> f64 {
        self.padding_outer
    }

    /// Inner padding is capped at 1; outer padding is taken as given.
    pub fn set_padding(&mut self, inner: f64, outer: f64) {
        self.padding_inner = inner.min(1.0);
        self.padding_outer = outer;
        self.rescale();
    }

    pub fn step(&self) -> f64 {
        self.layout.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.layout.bandwidth
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.domain.get_index_of(key)
    }

    /// Start pixel of the slot at `index`.
    pub fn position(&self, index: usize) -> Option<f64> {
        let n = self.domain.len();
        if index >= n {
            return None;
        }
        let slot = if self.layout.reverse {
            n - 1 - index
        } else {
            index
        };
        Some(self.layout.start + self.layout.step * slot as f64)
    }

    pub fn map(&self, key: &str) -> Option<f64> {
        self.position(self.index_of(key)?)
    }

    /// Index of the category whose slot (band plus its share of padding) contains `pixel`.
    pub fn snap(&self, pixel: f64) -> Option<usize> {
        let n = self.domain.len();
        if n == 0 || !(self.layout.step > 0.0) || !pixel.is_finite() {
            return None;
        }
        let gap = self.layout.step - self.layout.bandwidth;
        let slot = ((pixel - self.layout.start + gap / 2.0) / self.layout.step).floor();
        if slot < 0.0 || slot >= n as f64 {
            return None;
        }
        let slot = slot as usize;
        Some(if self.layout.reverse { n - 1 - slot } else { slot })
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let [r0, r1] = self.range;
        let reverse = r1 < r0;
        let (mut start, stop) = if reverse { (r1, r0) } else { (r0, r1) };

        let mut step = (stop - start) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        if self.round {
            step = step.floor();
        }
        start += (stop - start - step * (n - self.padding_inner)) * self.align;
        let mut bandwidth = step * (1.0 - self.padding_inner);
        if self.round {
            start = start.round();
            bandwidth = bandwidth.round();
        }

        self.layout = BandLayout {
            start,
            step,
            bandwidth,
            reverse,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_match_d3_band_layout() {
        let mut s = BandScale::new(["a", "b", "c", "d"], [0.0, 100.0]);
        s.set_padding(0.2, 0.1);
        // step = 100 / (4 - 0.2 + 0.2) = 25
        assert_eq!(s.step(), 25.0);
        assert_eq!(s.bandwidth(), 20.0);
        assert_eq!(s.map("a"), Some(2.5));
        assert_eq!(s.map("d"), Some(77.5));
        assert_eq!(s.map("zz"), None);
    }

    #[test]
    fn duplicates_keep_first_seen_order() {
        let s = BandScale::new(["b", "a", "b", "c", "a"], [0.0, 30.0]);
        let keys: Vec<_> = s.domain().iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn snap_and_reverse_range() {
        let s = BandScale::new(["a", "b", "c"], [90.0, 0.0]);
        assert_eq!(s.map("a"), Some(60.0));
        assert_eq!(s.snap(75.0), Some(0));
        assert_eq!(s.snap(5.0), Some(2));
        assert_eq!(s.snap(95.0), None);
    }
}
