use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::band::BandScale;
use crate::error::{Error, Result};
use crate::linear::LinearScale;
use crate::temporal::TimeScale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Linear,
    Time,
    Band,
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScaleKind::Linear => "linear",
            ScaleKind::Time => "time",
            ScaleKind::Band => "band",
        })
    }
}

/// A value on a scale's domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    Number(f64),
    Time(DateTime<Utc>),
    Category(String),
}

impl DomainValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DomainValue::Number(_) => "number",
            DomainValue::Time(_) => "time",
            DomainValue::Category(_) => "category",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            DomainValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            DomainValue::Time(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<f64> for DomainValue {
    fn from(v: f64) -> Self {
        DomainValue::Number(v)
    }
}

impl From<DateTime<Utc>> for DomainValue {
    fn from(v: DateTime<Utc>) -> Self {
        DomainValue::Time(v)
    }
}

impl From<&str> for DomainValue {
    fn from(v: &str) -> Self {
        DomainValue::Category(v.to_string())
    }
}

/// One of the three scale kinds behind a single interface.
///
/// Capabilities differ per kind: only continuous scales invert, only band scales have a
/// step and bandwidth. Callers ask through the `Option`/`Result` returning methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scale {
    Linear(LinearScale),
    Time(TimeScale),
    Band(BandScale),
}

impl Scale {
    pub fn kind(&self) -> ScaleKind {
        match self {
            Scale::Linear(_) => ScaleKind::Linear,
            Scale::Time(_) => ScaleKind::Time,
            Scale::Band(_) => ScaleKind::Band,
        }
    }

    pub fn is_invertible(&self) -> bool {
        !matches!(self, Scale::Band(_))
    }

    pub fn range(&self) -> [f64; 2] {
        match self {
            Scale::Linear(s) => s.range,
            Scale::Time(s) => s.range(),
            Scale::Band(s) => s.range(),
        }
    }

    pub fn set_range(&mut self, range: [f64; 2]) {
        match self {
            Scale::Linear(s) => s.range = range,
            Scale::Time(s) => s.set_range(range),
            Scale::Band(s) => s.set_range(range),
        }
    }

    pub fn set_round(&mut self, round: bool) {
        match self {
            Scale::Linear(s) => s.round = round,
            Scale::Time(s) => *s = s.with_round(round),
            Scale::Band(s) => s.set_round(round),
        }
    }

    pub fn range_length(&self) -> f64 {
        let [r0, r1] = self.range();
        (r1 - r0).abs()
    }

    /// Numeric domain for continuous kinds (epoch milliseconds for time scales).
    pub fn continuous_domain(&self) -> Option<[f64; 2]> {
        match self {
            Scale::Linear(s) => Some(s.domain),
            Scale::Time(s) => Some(s.domain_ms()),
            Scale::Band(_) => None,
        }
    }

    pub fn categories(&self) -> Option<&indexmap::IndexSet<String>> {
        match self {
            Scale::Band(s) => Some(s.domain()),
            _ => None,
        }
    }

    pub fn to_pixel(&self, value: &DomainValue) -> Result<f64> {
        match (self, value) {
            (Scale::Linear(s), DomainValue::Number(v)) => Ok(s.map(*v)),
            (Scale::Time(s), DomainValue::Time(t)) => Ok(s.map(t)),
            (Scale::Time(s), DomainValue::Number(ms)) => Ok(s.map_ms(*ms)),
            (Scale::Band(s), DomainValue::Category(key)) => {
                s.map(key).ok_or_else(|| Error::UnknownCategory { key: key.clone() })
            }
            (scale, value) => Err(Error::DomainKindMismatch {
                expected: scale.kind(),
                found: value.kind_name(),
            }),
        }
    }

    pub fn to_domain(&self, pixel: f64) -> Result<DomainValue> {
        match self {
            Scale::Linear(s) => Ok(DomainValue::Number(s.invert(pixel))),
            Scale::Time(s) => Ok(DomainValue::Time(s.invert(pixel))),
            Scale::Band(_) => Err(Error::NotInvertible {
                kind: ScaleKind::Band,
            }),
        }
    }

    /// Pixel to numeric domain coordinate without constructing a `DomainValue`.
    pub fn invert_f64(&self, pixel: f64) -> Result<f64> {
        match self {
            Scale::Linear(s) => Ok(s.invert(pixel)),
            Scale::Time(s) => Ok(s.invert_ms(pixel)),
            Scale::Band(_) => Err(Error::NotInvertible {
                kind: ScaleKind::Band,
            }),
        }
    }

    /// Rounds a continuous domain outward; band scales are left untouched.
    pub fn nice(&mut self) {
        match self {
            Scale::Linear(s) => s.nice(10.0),
            Scale::Time(s) => s.nice(),
            Scale::Band(_) => {}
        }
    }

    pub fn step(&self) -> Option<f64> {
        match self {
            Scale::Band(s) => Some(s.step()),
            _ => None,
        }
    }

    pub fn bandwidth(&self) -> Option<f64> {
        match self {
            Scale::Band(s) => Some(s.bandwidth()),
            _ => None,
        }
    }

    /// Category index under `pixel` (band scales only).
    pub fn snap(&self, pixel: f64) -> Option<usize> {
        match self {
            Scale::Band(s) => s.snap(pixel),
            _ => None,
        }
    }

    /// A copy whose range is remapped through `pixel * k + t`.
    pub fn rescaled(&self, k: f64, t: f64) -> Scale {
        let [r0, r1] = self.range();
        let mut out = self.clone();
        out.set_range([r0 * k + t, r1 * k + t]);
        out
    }
}

impl From<LinearScale> for Scale {
    fn from(s: LinearScale) -> Self {
        Scale::Linear(s)
    }
}

impl From<TimeScale> for Scale {
    fn from(s: TimeScale) -> Self {
        Scale::Time(s)
    }
}

impl From<BandScale> for Scale {
    fn from(s: BandScale) -> Self {
        Scale::Band(s)
    }
}
