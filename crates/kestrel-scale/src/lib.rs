#![forbid(unsafe_code)]

//! Domain to pixel scales for chart axes.
//!
//! Three kinds live behind [`Scale`]: continuous linear, continuous time (UTC) and ordinal
//! band. Tick generation and the "nice" rounding rules follow d3 (`d3-array`, `d3-scale`,
//! `d3-time`) so axes line up with what browser charts produce.

pub mod band;
pub mod error;
pub mod format;
pub mod linear;
pub mod scale;
pub mod temporal;
pub mod ticks;
pub mod time;

pub use band::BandScale;
pub use error::{Error, Result};
pub use linear::LinearScale;
pub use scale::{DomainValue, Scale, ScaleKind};
pub use temporal::TimeScale;
pub use time::{TimeInterval, TimePrecision, TimeUnit, choose_interval, time_tick_count};
