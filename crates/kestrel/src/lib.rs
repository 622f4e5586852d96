#![forbid(unsafe_code)]

//! Coordinate and interaction engine for zoomable 2D charts (headless).
//!
//! Design goals:
//! - one pixel/data mapping shared by rendering and hit-testing ([`ViewportMapper`])
//! - zoom behaviour compatible with `d3-zoom` (wheel deltas, scale/translate extents)
//! - deterministic tick planning from label metrics, pluggable via [`LabelMeasurer`]
//! - no clocks or event loops: hosts drive redraw coalescing with their own instants

pub mod axis;
pub mod chart;
pub mod config;
pub mod domain;
pub mod error;
pub mod geom;
pub mod schedule;
pub mod selection;
pub mod sunburst;
pub mod text;
pub mod ticks;
pub mod viewport;
pub mod zoom;

pub use kestrel_scale as scale;

pub use axis::{Axis, AxisPosition, AxisType, Orientation};
pub use chart::{ChartEngine, ChartId, SharedMeasurer};
pub use config::{AxisOptions, BarLayout, ChartKind, ChartOptions, ZoomBound};
pub use domain::DomainInput;
pub use error::{Error, Result};
pub use schedule::{RedrawBatch, RedrawReason, RedrawScheduler};
pub use selection::{Selection, SelectionModel};
pub use sunburst::{SunburstLayout, SunburstNode};
pub use text::{DeterministicLabelMeasurer, LabelMeasurer, LabelMetrics};
pub use ticks::{TickPlan, TickRequest};
pub use viewport::{GridIndex, GridLayout, GridSpec, ViewportMapper};
pub use zoom::{DriverAxis, ZoomEvent, ZoomState, ZoomTransform};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
