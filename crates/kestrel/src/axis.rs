use std::fmt;

use kestrel_scale::{BandScale, LinearScale, Scale, ScaleKind, TimeScale};
use serde::{Deserialize, Serialize};

use crate::config::AxisOptions;
use crate::error::{Error, Result};
use crate::geom::{CanvasArea, Rect, rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    X,
    Y,
}

impl Orientation {
    pub fn is_horizontal(self) -> bool {
        self == Orientation::X
    }

    pub fn default_position(self) -> AxisPosition {
        match self {
            Orientation::X => AxisPosition::Bottom,
            Orientation::Y => AxisPosition::Left,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::X => "x",
            Orientation::Y => "y",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl AxisPosition {
    pub fn is_horizontal(self) -> bool {
        matches!(self, AxisPosition::Top | AxisPosition::Bottom)
    }
}

impl fmt::Display for AxisPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AxisPosition::Top => "top",
            AxisPosition::Bottom => "bottom",
            AxisPosition::Left => "left",
            AxisPosition::Right => "right",
        })
    }
}

/// Data type shown on an axis; decides the scale kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Number,
    Date,
    String,
}

impl AxisType {
    pub fn scale_kind(self) -> ScaleKind {
        match self {
            AxisType::Number => ScaleKind::Linear,
            AxisType::Date => ScaleKind::Time,
            AxisType::String => ScaleKind::Band,
        }
    }

    fn default_scale(self) -> Scale {
        match self {
            AxisType::Number => LinearScale::default().into(),
            AxisType::Date => TimeScale::default().into(),
            AxisType::String => BandScale::default().into(),
        }
    }
}

pub fn check_position(orientation: Orientation, position: AxisPosition) -> Result<()> {
    if orientation.is_horizontal() != position.is_horizontal() {
        return Err(Error::IncompatibleAxisPosition {
            orientation,
            position,
        });
    }
    Ok(())
}

/// The pixel band an axis occupies between the canvas edge and the container edge.
pub fn axis_strip(position: AxisPosition, canvas: &CanvasArea) -> Rect {
    let p = canvas.padding;
    match position {
        AxisPosition::Top => rect(canvas.left(), 0.0, canvas.width, p.top),
        AxisPosition::Left => rect(0.0, canvas.top(), p.left, canvas.height),
        AxisPosition::Right => rect(canvas.right(), canvas.top(), p.right, canvas.height),
        AxisPosition::Bottom => rect(canvas.left(), canvas.bottom(), canvas.width, p.bottom),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub orientation: Orientation,
    pub position: AxisPosition,
    pub axis_type: AxisType,
    pub options: AxisOptions,
    pub scale: Scale,
}

impl Axis {
    /// Builds an axis with a fresh scale of the kind `options` asks for.
    pub fn configure(orientation: Orientation, options: &AxisOptions) -> Result<Self> {
        let position = options
            .position
            .unwrap_or_else(|| orientation.default_position());
        check_position(orientation, position)?;
        let axis_type = options.axis_type.unwrap_or(AxisType::Number);
        Ok(Self {
            orientation,
            position,
            axis_type,
            options: options.clone(),
            scale: axis_type.default_scale(),
        })
    }

    /// Reconfigures in place. The scale survives when its kind is unchanged and is
    /// replaced otherwise.
    pub fn reconfigure(&mut self, options: &AxisOptions) -> Result<bool> {
        let next = Self::configure(self.orientation, options)?;
        let replaced = next.scale.kind() != self.scale.kind();
        self.position = next.position;
        self.axis_type = next.axis_type;
        self.options = next.options;
        if replaced {
            self.scale = next.scale;
        }
        Ok(replaced)
    }

    pub fn strip(&self, canvas: &CanvasArea) -> Rect {
        axis_strip(self.position, canvas)
    }

    /// Default pixel range: left to right horizontally, bottom to top vertically.
    pub fn base_range(&self, canvas: &CanvasArea) -> [f64; 2] {
        match self.orientation {
            Orientation::X => [canvas.left(), canvas.right()],
            Orientation::Y => [canvas.bottom(), canvas.top()],
        }
    }

    pub fn length(&self, canvas: &CanvasArea) -> f64 {
        match self.orientation {
            Orientation::X => canvas.width,
            Orientation::Y => canvas.height,
        }
    }
}
