use crate::axis::{AxisPosition, Orientation};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Scale(#[from] kestrel_scale::Error),

    #[error("{orientation} axis cannot be placed on {position}")]
    IncompatibleAxisPosition {
        orientation: Orientation,
        position: AxisPosition,
    },

    #[error("invalid chart options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    #[error("grid addressing requires a heatmap grid layout")]
    GridNotConfigured,

    #[error("chart {id} has been torn down")]
    TornDown { id: crate::chart::ChartId },
}
