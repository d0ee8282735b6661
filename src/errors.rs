use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum RepresentError {
    #[error("{0}")]
    Error(String),
    #[error("Gridded dataset is missing {kind} '{name}': {detail}")]
    InputShape {
        kind: &'static str,
        name: String,
        detail: String,
    },
    #[error("Region '{region}' has no grid cells with positive capacity; aggregation over an empty region is undefined")]
    EmptyRegion { region: String },
    #[error("Requested {requested} time series but region '{region}' has only {available} usable grid cells")]
    ClusterCount {
        region: String,
        requested: usize,
        available: usize,
    },
    #[error("Representation of region '{region}' failed: {source}")]
    RegionTask {
        region: String,
        #[source]
        source: Box<RepresentError>,
    },
    #[error("Merged output does not cover the submitted regions: expected {expected}, merged {merged}")]
    MergeInconsistency { expected: usize, merged: usize },
    #[error("Grid cell ({x}, {y}) belongs to {count} regions but overlapping regions are not allowed")]
    OverlappingRegions { x: usize, y: usize, count: usize },
}

/// Convenience type for `Result<T, RepresentError>`.
pub type RepresentResult<T> = Result<T, RepresentError>;
