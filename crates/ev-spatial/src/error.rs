//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `ev-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
