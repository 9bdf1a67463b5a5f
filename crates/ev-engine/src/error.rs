use ev_core::CoreError;
use ev_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("router configuration error: {0}")]
    Config(#[source] CoreError),

    #[error("failed to load road network: {0}")]
    Load(#[from] SpatialError),

    #[error("invalid query coordinate: {0}")]
    InvalidCoordinate(#[source] CoreError),

    #[error("k must be at least 1, got {0}")]
    InvalidK(usize),
}

pub type EngineResult<T> = Result<T, EngineError>;
