//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! failure can surface through them.

use thiserror::Error;

/// Errors produced by `ev-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ev-core`.
pub type CoreResult<T> = Result<T, CoreError>;
