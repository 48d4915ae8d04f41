//! Error types
//!
//! Only content-integrity problems surface as errors. Expected terminal
//! states (empty spawn pool, no free spawn point) are plain values.

use thiserror::Error;

/// A stage definition could not be found or is malformed
#[derive(Debug, Error)]
pub enum StageError {
    #[error("stage {0} not found")]
    NotFound(u32),
    #[error("invalid stage format: {0}")]
    InvalidFormat(String),
    #[error("unrecognized tile symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },
    #[error("failed to read stage {stage}: {source}")]
    Io {
        stage: u32,
        #[source]
        source: std::io::Error,
    },
}

/// Balance configuration could not be parsed or is out of range
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Errors raised while driving a game session
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}
