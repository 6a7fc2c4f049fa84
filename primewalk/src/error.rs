use std::io;

use thiserror::Error;

use crate::checkpoint::CheckpointError;

/// Rejected run parameters. Always reported before the first iteration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("checkpoint interval must be positive")]
    ZeroCheckpointInterval,
    #[error("invalid iteration range [{min}, {max})")]
    InvalidRange { min: i64, max: i64 },
    #[error("iteration range [{min}, {max}) goes beyond |k| <= {limit}, where case formulas would overflow")]
    RangeOverflow { min: i64, max: i64, limit: i64 },
    #[error("no cases selected")]
    NoCases,
    #[error("unknown case id `{0}`")]
    UnknownCase(String),
    #[error("case `{0}` selected more than once")]
    DuplicateCase(String),
    #[error("case `{0}` is already registered")]
    AlreadyRegistered(String),
    #[error("point lifetime must be at least 1")]
    ZeroLifetime,
    #[error("seed value {0} is listed as both prime and composite")]
    ConflictingSeed(i64),
}

/// Broken internal invariants. These signal a defect, never a recoverable condition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("point store column `{column}` has {found} entries, expected {expected}")]
    ColumnMismatch { column: &'static str, expected: usize, found: usize },
    #[error("point at index {index} has non-positive lifetime {lifetime}")]
    ExpiredPoint { index: usize, lifetime: u32 },
    #[error("heading ({dx}, {dy}, {dz}) is not a canonical unit step")]
    NonCanonicalHeading { dx: i8, dy: i8, dz: i8 },
}

/// A statistics sink could not take a report.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Sink(String),
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("internal consistency violation: {0}")]
    Internal(#[from] InternalError),
    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),
}
