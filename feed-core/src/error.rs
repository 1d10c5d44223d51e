//! Error types for the feed

use thiserror::Error;

/// Feed-wide error type
#[derive(Error, Debug)]
pub enum FeedError {
    /// Upstream data source failure; recoverable via the seed fallback
    #[error("data source error: {0}")]
    Source(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FeedError {
    pub fn source(msg: impl Into<String>) -> Self {
        FeedError::Source(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        FeedError::Parse(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        FeedError::Internal(msg.into())
    }
}

/// Result type alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
