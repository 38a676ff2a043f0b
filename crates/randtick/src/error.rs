// randtick/crates/randtick/src/error.rs

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TickerError {
    /// Maximum interval is shorter than the minimum.
    #[error("invalid interval range: max {max:?} is below min {min:?}")]
    InvalidRange { min: Duration, max: Duration },

    /// A zero upper bound would make the loop spin without ever sleeping.
    #[error("max interval must be greater than zero; a zero range is a busy loop")]
    ZeroInterval,

    #[error("channel capacity must be at least 1")]
    ZeroCapacity,

    #[error("ticker is already running")]
    AlreadyRunning,

    /// `start` was called outside a tokio runtime.
    #[error("no tokio runtime available to spawn the emission loop")]
    NoRuntime,

    #[error("emission loop failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for TickerError {
    fn from(err: tokio::task::JoinError) -> Self {
        TickerError::Join(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TickerError>;
