/// Crate-wide result alias.
pub type ReelResult<T> = Result<T, ReelError>;

/// Errors surfaced by intake, rendering, encoding and recording.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// A value failed validation (sizes, durations, config).
    #[error("validation error: {0}")]
    Validation(String),

    /// An image could not be accepted or decoded.
    #[error("intake error: {0}")]
    Intake(String),

    /// Frame capture could not be started or continued.
    #[error("capture error: {0}")]
    Capture(String),

    /// The encoding stream failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, usually I/O with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Intake`].
    pub fn intake(msg: impl Into<String>) -> Self {
        Self::Intake(msg.into())
    }

    /// Build a [`ReelError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`ReelError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`ReelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
