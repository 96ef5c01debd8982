/// Convenience result type used across anitype.
pub type AnitypeResult<T> = Result<T, AnitypeError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Missing letters and empty compositions are not errors; they surface as
/// filtered letters and `Empty` outcomes respectively.
#[derive(thiserror::Error, Debug)]
pub enum AnitypeError {
    /// Invalid user-provided settings or asset data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while evaluating or drawing a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors while writing exported frames.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing project files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// A line holds more letters than the stagger index stride can order.
    #[error(
        "stagger limit exceeded: line {line} has {letters} letters, at most {} are supported",
        .limit - 1
    )]
    StaggerOverflow {
        /// Zero-based line index.
        line: usize,
        /// Stagger slots used on that line.
        letters: usize,
        /// Stride between lines in the global stagger index.
        limit: usize,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnitypeError {
    /// Build a [`AnitypeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AnitypeError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`AnitypeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`AnitypeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
