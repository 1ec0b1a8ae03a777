use thiserror::Error;

/// Errors surfaced by the scoring and ranking core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Malformed or out-of-domain input; fix before resubmitting
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MatchError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MatchError::InvalidArgument(message.into())
    }
}
