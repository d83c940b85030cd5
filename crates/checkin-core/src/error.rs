//! Exchange error types

use thiserror::Error;

/// Why a call to the backend did not produce a usable reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// An intermediary (usually a tunnelling proxy) answered with an HTML page
    #[error("received an HTML page instead of the backend response")]
    Interstitial,
    /// Body was neither HTML nor the expected JSON
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Backend replied with a non-2xx status
    #[error("backend returned HTTP {0}")]
    Status(u16),
    /// The request never completed
    #[error("transport error: {0}")]
    Transport(String),
}

impl ExchangeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Interstitial => FailureKind::Transient,
            Self::Malformed(_) => FailureKind::Malformed,
            Self::Status(_) | Self::Transport(_) => FailureKind::Transport,
        }
    }
}

/// Error classification for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Interstitial page from an intermediary - retryable with fixed backoff
    Transient,
    /// Unparsable body - not expected to go away, not retried
    Malformed,
    /// Network failure or bad status - not retried
    Transport,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_interstitial_is_retryable() {
        assert!(ExchangeError::Interstitial.kind().is_retryable());
        assert!(!ExchangeError::Malformed("x".into()).kind().is_retryable());
        assert!(!ExchangeError::Status(502).kind().is_retryable());
        assert!(!ExchangeError::Transport("refused".into()).kind().is_retryable());
    }

    #[test]
    fn test_status_counts_as_transport() {
        assert_eq!(ExchangeError::Status(500).kind(), FailureKind::Transport);
    }
}
