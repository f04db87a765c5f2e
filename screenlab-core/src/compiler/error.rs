//! Failures at the language-model boundary.
//!
//! None of these escape the compiler: the fallback resolver renders them
//! into the category-11 diagnostic string.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("language model not configured: environment variable {0} is not set")]
    NotConfigured(String),

    #[error("network unreachable: {0}")]
    Network(String),

    #[error("language model request timed out")]
    Timeout,

    #[error("language model returned HTTP {status}")]
    Http { status: u16 },

    #[error("Empty response")]
    EmptyReply,

    #[error("response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("malformed response: {0}")]
    MalformedEnvelope(String),
}

impl OracleError {
    /// Worth another attempt: transport trouble, throttling, server faults.
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::Network(_) | OracleError::Timeout => true,
            OracleError::Http { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
