//! # DomainError
//!
//! Centralized error handling for the discovery pipeline and its ports.
//! Malformed query input never produces one of these: it degrades to
//! defaults during parsing.

use thiserror::Error;

/// The primary error type for every port and service operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing, malformed, or expired credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The keyed request budget for this requester is exhausted.
    #[error("too many requests for {key}, retry after {retry_after_ms}ms")]
    RateLimited { key: String, retry_after_ms: u64 },

    /// The retrieval collaborator failed to produce a page.
    #[error("post retrieval failed: {0}")]
    Retrieval(String),

    /// Infrastructure failure outside the retrieval path.
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for discovery logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
