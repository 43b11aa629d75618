//! Error types for the hint backend client.

use thiserror::Error;

/// Errors from a hint or solution request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect refused, DNS, broken pipe).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// No response within the request budget.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The backend answered with a non-success status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered 2xx but the payload is unusable. Retrying
    /// would replay the same malformed answer, so this is permanent.
    #[error("invalid response from backend: {reason}")]
    InvalidResponse { reason: String },
}

impl ApiError {
    /// Whether a retry has any chance of a different outcome.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::InvalidResponse { .. })
    }
}

/// Result alias for client operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_response_is_permanent() {
        let err = ApiError::InvalidResponse {
            reason: "empty hint".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_status_and_timeout_are_retryable() {
        assert!(ApiError::Status {
            status: 500,
            body: "oops".to_string(),
        }
        .is_retryable());
        assert!(ApiError::Timeout { timeout_ms: 30000 }.is_retryable());
    }
}
