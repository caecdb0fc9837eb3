//! External service clients.
//!
//! One trait per collaborator, each with a reqwest implementation and an
//! in-memory mock. All of them report failures as `HttpClientError`, which
//! keeps the collaborator's HTTP status for the engine to pass through.

pub mod address;
pub mod http;
pub mod launch;
pub mod mock;
pub mod registry;

pub use address::{AddressLookup, HttpAddressLookup};
pub use http::HttpClient;
pub use launch::{HttpLaunchTokenEncoder, LaunchTokenEncoder};
pub use mock::{MockAddressLookup, MockCaseRegistry, MockLaunchTokenEncoder};
pub use registry::{CaseRegistry, HttpCaseRegistry};

use crate::utils::retry::is_retryable_status;

/// Result type for collaborator calls.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// Errors from collaborator HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    /// The collaborator does not hold the requested entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl HttpClientError {
    /// The collaborator's status, if it answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpClientError::NotFound(_) => Some(404),
            HttpClientError::Status { status, .. } => Some(*status),
            HttpClientError::Http(e) => e.status().map(|s| s.as_u16()),
            HttpClientError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HttpClientError::NotFound(_))
    }

    /// Timeouts, connection failures, 429 and 5xx are retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpClientError::Http(e) => e.is_timeout() || e.is_connect(),
            HttpClientError::Status { status, .. } => is_retryable_status(*status),
            HttpClientError::NotFound(_) | HttpClientError::Decode(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_passthrough() {
        assert_eq!(HttpClientError::NotFound("x".to_string()).status(), Some(404));
        let err = HttpClientError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_not_found_and_client_errors_not_retried() {
        assert!(!HttpClientError::NotFound("x".to_string()).is_retryable());
        assert!(!HttpClientError::Status {
            status: 400,
            body: String::new(),
        }
        .is_retryable());

        let decode = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        assert!(!HttpClientError::Decode(decode).is_retryable());
    }
}
