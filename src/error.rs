//! Error taxonomy for case operations.
//!
//! Callers branch on the variant, never on message text. Only
//! `NotFound` coming back from the registry triggers a cache fallback;
//! every other collaborator failure surfaces as `Upstream` with the
//! collaborator's own status.

use crate::bus::BusError;
use crate::cache::CacheError;
use crate::clients::HttpClientError;

/// Result type for case operations.
pub type Result<T> = std::result::Result<T, CaseError>;

/// Errors returned by the orchestration engine.
#[derive(Debug, thiserror::Error)]
pub enum CaseError {
    /// Request data failed a business rule.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Request is well-formed but the resolved case is not eligible.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Neither the registry nor the cache holds the entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// A collaborator failed for a reason other than "not found".
    #[error("{service} failed (status {status:?}): {message}")]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },
}

impl CaseError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CaseError::InvalidArgument(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CaseError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CaseError::NotFound(message.into())
    }

    /// Wrap a collaborator failure, keeping whatever status it reported.
    pub fn upstream(service: &'static str, error: HttpClientError) -> Self {
        match error {
            HttpClientError::NotFound(message) => CaseError::NotFound(message),
            other => CaseError::Upstream {
                service,
                status: other.status(),
                message: other.to_string(),
            },
        }
    }

    /// Returns the HTTP-equivalent status for the endpoint layer.
    pub fn status_code(&self) -> u16 {
        match self {
            CaseError::InvalidArgument(_) => 400,
            CaseError::Forbidden(_) => 403,
            CaseError::NotFound(_) => 404,
            CaseError::Upstream { status, .. } => status.unwrap_or(502),
        }
    }

    /// Returns the error message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            CaseError::InvalidArgument(msg)
            | CaseError::Forbidden(msg)
            | CaseError::NotFound(msg) => msg.clone(),
            CaseError::Upstream { message, .. } => message.clone(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CaseError::NotFound(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CaseError::InvalidArgument(_))
    }
}

impl From<BusError> for CaseError {
    fn from(error: BusError) -> Self {
        CaseError::Upstream {
            service: "event publisher",
            status: None,
            message: error.to_string(),
        }
    }
}

impl From<CacheError> for CaseError {
    fn from(error: CacheError) -> Self {
        CaseError::Upstream {
            service: "case cache",
            status: None,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(CaseError::invalid("bad").status_code(), 400);
        assert_eq!(CaseError::forbidden("no").status_code(), 403);
        assert_eq!(CaseError::not_found("gone").status_code(), 404);
        let upstream = CaseError::Upstream {
            service: "case registry",
            status: Some(503),
            message: "unavailable".to_string(),
        };
        assert_eq!(upstream.status_code(), 503);
    }

    #[test]
    fn test_upstream_keeps_collaborator_status() {
        let err = CaseError::upstream(
            "case registry",
            HttpClientError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        );
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_upstream_not_found_stays_not_found() {
        let err = CaseError::upstream(
            "case registry",
            HttpClientError::NotFound("Case Id Not Found".to_string()),
        );
        assert!(err.is_not_found());
        assert_eq!(err.message(), "Case Id Not Found");
    }

    #[test]
    fn test_publish_failure_is_upstream() {
        let err: CaseError = BusError::Publish("broker down".to_string()).into();
        assert_eq!(err.status_code(), 502);
        assert!(err.message().contains("broker down"));
    }
}
