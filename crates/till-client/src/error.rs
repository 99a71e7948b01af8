//! # Client Error Types
//!
//! Error types for backend communication.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Client Error Categories                         │
//! │                                                                     │
//! │  ┌────────────────┐  ┌────────────────┐  ┌───────────────────────┐  │
//! │  │   Expected     │  │   Rejection    │  │      Transport        │  │
//! │  │                │  │                │  │                       │  │
//! │  │  NotFound      │  │  Rejected      │  │  Timeout              │  │
//! │  │  (mis-scan:    │  │  (backend said │  │  Transport            │  │
//! │  │   common, not  │  │   no, detail   │  │  InvalidResponse      │  │
//! │  │   exceptional) │  │   attached)    │  │                       │  │
//! │  └────────────────┘  └────────────────┘  └───────────────────────┘  │
//! │                                                                     │
//! │  NotFound MUST stay distinguishable from transport failures so the  │
//! │  UI can show "product not found" instead of a generic error.        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for backend operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors from talking to the shop backend.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The identifier resolved to no product (HTTP 404 on lookup).
    ///
    /// This is an expected, common outcome - operators mis-scan barcodes
    /// all day. It is never folded into the transport category.
    #[error("Product not found: {identifier}")]
    NotFound { identifier: String },

    /// The backend refused the request (validation failure, insufficient
    /// stock, ...). `detail` carries the backend's structured reason when
    /// the response body had one.
    #[error("Backend rejected request (HTTP {status})")]
    Rejected { status: u16, detail: Option<String> },

    /// The request exceeded the configured timeout.
    #[error("Request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Network-level failure: connection refused, DNS, broken pipe.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The backend answered 2xx with a body we could not decode.
    #[error("Malformed response from backend: {message}")]
    InvalidResponse { message: String },

    /// The configured base URL does not parse.
    #[error("Invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// The backend's structured reason, when one was attached.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True for failures where the operator correcting input is the fix.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::NotFound {
            identifier: "UNKNOWN".to_string(),
        };
        assert_eq!(err.to_string(), "Product not found: UNKNOWN");

        let err = ClientError::Timeout { seconds: 10 };
        assert_eq!(err.to_string(), "Request timed out after 10s");
    }

    #[test]
    fn test_detail_accessor() {
        let err = ClientError::Rejected {
            status: 400,
            detail: Some("Not enough stock for Widget".to_string()),
        };
        assert_eq!(err.detail(), Some("Not enough stock for Widget"));

        let err = ClientError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(err.detail(), None);
    }
}
