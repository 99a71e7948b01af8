//! # Terminal Error Type
//!
//! The operator-facing error taxonomy.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  Error Flow in the Terminal                         │
//! │                                                                     │
//! │  CoreError ──────┐                                                  │
//! │  (cart rules)    │                                                  │
//! │                  ├──► TerminalError ──► operator_message()          │
//! │  ClientError ────┘          │                                       │
//! │  (wire)                     │                                       │
//! │                             ▼                                       │
//! │          every failure ends as a displayable message;               │
//! │          nothing propagates as a panic out of the session           │
//! │                                                                     │
//! │  Message fallback for rejected checkouts (mandatory order):         │
//! │    1. backend's structured `detail`  ─ verbatim                     │
//! │    2. transport-level message        ─ timeout, refused, malformed  │
//! │    3. generic "Checkout failed"      ─ never blank, never a trace   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use till_client::ClientError;
use till_core::CoreError;

/// Result type alias for terminal operations.
pub type TerminalResult<T> = Result<T, TerminalError>;

/// Operator-facing error taxonomy.
///
/// Every variant is recoverable: the terminal session stays alive, the cart
/// stays intact (except where the operation itself is a clear), and the
/// operator decides what to do next.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TerminalError {
    /// Checkout attempted with no cart lines. Detected locally, before any
    /// network call.
    #[error("Cart is empty")]
    EmptyCart,

    /// A checkout for this cart is already in flight. Detected locally;
    /// two overlapping snapshots must never race to the backend.
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    /// Clearing a non-empty cart without confirmation.
    #[error("Clearing a non-empty cart requires confirmation")]
    ClearNotConfirmed,

    /// Scanned/typed identifier matched no product. Routine; the operator
    /// corrects the input.
    #[error("Product not found: {identifier}")]
    NotFound { identifier: String },

    /// The backend refused the operation. The cart is preserved so the
    /// operator can edit and resubmit.
    #[error("Rejected by backend: {}", detail.as_deref().unwrap_or("no reason given"))]
    Rejected { detail: Option<String> },

    /// Network-level failure: unreachable backend, timeout, malformed
    /// response. The operator may simply retry.
    #[error("{message}")]
    Transport { message: String },

    /// Cart rule violation other than the dedicated variants above.
    #[error(transparent)]
    Cart(CoreError),
}

impl TerminalError {
    /// The message shown to the operator.
    ///
    /// For rejected checkouts this applies the mandatory three-tier
    /// fallback: structured backend detail, else transport message, else a
    /// generic line. The operator is never shown a blank or a stack trace.
    pub fn operator_message(&self) -> String {
        match self {
            TerminalError::Rejected { detail: Some(d) } => d.clone(),
            TerminalError::Rejected { detail: None } => "Checkout failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<CoreError> for TerminalError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => TerminalError::EmptyCart,
            CoreError::ClearNotConfirmed => TerminalError::ClearNotConfirmed,
            other => TerminalError::Cart(other),
        }
    }
}

impl From<ClientError> for TerminalError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { identifier } => TerminalError::NotFound { identifier },
            ClientError::Rejected { detail, .. } => TerminalError::Rejected { detail },
            ClientError::Timeout { seconds } => TerminalError::Transport {
                message: format!("Request timed out after {seconds}s"),
            },
            ClientError::Transport { message } => TerminalError::Transport { message },
            ClientError::InvalidResponse { message } => TerminalError::Transport {
                message: format!("Malformed response from backend: {message}"),
            },
            ClientError::InvalidBaseUrl(message) => TerminalError::Transport {
                message: format!("Invalid backend URL: {message}"),
            },
        }
    }
}
