//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Error Types                                │
//! │                                                                     │
//! │  till-core errors (this file)                                       │
//! │  └── CoreError       - cart / domain rule violations                │
//! │                                                                     │
//! │  till-client errors (separate crate)                                │
//! │  └── ClientError     - transport and backend rejections             │
//! │                                                                     │
//! │  till-terminal errors (separate crate)                              │
//! │  └── TerminalError   - operator-facing taxonomy                     │
//! │                                                                     │
//! │  Flow: CoreError ──► TerminalError ──► operator message             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impls)
//! 2. Include context in error messages (product id, limits, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent cart rule violations. They are recoverable: the caller
/// translates them into an operator message and the cart stays valid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Checkout attempted with no cart lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A line quantity would exceed the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A non-empty cart was cleared without explicit confirmation.
    ///
    /// Clearing throws away an in-progress sale, so interactive callers
    /// must pass `confirmed = true`. The post-checkout clear is the one
    /// programmatic caller that always confirms.
    #[error("Clearing a non-empty cart requires confirmation")]
    ClearNotConfirmed,

    /// A payment method label outside the fixed enumerated set.
    #[error("Unknown payment method: '{value}'")]
    UnknownPaymentMethod { value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
