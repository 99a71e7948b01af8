//! # Checkout State Machine
//!
//! Explicit tagged state for the checkout protocol.
//!
//! ## State Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Checkout State Machine                           │
//! │                                                                     │
//! │                  begin()                                            │
//! │      ┌────────┐ ───────► ┌────────────┐                             │
//! │      │  Idle  │          │ Submitting │ ◄── duplicate begin()       │
//! │      └────────┘ ◄──┐     └─────┬──────┘     = CheckoutInProgress    │
//! │           ▲        │           │                                    │
//! │           │        │           │ backend response                   │
//! │           │        │     ┌─────┴──────┐                             │
//! │           │        │     ▼            ▼                             │
//! │           │        │  ┌───────────┐ ┌──────────┐                    │
//! │           │        │  │ Confirmed │ │ Rejected │                    │
//! │           │        │  └─────┬─────┘ └────┬─────┘                    │
//! │           │        │        │            │                          │
//! │           └────────┴────────┴────────────┘  settle()                │
//! │                                             (effects done, ready    │
//! │                                              for the next attempt)  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Confirmed` and `Rejected` are the effect phases of one attempt: the
//! cart clear and catalog refresh happen inside `Confirmed`, the operator
//! message is produced inside `Rejected`. Once effects are done the machine
//! settles back to `Idle`; it never rests in `Submitting`.
//!
//! Keeping this a tagged enum (instead of scattered booleans) makes the
//! "reject duplicate concurrent checkout" invariant mechanically checkable:
//! `begin()` is the only entry point and it refuses anything but `Idle`.

use serde::Serialize;

use crate::error::{TerminalError, TerminalResult};

// =============================================================================
// Checkout State
// =============================================================================

/// Phase of the checkout protocol for the terminal's single cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CheckoutState {
    /// No attempt in flight; the cart accepts a new submission.
    Idle,

    /// A snapshot is on the wire. Exactly one attempt may be here at a
    /// time; a second submission is refused client-side.
    Submitting,

    /// The backend accepted and returned an invoice; success effects
    /// (cart clear, catalog refresh) are running.
    Confirmed { invoice_id: i64 },

    /// The backend or transport refused; the cart was left untouched.
    Rejected { reason: String },
}

impl CheckoutState {
    /// Attempts the `Idle → Submitting` transition.
    ///
    /// Anything else is a duplicate submission and fails with
    /// [`TerminalError::CheckoutInProgress`] before any network traffic.
    pub fn begin(&self) -> TerminalResult<CheckoutState> {
        match self {
            CheckoutState::Idle => Ok(CheckoutState::Submitting),
            _ => Err(TerminalError::CheckoutInProgress),
        }
    }

    /// `Submitting → Confirmed`. Panics in debug builds if called out of
    /// phase; the session is the only caller and holds the lock.
    pub fn confirm(&self, invoice_id: i64) -> CheckoutState {
        debug_assert!(matches!(self, CheckoutState::Submitting));
        CheckoutState::Confirmed { invoice_id }
    }

    /// `Submitting → Rejected`.
    pub fn reject(&self, reason: impl Into<String>) -> CheckoutState {
        debug_assert!(matches!(self, CheckoutState::Submitting));
        CheckoutState::Rejected {
            reason: reason.into(),
        }
    }

    /// `Confirmed | Rejected → Idle`, once the attempt's effects are done.
    pub fn settle(&self) -> CheckoutState {
        debug_assert!(!matches!(self, CheckoutState::Submitting));
        CheckoutState::Idle
    }

    /// True while a snapshot is on the wire.
    pub fn is_submitting(&self) -> bool {
        matches!(self, CheckoutState::Submitting)
    }

    /// True when a new checkout attempt would be accepted.
    pub fn is_idle(&self) -> bool {
        matches!(self, CheckoutState::Idle)
    }
}

impl Default for CheckoutState {
    fn default() -> Self {
        CheckoutState::Idle
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
