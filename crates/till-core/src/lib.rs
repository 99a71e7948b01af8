//! # till-core: Pure Business Logic for Till POS
//!
//! This crate is the heart of the terminal: the cart state machine, the
//! totals calculator, and the domain types the rest of the workspace moves
//! around. Everything here is a pure function of its inputs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Till POS Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  UI shell (out of scope)                      │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! │                                  │                                 │
//! │  ┌───────────────────────────────▼───────────────────────────────┐ │
//! │  │              till-terminal (session + checkout)               │ │
//! │  └───────────────┬───────────────────────────────┬───────────────┘ │
//! │                  │                               │                 │
//! │  ┌───────────────▼───────────────┐ ┌─────────────▼───────────────┐ │
//! │  │   ★ till-core (THIS CRATE) ★  │ │  till-client (REST client)  │ │
//! │  │                               │ │                             │ │
//! │  │  ┌───────┐ ┌──────┐ ┌──────┐  │ │  catalog, checkout, admin   │ │
//! │  │  │ money │ │ cart │ │types │  │ └─────────────────────────────┘ │
//! │  │  └───────┘ └──────┘ └──────┘  │                                 │
//! │  │                               │                                 │
//! │  │  NO I/O • NO NETWORK • PURE   │                                 │
//! │  └───────────────────────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`cart`] - Cart, CartLine, totals computation
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain types (Product, Invoice, CheckoutRequest, ...)
//! - [`error`] - Domain error types
//!
//! ## Example
//!
//! ```rust
//! use till_core::cart::Cart;
//! use till_core::types::{Product, TaxRate};
//!
//! let widget = Product {
//!     id: 1,
//!     name: "Widget".to_string(),
//!     price_cents: 1000,
//!     stock: 5,
//!     barcode: None,
//!     created_at: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_product(&widget).unwrap();
//! cart.add_product(&widget).unwrap();
//!
//! let totals = cart.totals(TaxRate::from_bps(800));
//! assert_eq!(totals.total_cents, 2160); // $20.00 + 8% tax
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tax rate in basis points (800 = 8%).
///
/// The observed deployment value. Deployments override it through the
/// terminal configuration; nothing in this crate hard-codes it at call
/// sites.
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Customer name used when the operator doesn't enter one.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Maximum distinct lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transactions reviewable on a receipt.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
