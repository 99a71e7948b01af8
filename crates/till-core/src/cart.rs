//! # Cart Module
//!
//! The in-memory cart state machine for one sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Cart State Operations                          │
//! │                                                                     │
//! │  Operator Action            Operation            State Change       │
//! │  ───────────────            ─────────            ────────────       │
//! │                                                                     │
//! │  Scan / click product ────► add_product() ─────► merge or append    │
//! │                                                                     │
//! │  +/- buttons ─────────────► change_quantity() ─► qty += delta       │
//! │                                                  (≤ 0 removes line) │
//! │                                                                     │
//! │  Remove button ───────────► remove_line() ─────► line dropped       │
//! │                                                                     │
//! │  Clear button ────────────► clear(confirmed) ──► lines emptied      │
//! │                                                                     │
//! │  Invariants after EVERY operation:                                  │
//! │    • at most one line per product id                                │
//! │    • every line has quantity ≥ 1                                    │
//! │    • insertion order is stable                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Semantics
//! A `CartLine` copies the product's name and unit price at add-time. A
//! catalog refresh mid-sale must never change a price the customer has
//! already been shown, so lines own their values and never alias the
//! catalog collection.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CheckoutLine, CheckoutRequest, PaymentMethod, Product, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY, WALK_IN_CUSTOMER};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the in-progress sale.
///
/// `product_id` is a foreign key for the checkout submission; `name` and
/// `unit_price_cents` are frozen copies taken when the product was first
/// added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,

    /// Product name at add-time (frozen).
    pub name: String,

    /// Unit price in cents at add-time (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart, always ≥ 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a line from a product, freezing name and price.
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity: 1,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived totals for a cart, recomputed from cart state alone.
///
/// There is deliberately no incremental accumulation: identical cart states
/// yield identical totals regardless of the operation history that produced
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl CartTotals {
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress, unconfirmed sale for the current customer interaction.
///
/// Lives for the duration of one sale: created empty at terminal start,
/// reset to empty on successful checkout or explicit clear. Never durable;
/// a sale only becomes durable when the backend confirms the checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Ordered lines; insertion order is display order.
    lines: Vec<CartLine>,

    /// Free-text customer name for the invoice.
    pub customer_name: String,

    /// Payment method label for the invoice.
    pub payment_method: PaymentMethod,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart with default sale metadata.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            customer_name: WALK_IN_CUSTOMER.to_string(),
            payment_method: PaymentMethod::default(),
        }
    }

    /// Adds one unit of a product to the cart.
    ///
    /// ## Behavior
    /// - Product already in cart: its quantity increments by 1, position
    ///   unchanged.
    /// - Otherwise: a new line is appended with quantity 1, snapshotting the
    ///   product's current name and price.
    ///
    /// No stock check happens here. Stock is authoritative only at checkout,
    /// where the backend is the single source of truth.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            if line.quantity + 1 > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: line.quantity + 1,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity += 1;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Adjusts a line's quantity by a signed delta.
    ///
    /// ## Behavior
    /// - New quantity ≤ 0: the line is removed. Zero is a removal signal,
    ///   never a stored state.
    /// - No line for the id: no-op. Stale UI state (double-clicked remove,
    ///   out-of-date render) must not error.
    pub fn change_quantity(&mut self, product_id: i64, delta: i64) -> CoreResult<()> {
        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return Ok(());
        };

        let new_quantity = line.quantity + delta;
        if new_quantity <= 0 {
            self.lines.retain(|l| l.product_id != product_id);
            return Ok(());
        }
        if new_quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        line.quantity = new_quantity;
        Ok(())
    }

    /// Removes a line unconditionally; no-op when absent.
    pub fn remove_line(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Clears all lines and resets sale metadata.
    ///
    /// Guarded: a non-empty cart is an in-progress sale, so interactive
    /// callers must pass `confirmed = true` (the UI's confirm dialog).
    /// The post-checkout clear confirms programmatically.
    pub fn clear(&mut self, confirmed: bool) -> CoreResult<()> {
        if !self.lines.is_empty() && !confirmed {
            return Err(CoreError::ClearNotConfirmed);
        }
        self.lines.clear();
        self.customer_name = WALK_IN_CUSTOMER.to_string();
        self.payment_method = PaymentMethod::default();
        Ok(())
    }

    /// Sets the customer name; empty input falls back to the walk-in default.
    pub fn set_customer(&mut self, name: &str) {
        let trimmed = name.trim();
        self.customer_name = if trimmed.is_empty() {
            WALK_IN_CUSTOMER.to_string()
        } else {
            trimmed.to_string()
        };
    }

    /// Sets the payment method.
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// The ordered lines, for display.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Computes subtotal, tax, and grand total for the current cart state.
    ///
    /// Pure function of cart contents and the rate: subtotal accumulates
    /// unrounded cent values, tax is computed once over the subtotal, and
    /// the displayed total equals subtotal + tax. The server recomputes the
    /// confirmed totals at checkout; where they differ, the server value on
    /// the invoice wins.
    pub fn totals(&self, rate: TaxRate) -> CartTotals {
        let subtotal: Money = self
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total());
        let tax = subtotal.calculate_tax(rate);
        CartTotals {
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            total_cents: (subtotal + tax).cents(),
        }
    }

    /// Builds the immutable checkout snapshot for the current cart state.
    pub fn snapshot(&self) -> CoreResult<CheckoutRequest> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        Ok(CheckoutRequest {
            lines: self
                .lines
                .iter()
                .map(|l| CheckoutLine {
                    product_id: l.product_id,
                    name: l.name.clone(),
                    unit_price_cents: l.unit_price_cents,
                    quantity: l.quantity,
                })
                .collect(),
            customer_name: self.customer_name.clone(),
            payment_method: self.payment_method,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
