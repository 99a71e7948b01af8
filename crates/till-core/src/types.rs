//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌──────────────────┐   ┌──────────────────┐   │
//! │  │   Product     │   │ CheckoutRequest  │   │    Invoice       │   │
//! │  │ ───────────── │   │ ───────────────  │   │ ──────────────── │   │
//! │  │ id (i64)      │   │ lines (snapshot) │   │ id               │   │
//! │  │ name          │   │ customer_name    │   │ total_cents      │   │
//! │  │ price_cents   │   │ payment_method   │   │ tax_cents        │   │
//! │  │ stock         │   └──────────────────┘   │ lines            │   │
//! │  │ barcode       │                          └──────────────────┘   │
//! │  └───────────────┘                                                 │
//! │                                                                    │
//! │  Product is owned by the backend; the terminal treats every fetch  │
//! │  as a read-only snapshot. Invoice is the backend's durable record  │
//! │  of a completed sale - the terminal only displays it.              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% (the observed deployment default)
///
/// A rate is deployment configuration, never a hard-coded business rule;
/// see `till-terminal`'s config for where the value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Owned and mutated exclusively by the backend. The terminal treats each
/// fetch as immutable; cart lines copy the fields they need rather than
/// holding a reference into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique numeric identifier assigned by the backend.
    pub id: i64,

    /// Display name shown to the operator and on the receipt.
    pub name: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Current stock level. Authoritative only at checkout; the terminal
    /// never decrements this locally.
    pub stock: i64,

    /// Scannable barcode, unique when present.
    pub barcode: Option<String>,

    /// When the product was created (backend clock).
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the unit price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether the backend reports any sellable stock.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
///
/// The payment method is a label on the sale, not a gateway integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Digital wallet / QR payment.
    Digital,
}

impl PaymentMethod {
    /// The wire label the backend stores ("cash" | "card" | "digital").
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Digital => "digital",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "digital" => Ok(PaymentMethod::Digital),
            other => Err(CoreError::UnknownPaymentMethod {
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Checkout Request
// =============================================================================

/// One line of a checkout submission.
///
/// Carries the add-time snapshot, not live product data: the price the
/// customer was shown is the price that gets invoiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

/// Immutable snapshot of a cart submitted to the backend.
///
/// Constructed once per checkout attempt and sent once. A retry is a new
/// operator-initiated attempt with a fresh snapshot of whatever the cart
/// contains at that moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub lines: Vec<CheckoutLine>,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
}

// =============================================================================
// Invoice
// =============================================================================

/// A line item on a confirmed invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product_id: i64,
    /// Product name as resolved by the backend at invoicing time.
    pub name: String,
    pub quantity: i64,
    /// Unit price actually charged, in cents.
    pub unit_price_cents: i64,
}

impl InvoiceLine {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// The backend's durable, confirmed record of a completed sale.
///
/// The terminal treats this as an opaque confirmation to display. Where the
/// client-side estimate and the server totals disagree, the server value on
/// this record wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub customer_name: String,
    /// Grand total charged, in cents.
    pub total_cents: i64,
    /// Tax portion of the total, in cents.
    pub tax_cents: i64,
    /// Payment method label as the backend stored it.
    pub payment_method: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Ordered line items, each carrying the charged unit price.
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    /// Subtotal before tax, derived from the server totals.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.total_cents - self.tax_cents)
    }

    /// Grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
