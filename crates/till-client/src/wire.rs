//! # Wire DTOs
//!
//! Serde types matching the backend's JSON surface, and conversions into
//! the domain types from `till-core`.
//!
//! ## Why a separate layer?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Wire ↔ Domain Boundary                          │
//! │                                                                     │
//! │  Backend JSON                      till-core domain                 │
//! │  ────────────                      ────────────────                 │
//! │  "price": 25.5   (float dollars)   price_cents: 2550 (i64)          │
//! │  "created_at": "2024-01-05T09:..." DateTime<Utc> (tolerant parse)   │
//! │  "payment_method": "cash"          PaymentMethod / String           │
//! │                                                                     │
//! │  Floats and naive timestamps stop HERE. Everything past this file   │
//! │  is integer cents and chrono types.                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The backend emits timestamps from a UTC clock without a timezone
//! suffix, so parsing tries RFC 3339 first and falls back to a naive
//! ISO-8601 form interpreted as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use till_core::money::Money;
use till_core::types::{CheckoutRequest, Invoice, InvoiceLine, Product};

// =============================================================================
// Timestamp Parsing
// =============================================================================

/// Parses a backend timestamp, tolerating the naive UTC form.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// =============================================================================
// Product
// =============================================================================

/// Product record as the backend serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductWire {
    pub id: i64,
    pub name: String,
    /// Float dollars on the wire; converted to cents immediately.
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<ProductWire> for Product {
    fn from(wire: ProductWire) -> Self {
        Product {
            id: wire.id,
            name: wire.name,
            price_cents: Money::from_major_units(wire.price).cents(),
            stock: wire.stock,
            barcode: wire.barcode,
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Body for `POST /products` (admin).
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

impl NewProduct {
    /// Builds an admin create body from domain values (cents in, floats out).
    pub fn new(name: impl Into<String>, price_cents: i64, stock: i64) -> Self {
        NewProduct {
            name: name.into(),
            price: Money::from_cents(price_cents).to_major_units(),
            stock,
            barcode: None,
        }
    }

    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }
}

/// Body for `PUT /products/{id}` (admin). Absent fields are left unchanged
/// by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

impl ProductUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price_cents(mut self, cents: i64) -> Self {
        self.price = Some(Money::from_cents(cents).to_major_units());
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// One cart line in the checkout body.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutItemBody {
    pub product_id: i64,
    pub name: String,
    /// Float dollars: the backend multiplies `price * quantity` to rebuild
    /// the subtotal from exactly what we send.
    pub price: f64,
    pub quantity: i64,
}

/// Body for `POST /checkout`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutBody {
    pub cart: Vec<CheckoutItemBody>,
    pub customer_name: String,
    pub payment_method: String,
}

impl From<&CheckoutRequest> for CheckoutBody {
    fn from(request: &CheckoutRequest) -> Self {
        CheckoutBody {
            cart: request
                .lines
                .iter()
                .map(|line| CheckoutItemBody {
                    product_id: line.product_id,
                    name: line.name.clone(),
                    price: Money::from_cents(line.unit_price_cents).to_major_units(),
                    quantity: line.quantity,
                })
                .collect(),
            customer_name: request.customer_name.clone(),
            payment_method: request.payment_method.to_string(),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// Invoice line item as the backend serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemWire {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    /// Resolved product snapshot; the backend may omit it for deleted
    /// catalog rows.
    #[serde(default)]
    pub product: Option<ProductWire>,
}

/// Invoice as the backend serializes it.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceWire {
    pub id: i64,
    pub customer_name: String,
    pub total_amount: f64,
    pub tax_amount: f64,
    pub payment_method: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<InvoiceItemWire>,
}

impl From<InvoiceWire> for Invoice {
    fn from(wire: InvoiceWire) -> Self {
        Invoice {
            id: wire.id,
            customer_name: wire.customer_name,
            total_cents: Money::from_major_units(wire.total_amount).cents(),
            tax_cents: Money::from_major_units(wire.tax_amount).cents(),
            payment_method: wire.payment_method,
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
            lines: wire
                .items
                .into_iter()
                .map(|item| InvoiceLine {
                    product_id: item.product_id,
                    name: item
                        .product
                        .map(|p| p.name)
                        .unwrap_or_else(|| format!("Item #{}", item.product_id)),
                    quantity: item.quantity,
                    unit_price_cents: Money::from_major_units(item.unit_price).cents(),
                })
                .collect(),
        }
    }
}

// =============================================================================
// Rejection Body
// =============================================================================

/// Structured error body the backend attaches to non-2xx responses.
///
/// `detail` is usually a string, but framework-level validation errors ship
/// an array of objects, so we accept any JSON value and stringify.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectionBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl RejectionBody {
    /// The human-readable reason, verbatim when the backend sent a string.
    pub fn detail_message(&self) -> Option<String> {
        match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
