//! # Receipt Rendering
//!
//! Turns a confirmed invoice into an operator-facing receipt.
//!
//! The backend's totals are authoritative: a receipt is built from the
//! invoice the backend returned, never from the terminal's own cart math.
//! If the two ever disagree, the printed receipt must match what was
//! actually billed.

use chrono::{DateTime, Utc};

use till_core::money::Money;
use till_core::types::Invoice;

// =============================================================================
// Receipt Types
// =============================================================================

/// One printed line on a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A rendered record of a confirmed sale.
#[derive(Debug, Clone)]
pub struct Receipt {
    pub invoice_id: i64,
    pub customer_name: String,
    pub payment_method: String,
    pub created_at: Option<DateTime<Utc>>,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl From<&Invoice> for Receipt {
    fn from(invoice: &Invoice) -> Self {
        let lines = invoice
            .lines
            .iter()
            .map(|line| {
                let unit_price = Money::from_cents(line.unit_price_cents);
                ReceiptLine {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price,
                    line_total: unit_price.multiply_quantity(line.quantity),
                }
            })
            .collect();

        Receipt {
            invoice_id: invoice.id,
            customer_name: invoice.customer_name.clone(),
            payment_method: invoice.payment_method.clone(),
            created_at: invoice.created_at,
            lines,
            subtotal: invoice.subtotal(),
            tax: invoice.tax(),
            total: invoice.total(),
        }
    }
}

impl std::fmt::Display for Receipt {
    /// Plain-text rendering, 40 columns, suitable for a thermal printer.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:=^40}", " RECEIPT ")?;
        writeln!(f, "Invoice #{}", self.invoice_id)?;
        if let Some(created_at) = self.created_at {
            writeln!(f, "{}", created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        writeln!(f, "Customer: {}", self.customer_name)?;
        writeln!(f, "{:-<40}", "")?;
        for line in &self.lines {
            writeln!(f, "{}", line.name)?;
            writeln!(
                f,
                "  {} x {:<12} {:>18}",
                line.quantity,
                line.unit_price.to_string(),
                line.line_total.to_string()
            )?;
        }
        writeln!(f, "{:-<40}", "")?;
        writeln!(f, "{:<20}{:>20}", "Subtotal", self.subtotal.to_string())?;
        writeln!(f, "{:<20}{:>20}", "Tax", self.tax.to_string())?;
        writeln!(f, "{:<20}{:>20}", "TOTAL", self.total.to_string())?;
        writeln!(f, "Paid by: {}", self.payment_method)?;
        write!(f, "{:=^40}", "")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use till_core::types::InvoiceLine;

    fn sample_invoice() -> Invoice {
        Invoice {
            id: 42,
            customer_name: "Walk-in Customer".to_string(),
            total_cents: 2700,
            tax_cents: 200,
            payment_method: "cash".to_string(),
            created_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, 14, 30, 0).unwrap()),
            lines: vec![
                InvoiceLine {
                    product_id: 1,
                    name: "Widget".to_string(),
                    quantity: 2,
                    unit_price_cents: 1000,
                },
                InvoiceLine {
                    product_id: 2,
                    name: "Gadget".to_string(),
                    quantity: 1,
                    unit_price_cents: 500,
                },
            ],
        }
    }

    #[test]
    fn test_receipt_uses_server_totals() {
        let mut invoice = sample_invoice();
        // server billed something other than what the lines sum to;
        // server wins
        invoice.total_cents = 2600;
        invoice.tax_cents = 100;

        let receipt = Receipt::from(&invoice);
        assert_eq!(receipt.total, Money::from_cents(2600));
        assert_eq!(receipt.tax, Money::from_cents(100));
        assert_eq!(receipt.subtotal, Money::from_cents(2500));
    }

    #[test]
    fn test_receipt_lines() {
        let receipt = Receipt::from(&sample_invoice());
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[0].line_total, Money::from_cents(2000));
        assert_eq!(receipt.lines[1].line_total, Money::from_cents(500));
    }

    #[test]
    fn test_receipt_rendering() {
        let rendered = Receipt::from(&sample_invoice()).to_string();
        assert!(rendered.contains("Invoice #42"));
        assert!(rendered.contains("Widget"));
        assert!(rendered.contains("$27.00"));
        assert!(rendered.contains("Paid by: cash"));
    }
}
