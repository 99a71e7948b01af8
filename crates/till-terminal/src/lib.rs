//! # Till Terminal
//!
//! Terminal-side orchestration for Till POS: sale session state, checkout
//! lifecycle, receipts, and deployment configuration.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        till-terminal                            │
//! │                                                                 │
//! │  session ──── TerminalSession (cart + checkout + catalog)       │
//! │  checkout ─── CheckoutState attempt lifecycle                   │
//! │  receipt ──── rendering of confirmed invoices                   │
//! │  config ───── TOML + env deployment configuration               │
//! │  error ────── TerminalError with operator messages              │
//! └─────────────────────────────────────────────────────────────────┘
//!                │                          │
//!                ▼                          ▼
//!           till-core                  till-client
//!        (pure sale logic)          (backend REST client)
//! ```

pub mod checkout;
pub mod config;
pub mod error;
pub mod receipt;
pub mod session;

pub use checkout::CheckoutState;
pub use config::{ConfigError, TerminalConfig};
pub use error::{TerminalError, TerminalResult};
pub use receipt::{Receipt, ReceiptLine};
pub use session::{CartView, TerminalSession};

/// Initializes tracing for a terminal process.
///
/// `RUST_LOG` wins when set; the default keeps our crates at debug and
/// the rest at info.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,till=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
