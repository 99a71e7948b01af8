//! # till-client: REST Client for the Shop Backend
//!
//! Owns every byte that crosses the wire to the backend: catalog queries,
//! barcode lookup, checkout submission, and the back-office CRUD surface.
//!
//! The backend is treated as a black box and as the single source of truth
//! for stock. This crate never caches catalog state, never decrements stock
//! locally, and never retries a checkout on its own.
//!
//! ## Modules
//!
//! - [`client`] - [`BackendClient`], one method per endpoint
//! - [`wire`] - serde DTOs and wire ↔ domain conversion (floats stop there)
//! - [`error`] - [`ClientError`] taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use till_client::BackendClient;
//!
//! # async fn demo() -> Result<(), till_client::ClientError> {
//! let client = BackendClient::new("http://127.0.0.1:8000")?;
//! let catalog = client.list_products().await?;
//! println!("{} products in stock", catalog.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod wire;

pub use client::{BackendClient, DEFAULT_TIMEOUT};
pub use error::{ClientError, ClientResult};
pub use wire::{NewProduct, ProductUpdate};
