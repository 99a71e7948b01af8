//! # Terminal Session
//!
//! The single sale surface for one terminal: cart mutation, catalog
//! lookups, and checkout orchestration behind one handle.
//!
//! ## State Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       TerminalSession                           │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐   │
//! │  │ Mutex<Cart>  │  │ Mutex<Checkout   │  │ Mutex<Vec<       │   │
//! │  │              │  │       State>     │  │      Product>>   │   │
//! │  │ current sale │  │ attempt lifecycle│  │ catalog cache    │   │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘   │
//! │                                                                 │
//! │  BackendClient ──────────────► backend REST service             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Checkout Flow
//! ```text
//! checkout()
//!   ├── snapshot cart ───► empty? fail fast, no state change, no network
//!   ├── begin()       ───► already Submitting? reject duplicate attempt
//!   ├── POST /checkout (locks released while the request is in flight)
//!   ├── Ok(invoice)   ───► Confirmed, cart cleared, catalog refreshed
//!   │                      (best effort), settle to Idle, Receipt out
//!   └── Err           ───► Rejected with operator message, cart intact,
//!                          settle to Idle, error out
//! ```
//!
//! Whatever happens, the machine ends a checkout attempt back at `Idle`:
//! one slow or failed attempt must never wedge the terminal.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use till_client::BackendClient;
use till_core::cart::{Cart, CartLine, CartTotals};
use till_core::types::{PaymentMethod, Product, TaxRate};

use crate::checkout::CheckoutState;
use crate::config::TerminalConfig;
use crate::error::{TerminalError, TerminalResult};
use crate::receipt::Receipt;

// =============================================================================
// Cart View
// =============================================================================

/// Read-only snapshot of the current sale for display.
///
/// Totals are recomputed from the lines on every view; the session never
/// caches a running total.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub totals: CartTotals,
}

// =============================================================================
// Terminal Session
// =============================================================================

/// One terminal's live state: current cart, checkout attempt lifecycle,
/// and a cached product catalog.
///
/// All methods take `&self`; interior mutexes serialize access so the
/// session can sit behind a shared handle (UI thread plus background
/// refreshes).
pub struct TerminalSession {
    client: BackendClient,
    tax_rate: TaxRate,
    default_customer: String,
    cart: Mutex<Cart>,
    checkout: Mutex<CheckoutState>,
    catalog: Mutex<Vec<Product>>,
}

impl TerminalSession {
    /// Creates a session from an already-built client.
    pub fn new(client: BackendClient, tax_rate: TaxRate) -> Self {
        TerminalSession {
            client,
            tax_rate,
            default_customer: till_core::WALK_IN_CUSTOMER.to_string(),
            cart: Mutex::new(Cart::new()),
            checkout: Mutex::new(CheckoutState::Idle),
            catalog: Mutex::new(Vec::new()),
        }
    }

    /// Creates a session from deployment configuration.
    pub fn from_config(config: &TerminalConfig) -> TerminalResult<Self> {
        let client =
            BackendClient::with_timeout(&config.backend.base_url, config.request_timeout())?;
        let mut session = Self::new(client, config.tax_rate());
        session.default_customer = config.sale.default_customer.clone();
        session
            .cart_guard()
            .set_customer(&config.sale.default_customer);
        Ok(session)
    }

    // -------------------------------------------------------------------------
    // Lock helpers
    // -------------------------------------------------------------------------

    fn cart_guard(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().expect("cart mutex poisoned")
    }

    fn checkout_guard(&self) -> MutexGuard<'_, CheckoutState> {
        self.checkout.lock().expect("checkout state mutex poisoned")
    }

    fn catalog_guard(&self) -> MutexGuard<'_, Vec<Product>> {
        self.catalog.lock().expect("catalog mutex poisoned")
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Fetches in-stock products from the backend and replaces the cache.
    pub async fn refresh_catalog(&self) -> TerminalResult<Vec<Product>> {
        let products = self.client.list_products().await?;
        debug!(count = products.len(), "catalog refreshed");
        *self.catalog_guard() = products.clone();
        Ok(products)
    }

    /// The cached catalog from the last successful refresh.
    pub fn catalog(&self) -> Vec<Product> {
        self.catalog_guard().clone()
    }

    /// Looks up a product by barcode or id and adds it to the cart.
    ///
    /// An unknown identifier surfaces as [`TerminalError::NotFound`] and
    /// leaves the cart untouched.
    pub async fn scan(&self, identifier: &str) -> TerminalResult<CartView> {
        let product = self.client.find_by_identifier(identifier).await?;
        self.add_product(&product)
    }

    // -------------------------------------------------------------------------
    // Cart Operations
    // -------------------------------------------------------------------------

    /// Adds one unit of a product (merging into an existing line).
    pub fn add_product(&self, product: &Product) -> TerminalResult<CartView> {
        let mut cart = self.cart_guard();
        cart.add_product(product)?;
        debug!(product_id = product.id, name = %product.name, "added to cart");
        Ok(self.view(&cart))
    }

    /// Adjusts a line's quantity by a signed delta.
    pub fn change_quantity(&self, product_id: i64, delta: i64) -> TerminalResult<CartView> {
        let mut cart = self.cart_guard();
        cart.change_quantity(product_id, delta)?;
        Ok(self.view(&cart))
    }

    /// Removes a line entirely.
    pub fn remove_line(&self, product_id: i64) -> CartView {
        let mut cart = self.cart_guard();
        cart.remove_line(product_id);
        self.view(&cart)
    }

    /// Abandons the current sale. Requires `confirmed` when the cart is
    /// non-empty.
    pub fn clear_cart(&self, confirmed: bool) -> TerminalResult<CartView> {
        let mut cart = self.cart_guard();
        cart.clear(confirmed)?;
        cart.set_customer(&self.default_customer);
        info!("cart cleared");
        Ok(self.view(&cart))
    }

    /// Sets the customer name for the current sale (blank resets to the
    /// default).
    pub fn set_customer(&self, name: &str) -> CartView {
        let mut cart = self.cart_guard();
        cart.set_customer(name);
        if cart.customer_name.is_empty() {
            cart.set_customer(&self.default_customer);
        }
        self.view(&cart)
    }

    /// Sets the payment method for the current sale.
    pub fn set_payment_method(&self, method: PaymentMethod) -> CartView {
        let mut cart = self.cart_guard();
        cart.set_payment_method(method);
        self.view(&cart)
    }

    /// Current sale snapshot for display.
    pub fn cart_view(&self) -> CartView {
        self.view(&self.cart_guard())
    }

    /// Current checkout attempt state.
    pub fn checkout_state(&self) -> CheckoutState {
        self.checkout_guard().clone()
    }

    fn view(&self, cart: &Cart) -> CartView {
        CartView {
            lines: cart.lines().to_vec(),
            customer_name: cart.customer_name.clone(),
            payment_method: cart.payment_method,
            totals: cart.totals(self.tax_rate),
        }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Submits the current cart to the backend.
    ///
    /// On confirmation the cart resets for the next customer and the
    /// catalog cache is refreshed (best effort; the sale is already
    /// durable). On rejection the cart is preserved exactly so the
    /// operator can amend and retry. Either way the attempt machine
    /// settles back to `Idle`.
    pub async fn checkout(&self) -> TerminalResult<Receipt> {
        // snapshot and begin under lock: an empty cart fails before any
        // state change or network traffic, and a second submission while
        // one is in flight is refused here
        let request = {
            let cart = self.cart_guard();
            let mut state = self.checkout_guard();
            let request = cart.snapshot()?;
            *state = state.begin()?;
            request
        };

        info!(
            lines = request.lines.len(),
            customer = %request.customer_name,
            "submitting checkout"
        );

        // locks are released here; cart edits during flight affect only
        // the next attempt, never this snapshot
        let outcome = self.client.checkout(&request).await;

        match outcome {
            Ok(invoice) => {
                {
                    let mut state = self.checkout_guard();
                    *state = state.confirm(invoice.id);
                }
                info!(
                    invoice_id = invoice.id,
                    total_cents = invoice.total_cents,
                    "checkout confirmed"
                );

                {
                    let mut cart = self.cart_guard();
                    cart.clear(true)?;
                    cart.set_customer(&self.default_customer);
                }

                // stock changed on the backend; refresh the cache but never
                // fail a confirmed sale over it
                if let Err(err) = self.refresh_catalog().await {
                    warn!(error = %err, "catalog refresh after checkout failed");
                }

                let receipt = Receipt::from(&invoice);
                let mut state = self.checkout_guard();
                *state = state.settle();
                Ok(receipt)
            }
            Err(err) => {
                let err = TerminalError::from(err);
                let reason = err.operator_message();
                warn!(reason = %reason, "checkout rejected");

                let mut state = self.checkout_guard();
                *state = state.reject(reason);
                *state = state.settle();
                Err(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        format!("http://{addr}")
    }

    fn widget_json() -> Value {
        json!({
            "id": 1,
            "name": "Widget",
            "price": 10.0,
            "stock": 5,
            "barcode": "111",
            "created_at": "2024-06-01T12:00:00"
        })
    }

    /// Fake shop: one product, checkout confirms and counts hits.
    fn shop_router(hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route("/products", get(|| async { Json(json!([widget_json()])) }))
            .route(
                "/products/{identifier}",
                get(|Path(identifier): Path<String>| async move {
                    if identifier == "111" || identifier == "1" {
                        Json(widget_json()).into_response()
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"detail": "Product not found"})))
                            .into_response()
                    }
                }),
            )
            .route(
                "/checkout",
                post(move |Json(body): Json<Value>| {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let items: Vec<Value> = body["cart"]
                            .as_array()
                            .unwrap()
                            .iter()
                            .map(|item| {
                                json!({
                                    "product_id": item["product_id"],
                                    "quantity": item["quantity"],
                                    "unit_price": item["price"],
                                    "product": widget_json(),
                                })
                            })
                            .collect();
                        Json(json!({
                            "id": 7,
                            "customer_name": body["customer_name"],
                            "total_amount": 21.60,
                            "tax_amount": 1.60,
                            "payment_method": body["payment_method"],
                            "created_at": "2024-06-01T12:34:56",
                            "items": items,
                        }))
                    }
                }),
            )
    }

    fn session_for(base: &str) -> TerminalSession {
        let client = BackendClient::new(base).expect("client");
        TerminalSession::new(client, TaxRate::from_bps(800))
    }

    #[tokio::test]
    async fn test_scan_adds_and_merges() {
        let base = spawn_backend(shop_router(Arc::new(AtomicUsize::new(0)))).await;
        let session = session_for(&base);

        session.scan("111").await.unwrap();
        let view = session.scan("111").await.unwrap();

        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.totals.subtotal_cents, 2000);
        assert_eq!(view.totals.tax_cents, 160);
        assert_eq!(view.totals.total_cents, 2160);
    }

    #[tokio::test]
    async fn test_scan_unknown_leaves_cart_unchanged() {
        let base = spawn_backend(shop_router(Arc::new(AtomicUsize::new(0)))).await;
        let session = session_for(&base);
        session.scan("111").await.unwrap();
        let before = session.cart_view();

        let err = session.scan("999").await.unwrap_err();
        assert!(matches!(err, TerminalError::NotFound { .. }));
        assert_eq!(session.cart_view(), before);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_never_reaches_backend() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_backend(shop_router(hits.clone())).await;
        let session = session_for(&base);

        let err = session.checkout().await.unwrap_err();
        assert!(matches!(err, TerminalError::EmptyCart));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(session.checkout_state().is_idle());
    }

    #[tokio::test]
    async fn test_confirmed_checkout_resets_for_next_customer() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_backend(shop_router(hits.clone())).await;
        let session = session_for(&base);

        session.scan("111").await.unwrap();
        session.scan("111").await.unwrap();

        let receipt = session.checkout().await.unwrap();
        assert_eq!(receipt.invoice_id, 7);
        assert_eq!(receipt.total.cents(), 2160);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // cart is reset, catalog was refreshed, machine settled
        let view = session.cart_view();
        assert!(view.lines.is_empty());
        assert_eq!(view.customer_name, "Walk-in Customer");
        assert_eq!(session.catalog().len(), 1);
        assert!(session.checkout_state().is_idle());

        // the next checkout is a fresh sale, not a resubmission
        let err = session.checkout().await.unwrap_err();
        assert!(matches!(err, TerminalError::EmptyCart));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_checkout_preserves_cart() {
        let router = Router::new()
            .route(
                "/products/{identifier}",
                get(|| async { Json(widget_json()) }),
            )
            .route(
                "/checkout",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Not enough stock for Widget"})),
                    )
                }),
            );
        let base = spawn_backend(router).await;
        let session = session_for(&base);

        session.scan("111").await.unwrap();
        let before = session.cart_view();

        let err = session.checkout().await.unwrap_err();
        // backend detail is surfaced verbatim
        assert_eq!(err.operator_message(), "Not enough stock for Widget");
        // the cart is exactly as it was, ready to amend and retry
        assert_eq!(session.cart_view(), before);
        assert!(session.checkout_state().is_idle());
    }

    #[tokio::test]
    async fn test_duplicate_submission_refused() {
        let slow = Router::new()
            .route(
                "/products/{identifier}",
                get(|| async { Json(widget_json()) }),
            )
            .route(
                "/checkout",
                post(|Json(body): Json<Value>| async move {
                    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
                    Json(json!({
                        "id": 8,
                        "customer_name": body["customer_name"],
                        "total_amount": 10.80,
                        "tax_amount": 0.80,
                        "payment_method": body["payment_method"],
                        "items": [],
                    }))
                }),
            );
        let base = spawn_backend(slow).await;
        let session = session_for(&base);
        session.scan("111").await.unwrap();

        let (first, second) = tokio::join!(session.checkout(), session.checkout());
        let results = [first, second];
        let confirmed = results.iter().filter(|r| r.is_ok()).count();
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(TerminalError::CheckoutInProgress)))
            .count();
        assert_eq!(confirmed, 1);
        assert_eq!(refused, 1);
        assert!(session.checkout_state().is_idle());
    }

    #[tokio::test]
    async fn test_unreachable_backend_reports_transport_message() {
        // nothing listens on this port
        let session = session_for("http://127.0.0.1:9");
        let product = Product {
            id: 1,
            name: "Widget".to_string(),
            price_cents: 1000,
            stock: 5,
            barcode: None,
            created_at: None,
        };
        session.add_product(&product).unwrap();

        let err = session.checkout().await.unwrap_err();
        assert!(matches!(err, TerminalError::Transport { .. }));
        // transport tier: a concrete message, not the generic fallback
        let message = err.operator_message();
        assert!(!message.is_empty());
        assert_ne!(message, "Checkout failed");
        assert!(session.checkout_state().is_idle());
        assert_eq!(session.cart_view().lines.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let base = spawn_backend(shop_router(Arc::new(AtomicUsize::new(0)))).await;
        let session = session_for(&base);
        session.scan("111").await.unwrap();

        let err = session.clear_cart(false).unwrap_err();
        assert!(matches!(err, TerminalError::ClearNotConfirmed));
        assert_eq!(session.cart_view().lines.len(), 1);

        let view = session.clear_cart(true).unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.customer_name, "Walk-in Customer");
        assert_eq!(view.payment_method, PaymentMethod::Cash);
    }
}
