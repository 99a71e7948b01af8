//! # Backend Client
//!
//! Async REST client for the shop backend.
//!
//! ## Endpoint Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Backend REST Surface                           │
//! │                                                                     │
//! │  Terminal path                     Admin path                       │
//! │  ─────────────                     ──────────                       │
//! │  GET  /products        (in stock)  GET    /products/all             │
//! │  GET  /products/{identifier}       POST   /products                 │
//! │  GET  /product/{id}                PUT    /products/{id}            │
//! │  POST /checkout                    DELETE /products/{id}            │
//! │                                    GET    /invoices[/{id}]          │
//! │  GET  /health                      DELETE /invoices/{id}            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Mapping
//! - lookup 404            → `ClientError::NotFound` (expected mis-scan)
//! - other non-2xx          → `ClientError::Rejected` with the backend's
//!   structured `detail` when the body carries one
//! - timeout                → `ClientError::Timeout`
//! - connect/read failures  → `ClientError::Transport`
//!
//! The client is stateless between calls: no caching, no local stock
//! bookkeeping, and never an automatic checkout retry (checkout is not
//! idempotent from this side of the wire).

use std::time::Duration;

use reqwest::{Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use till_core::types::{CheckoutRequest, Invoice, Product};

use crate::error::{ClientError, ClientResult};
use crate::wire::{CheckoutBody, InvoiceWire, NewProduct, ProductUpdate, ProductWire, RejectionBody};

/// Default request timeout applied when the host doesn't configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Backend Client
// =============================================================================

/// REST client for the catalog / invoicing backend.
///
/// Cheap to clone; the underlying `reqwest::Client` holds the connection
/// pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl BackendClient {
    /// Creates a client for the given base URL with the default timeout.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit per-request timeout.
    ///
    /// Every request is bounded: an unbounded checkout round-trip would
    /// leave the terminal wedged in `Submitting` for as long as the network
    /// misbehaves.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        // Url::join treats a base without a trailing slash as a file path
        // and would drop the last segment, so normalize here.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url =
            Url::parse(&normalized).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(BackendClient {
            http,
            base_url,
            timeout,
        })
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))
    }

    // =========================================================================
    // Catalog (terminal path)
    // =========================================================================

    /// Fetches the sellable catalog (backend filters to stock > 0).
    ///
    /// Used to populate the product grid and re-queried after every
    /// confirmed checkout to reflect server-side stock decrements.
    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        debug!("GET /products");
        let response = self.get(self.url("products")?).await?;
        let wires: Vec<ProductWire> = self.decode(response).await?;
        Ok(wires.into_iter().map(Product::from).collect())
    }

    /// Fetches the full catalog regardless of stock (admin grid).
    pub async fn list_all_products(&self) -> ClientResult<Vec<Product>> {
        debug!("GET /products/all");
        let response = self.get(self.url("products/all")?).await?;
        let wires: Vec<ProductWire> = self.decode(response).await?;
        Ok(wires.into_iter().map(Product::from).collect())
    }

    /// Resolves a scanned or typed barcode/identifier to exactly one product.
    ///
    /// A 404 maps to [`ClientError::NotFound`]: mis-scans are routine and the
    /// caller needs to tell them apart from the backend being down.
    pub async fn find_by_identifier(&self, identifier: &str) -> ClientResult<Product> {
        debug!(identifier, "GET /products/{{identifier}}");
        let response = self
            .get(self.url(&format!("products/{identifier}"))?)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                identifier: identifier.to_string(),
            });
        }
        let wire: ProductWire = self.decode(response).await?;
        Ok(Product::from(wire))
    }

    /// Fetches one product by numeric id.
    pub async fn get_product(&self, id: i64) -> ClientResult<Product> {
        debug!(id, "GET /product/{{id}}");
        let response = self.get(self.url(&format!("product/{id}"))?).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                identifier: id.to_string(),
            });
        }
        let wire: ProductWire = self.decode(response).await?;
        Ok(Product::from(wire))
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submits a checkout snapshot; the backend atomically decrements stock
    /// and creates the invoice.
    ///
    /// Sent exactly once per call. Any non-2xx becomes `Rejected` with the
    /// backend's `detail` captured for the operator; the caller decides
    /// whether a fresh attempt is warranted.
    pub async fn checkout(&self, request: &CheckoutRequest) -> ClientResult<Invoice> {
        let body = CheckoutBody::from(request);
        debug!(
            lines = body.cart.len(),
            customer = %body.customer_name,
            method = %body.payment_method,
            "POST /checkout"
        );

        let response = self
            .http
            .post(self.url("checkout")?)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        let wire: InvoiceWire = self.decode(response).await?;
        Ok(Invoice::from(wire))
    }

    // =========================================================================
    // Admin CRUD (back office)
    // =========================================================================

    /// Creates a catalog product.
    pub async fn create_product(&self, new: &NewProduct) -> ClientResult<Product> {
        debug!(name = %new.name, "POST /products");
        let response = self
            .http
            .post(self.url("products")?)
            .json(new)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        let wire: ProductWire = self.decode(response).await?;
        Ok(Product::from(wire))
    }

    /// Updates product fields; absent fields keep their current value.
    pub async fn update_product(&self, id: i64, update: &ProductUpdate) -> ClientResult<Product> {
        debug!(id, "PUT /products/{{id}}");
        let response = self
            .http
            .put(self.url(&format!("products/{id}"))?)
            .json(update)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                identifier: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        let wire: ProductWire = self.decode(response).await?;
        Ok(Product::from(wire))
    }

    /// Deletes a product. The backend refuses when the product appears on
    /// any invoice; that refusal comes back as `Rejected` with its detail.
    pub async fn delete_product(&self, id: i64) -> ClientResult<()> {
        debug!(id, "DELETE /products/{{id}}");
        let response = self
            .http
            .delete(self.url(&format!("products/{id}"))?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                identifier: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        Ok(())
    }

    /// Lists invoices, latest first.
    pub async fn list_invoices(&self) -> ClientResult<Vec<Invoice>> {
        debug!("GET /invoices");
        let response = self.get(self.url("invoices")?).await?;
        let wires: Vec<InvoiceWire> = self.decode(response).await?;
        Ok(wires.into_iter().map(Invoice::from).collect())
    }

    /// Fetches one invoice.
    pub async fn get_invoice(&self, id: i64) -> ClientResult<Invoice> {
        debug!(id, "GET /invoices/{{id}}");
        let response = self.get(self.url(&format!("invoices/{id}"))?).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                identifier: id.to_string(),
            });
        }
        let wire: InvoiceWire = self.decode(response).await?;
        Ok(Invoice::from(wire))
    }

    /// Deletes an invoice (refused by the backend when it has items).
    pub async fn delete_invoice(&self, id: i64) -> ClientResult<()> {
        debug!(id, "DELETE /invoices/{{id}}");
        let response = self
            .http
            .delete(self.url(&format!("invoices/{id}"))?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                identifier: id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        Ok(())
    }

    /// Liveness probe against `GET /health`.
    pub async fn health(&self) -> ClientResult<()> {
        let response = self.get(self.url("health")?).await?;
        if !response.status().is_success() {
            return Err(self.rejection(response).await);
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn get(&self, url: Url) -> ClientResult<Response> {
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))
    }

    async fn decode<T: serde::de::DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(self.rejection(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse {
                message: e.to_string(),
            })
    }

    /// Extracts the backend's structured reason from a failure response.
    async fn rejection(&self, response: Response) -> ClientError {
        let status = response.status().as_u16();
        let detail = match response.json::<RejectionBody>().await {
            Ok(body) => body.detail_message(),
            Err(e) => {
                warn!(status, error = %e, "failure response body was not JSON");
                None
            }
        };
        ClientError::Rejected { status, detail }
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ClientError::Transport {
                message: err.to_string(),
            }
        }
    }
}

// =============================================================================
// Integration-Style Tests (against a fake axum backend)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use till_core::types::{CheckoutLine, PaymentMethod};

    /// Binds a router on an ephemeral port and returns its base URL.
    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn checkout_request() -> CheckoutRequest {
        CheckoutRequest {
            lines: vec![CheckoutLine {
                product_id: 1,
                name: "Widget".to_string(),
                unit_price_cents: 1000,
                quantity: 2,
            }],
            customer_name: "Walk-in Customer".to_string(),
            payment_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_list_products_converts_wire_floats() {
        let router = Router::new().route(
            "/products",
            get(|| async {
                Json(json!([
                    {"id": 1, "name": "Laptop", "price": 999.99, "stock": 10,
                     "barcode": "123456", "created_at": "2024-01-05T09:30:00"},
                    {"id": 2, "name": "USB-C Cable", "price": 15.99, "stock": 100,
                     "barcode": "123460", "created_at": null}
                ]))
            }),
        );
        let base = spawn_backend(router).await;

        let client = BackendClient::new(&base).unwrap();
        let products = client.list_products().await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price_cents, 99999);
        assert_eq!(products[1].price_cents, 1599);
        assert!(products[0].created_at.is_some());
        assert!(products[1].created_at.is_none());
    }

    #[tokio::test]
    async fn test_find_by_identifier_maps_404_to_not_found() {
        let router = Router::new().route(
            "/products/{identifier}",
            get(|Path(identifier): Path<String>| async move {
                if identifier == "123456" {
                    Json(json!({"id": 1, "name": "Laptop", "price": 999.99, "stock": 10}))
                        .into_response()
                } else {
                    (StatusCode::NOT_FOUND, Json(json!({"detail": "Product not found"})))
                        .into_response()
                }
            }),
        );
        let base = spawn_backend(router).await;
        let client = BackendClient::new(&base).unwrap();

        let hit = client.find_by_identifier("123456").await.unwrap();
        assert_eq!(hit.name, "Laptop");

        let miss = client.find_by_identifier("UNKNOWN").await.unwrap_err();
        assert!(matches!(
            miss,
            ClientError::NotFound { ref identifier } if identifier == "UNKNOWN"
        ));
    }

    #[tokio::test]
    async fn test_checkout_success_returns_invoice() {
        let router = Router::new().route(
            "/checkout",
            post(|Json(body): Json<serde_json::Value>| async move {
                // echo the submitted totals back the way the backend does
                assert_eq!(body["cart"][0]["price"], 10.0);
                Json(json!({
                    "id": 41,
                    "customer_name": body["customer_name"],
                    "total_amount": 21.6,
                    "tax_amount": 1.6,
                    "payment_method": body["payment_method"],
                    "created_at": "2024-01-05T09:30:00",
                    "items": [
                        {"id": 1, "product_id": 1, "quantity": 2, "unit_price": 10.0,
                         "product": {"id": 1, "name": "Widget", "price": 10.0, "stock": 3}}
                    ]
                }))
            }),
        );
        let base = spawn_backend(router).await;
        let client = BackendClient::new(&base).unwrap();

        let invoice = client.checkout(&checkout_request()).await.unwrap();
        assert_eq!(invoice.id, 41);
        assert_eq!(invoice.total_cents, 2160);
        assert_eq!(invoice.tax_cents, 160);
        assert_eq!(invoice.lines[0].name, "Widget");
    }

    #[tokio::test]
    async fn test_checkout_rejection_carries_detail_verbatim() {
        let router = Router::new().route(
            "/checkout",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "Not enough stock for Widget"})),
                )
            }),
        );
        let base = spawn_backend(router).await;
        let client = BackendClient::new(&base).unwrap();

        let err = client.checkout(&checkout_request()).await.unwrap_err();
        match err {
            ClientError::Rejected { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail.as_deref(), Some("Not enough stock for Widget"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_without_json_body_has_no_detail() {
        let router = Router::new().route(
            "/checkout",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_backend(router).await;
        let client = BackendClient::new(&base).unwrap();

        let err = client.checkout(&checkout_request()).await.unwrap_err();
        match err {
            ClientError::Rejected { status, detail } => {
                assert_eq!(status, 500);
                assert_eq!(detail, None);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_backend_surfaces_timeout() {
        let router = Router::new().route(
            "/products",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([]))
            }),
        );
        let base = spawn_backend(router).await;
        let client = BackendClient::with_timeout(&base, Duration::from_millis(100)).unwrap();

        let err = client.list_products().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        // nothing listens here
        let client = BackendClient::new("http://127.0.0.1:9").unwrap();
        let err = client.list_products().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_admin_product_crud_round_trip() {
        let router = Router::new()
            .route(
                "/products",
                post(|Json(body): Json<serde_json::Value>| async move {
                    Json(json!({
                        "id": 9,
                        "name": body["name"],
                        "price": body["price"],
                        "stock": body["stock"],
                        "barcode": body["barcode"]
                    }))
                }),
            )
            .route(
                "/products/{id}",
                axum::routing::put(|Path(id): Path<i64>, Json(body): Json<serde_json::Value>| async move {
                    Json(json!({
                        "id": id,
                        "name": "Mechanical Keyboard",
                        "price": body["price"],
                        "stock": 30
                    }))
                })
                .delete(|Path(_id): Path<i64>| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Cannot delete product as it is used in invoice items."})),
                    )
                }),
            );
        let base = spawn_backend(router).await;
        let client = BackendClient::new(&base).unwrap();

        let created = client
            .create_product(&NewProduct::new("Webcam", 4999, 20).with_barcode("123461"))
            .await
            .unwrap();
        assert_eq!(created.id, 9);
        assert_eq!(created.price_cents, 4999);

        let updated = client
            .update_product(3, &ProductUpdate::default().price_cents(6900))
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 6900);

        let err = client.delete_product(3).await.unwrap_err();
        assert_eq!(
            err.detail(),
            Some("Cannot delete product as it is used in invoice items.")
        );
    }
}
