//! HTTP client for the bodega services.

use std::sync::Arc;

use bodega_core::OrderId;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::api::types::{
    AuthResponse, CreateOrderRequest, CreateOrderResponse, ErrorBody, InventoryItem,
    LoginRequest, OrderHistoryResponse, OrderItemRequest, RegisterRequest, StockUpdateRequest,
    VerifyResponse,
};
use crate::api::{
    ApiError, AuthApi, AuthGrant, InventoryApi, LoginCredentials, OrdersApi, Registration,
    StockUpdate,
};
use crate::config::ApiConfig;
use crate::models::{OrderDraft, OrderRecord, Product, User};
use crate::session::AuthToken;

/// Longest slice of a response body kept in logs and error messages.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the bodega inventory, auth and orders services.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct BodegaClient {
    inner: Arc<BodegaClientInner>,
}

struct BodegaClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for BodegaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodegaClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl BodegaClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bodega-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(BodegaClientInner {
                client,
                base_url: with_trailing_slash(config.base_url.clone()),
            }),
        })
    }

    /// The base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        Ok(self.inner.client.request(method, url))
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-success statuses become [`ApiError::Status`] carrying the
    /// service's `error`/`message` text when it sent one.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| excerpt(&body));
            tracing::warn!(
                status = %status,
                body = %excerpt(&body),
                "bodega API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse bodega API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl InventoryApi for BodegaClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let items: Vec<InventoryItem> = self.send(self.request(Method::GET, "inventory")?).await?;
        debug!(count = items.len(), "fetched inventory");
        Ok(items.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self, token), fields(product_id = %update.product_id, quantity = update.quantity))]
    async fn update_stock(&self, token: &AuthToken, update: &StockUpdate) -> Result<(), ApiError> {
        let body = StockUpdateRequest {
            name: &update.name,
            category: &update.category,
            quantity: update.quantity,
            price: update.price.amount(),
        };
        let request = self
            .request(Method::PUT, &format!("inventory/{}", update.product_id))?
            .bearer_auth(token.expose())
            .json(&body);

        // The updated record is echoed back; only success matters here.
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}

impl AuthApi for BodegaClient {
    #[instrument(skip(self, token))]
    async fn verify(&self, token: &AuthToken) -> Result<User, ApiError> {
        let request = self
            .request(Method::GET, "auth/verify")?
            .bearer_auth(token.expose());
        let response: VerifyResponse = self.send(request).await?;
        Ok(response.user.into())
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError> {
        let request = self.request(Method::POST, "auth/login")?.json(&LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
        });
        into_grant(self.send(request).await?)
    }

    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ApiError> {
        let request = self
            .request(Method::POST, "auth/register")?
            .json(&RegisterRequest {
                nombre: &registration.name,
                email: &registration.email,
                password: &registration.password,
            });
        into_grant(self.send(request).await?)
    }
}

impl OrdersApi for BodegaClient {
    #[instrument(skip(self, token, draft), fields(lines = draft.lines.len(), total = %draft.total))]
    async fn place_order(&self, token: &AuthToken, draft: &OrderDraft) -> Result<OrderId, ApiError> {
        let body = CreateOrderRequest {
            items: draft
                .lines
                .iter()
                .map(|line| OrderItemRequest {
                    product_id: line.product_id,
                    name: &line.name,
                    quantity: line.quantity,
                    price: line.price.amount(),
                })
                .collect(),
            total: draft.total.amount(),
            direccion: &draft.delivery_address,
            metodo_pago: &draft.payment_method,
        };
        let request = self
            .request(Method::POST, "pedidos")?
            .bearer_auth(token.expose())
            .json(&body);

        let response: CreateOrderResponse = self.send(request).await?;
        match response {
            CreateOrderResponse {
                success: true,
                pedido: Some(order),
                ..
            } => Ok(order.id),
            CreateOrderResponse { message, .. } => Err(ApiError::Rejected(
                message.unwrap_or_else(|| "order was not accepted".to_string()),
            )),
        }
    }

    #[instrument(skip(self, token))]
    async fn order_history(&self, token: &AuthToken) -> Result<Vec<OrderRecord>, ApiError> {
        let request = self
            .request(Method::GET, "pedidos/usuario")?
            .bearer_auth(token.expose());
        let response: OrderHistoryResponse = self.send(request).await?;

        if !response.success {
            return Err(ApiError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "order history unavailable".to_string()),
            ));
        }
        Ok(response.pedidos.into_iter().map(OrderRecord::from).collect())
    }
}

/// Turn a login/register response into a grant, or the service's refusal.
fn into_grant(response: AuthResponse) -> Result<AuthGrant, ApiError> {
    match response {
        AuthResponse {
            token: Some(token),
            user: Some(user),
            ..
        } if !token.is_empty() => Ok(AuthGrant {
            token: AuthToken::new(token),
            user: user.into(),
        }),
        AuthResponse { error, .. } => Err(ApiError::Rejected(
            error.unwrap_or_else(|| "authentication failed".to_string()),
        )),
    }
}

/// Make sure relative joins append to the base path instead of replacing
/// its last segment.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BodegaClient {
        BodegaClient::new(&ApiConfig {
            base_url: Url::parse(base).unwrap(),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoints_resolve_under_base_path() {
        let client = client("http://localhost:3000/api");
        assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");

        let request = client.request(Method::GET, "pedidos/usuario").unwrap();
        let request = request.build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:3000/api/pedidos/usuario"
        );
    }

    #[test]
    fn test_stock_update_endpoint_includes_product_id() {
        let client = client("https://bodega.test/");
        let request = client
            .request(Method::PUT, &format!("inventory/{}", 12))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://bodega.test/inventory/12");
        assert_eq!(request.method(), Method::PUT);
    }

    #[test]
    fn test_into_grant_success() {
        let response: AuthResponse = serde_json::from_value(serde_json::json!({
            "token": "jwt-abc",
            "user": {"id": 5, "nombre": "Ana", "email": "ana@bodega.test"}
        }))
        .unwrap();

        let grant = into_grant(response).unwrap();
        assert_eq!(grant.token.expose(), "jwt-abc");
        assert_eq!(grant.user.name, "Ana");
    }

    #[test]
    fn test_into_grant_surfaces_error_message() {
        let response: AuthResponse =
            serde_json::from_value(serde_json::json!({"error": "El email ya está registrado"}))
                .unwrap();

        let err = into_grant(response).unwrap_err();
        assert_eq!(err.server_message(), Some("El email ya está registrado"));
    }

    #[test]
    fn test_create_order_request_shape() {
        let body = CreateOrderRequest {
            items: vec![OrderItemRequest {
                product_id: bodega_core::ProductId::new(1),
                name: "Arroz",
                quantity: 2,
                price: rust_decimal::Decimal::new(1000, 2),
            }],
            total: rust_decimal::Decimal::new(2000, 2),
            direccion: "Retiro en tienda",
            metodo_pago: "efectivo",
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["total"], serde_json::json!(20.0));
        assert_eq!(json["metodoPago"], "efectivo");
        assert_eq!(json["items"][0]["productId"], 1);
        assert_eq!(json["items"][0]["price"], serde_json::json!(10.0));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(500);
        assert_eq!(excerpt(&long).len(), BODY_EXCERPT_CHARS);
    }
}
