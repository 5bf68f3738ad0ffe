//! Wire types for the bodega services.
//!
//! Field names follow the services' JSON exactly (largely Spanish). Outgoing
//! money amounts are sent as JSON numbers; incoming ones are accepted as
//! numbers or numeric strings.

use bodega_core::{Email, OrderId, OrderStatus, Price, ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Inventory
// =============================================================================

/// Product record from `GET /inventory`.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItem {
    pub id: ProductId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio: Price,
    pub stock: u32,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub imagen_url: Option<String>,
}

/// Body of `PUT /inventory/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct StockUpdateRequest<'a> {
    pub name: &'a str,
    pub category: &'a str,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

// =============================================================================
// Auth
// =============================================================================

/// User object embedded in auth responses.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: UserId,
    #[serde(alias = "name", default)]
    pub nombre: String,
    pub email: Email,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub nombre: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of login and register: `{token, user}` or `{error}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<WireUser>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `GET /auth/verify`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub user: WireUser,
}

// =============================================================================
// Orders
// =============================================================================

/// One line of `POST /pedidos`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest<'a> {
    pub product_id: ProductId,
    pub name: &'a str,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `POST /pedidos`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest<'a> {
    pub items: Vec<OrderItemRequest<'a>>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub direccion: &'a str,
    #[serde(rename = "metodoPago")]
    pub metodo_pago: &'a str,
}

/// Order reference in a successful `POST /pedidos` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
}

/// Response of `POST /pedidos`: `{success, pedido:{id}}` or `{success:false, message}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    #[serde(default)]
    pub pedido: Option<CreatedOrder>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Line of a past order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistoryItem {
    #[serde(alias = "name", default)]
    pub nombre: String,
    #[serde(alias = "quantity", default)]
    pub cantidad: u32,
    #[serde(alias = "price", default)]
    pub precio: Price,
}

/// Past order from `GET /pedidos/usuario`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistoryEntry {
    pub id: OrderId,
    #[serde(default)]
    pub fecha_creacion: Option<String>,
    #[serde(default)]
    pub estado: OrderStatus,
    pub total: Price,
    #[serde(default)]
    pub items: Vec<OrderHistoryItem>,
    #[serde(default)]
    pub direccion_entrega: Option<String>,
    #[serde(default)]
    pub metodo_pago: Option<String>,
}

/// Response of `GET /pedidos/usuario`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderHistoryResponse {
    pub success: bool,
    #[serde(default)]
    pub pedidos: Vec<OrderHistoryEntry>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body returned alongside non-success statuses.
///
/// The auth service uses `error`, the orders service `message`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The first non-empty message in the body.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error
            .into_iter()
            .chain(self.message)
            .find(|m| !m.trim().is_empty())
    }
}
