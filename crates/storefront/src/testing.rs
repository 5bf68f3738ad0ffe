//! In-process stand-in for the bodega services.
//!
//! [`FakeApi`] implements every service trait over plain in-memory state and
//! records each call, so flows can assert exactly which requests were made.

use std::sync::{Mutex, PoisonError};

use bodega_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use crate::api::{
    ApiError, AuthApi, AuthGrant, InventoryApi, LoginCredentials, OrdersApi, Registration,
    StockUpdate,
};
use crate::models::{OrderDraft, OrderRecord, OrderRecordItem, Product, User};
use crate::session::AuthToken;

/// A request received by [`FakeApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListProducts,
    UpdateStock(StockUpdate),
    Verify,
    Login { email: String },
    Register { email: String },
    PlaceOrder(OrderDraft),
    OrderHistory,
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
    token: String,
}

#[derive(Debug, Default)]
struct FakeState {
    products: Vec<Product>,
    accounts: Vec<Account>,
    orders: Vec<(UserId, OrderId, OrderDraft)>,
    offline: bool,
    reject_orders: bool,
    failing_stock: Vec<ProductId>,
    calls: Vec<ApiCall>,
}

/// Fake inventory, auth and orders services.
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the inventory.
    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.with_state(|s| s.products = products);
        self
    }

    /// Register an account that can log in with `password` and is
    /// identified by `token`.
    #[must_use]
    pub fn with_account(self, user: User, password: &str, token: &str) -> Self {
        self.with_state(|s| {
            s.accounts.push(Account {
                user,
                password: password.to_string(),
                token: token.to_string(),
            });
        });
        self
    }

    /// Answer every request with `503 Service Unavailable`.
    #[must_use]
    pub fn offline(self) -> Self {
        self.set_offline(true);
        self
    }

    /// Refuse every order with `success: false`.
    #[must_use]
    pub fn reject_orders(self) -> Self {
        self.with_state(|s| s.reject_orders = true);
        self
    }

    /// Fail stock updates for one product.
    #[must_use]
    pub fn fail_stock_update_for(self, product_id: ProductId) -> Self {
        self.with_state(|s| s.failing_stock.push(product_id));
        self
    }

    /// Toggle connectivity after construction.
    pub fn set_offline(&self, offline: bool) {
        self.with_state(|s| s.offline = offline);
    }

    /// Every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.with_state(|s| s.calls.clone())
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    /// Current inventory.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.with_state(|s| s.products.clone())
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn placed_orders(&self) -> Vec<OrderDraft> {
        self.with_state(|s| s.orders.iter().map(|(_, _, d)| d.clone()).collect())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Record `call` and fail if offline.
    fn receive(&self, call: ApiCall) -> Result<(), ApiError> {
        self.with_state(|s| {
            s.calls.push(call);
            if s.offline {
                Err(status(503, "service unavailable"))
            } else {
                Ok(())
            }
        })
    }

    fn user_for(&self, token: &AuthToken) -> Result<User, ApiError> {
        self.with_state(|s| {
            s.accounts
                .iter()
                .find(|a| a.token == token.expose())
                .map(|a| a.user.clone())
                .ok_or_else(|| status(401, "Token inválido"))
        })
    }
}

fn status(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

impl InventoryApi for FakeApi {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.receive(ApiCall::ListProducts)?;
        Ok(self.products())
    }

    async fn update_stock(&self, token: &AuthToken, update: &StockUpdate) -> Result<(), ApiError> {
        self.receive(ApiCall::UpdateStock(update.clone()))?;
        self.user_for(token)?;
        self.with_state(|s| {
            if s.failing_stock.contains(&update.product_id) {
                return Err(status(500, "inventory write failed"));
            }
            let product = s
                .products
                .iter_mut()
                .find(|p| p.id == update.product_id)
                .ok_or_else(|| status(404, "Producto no encontrado"))?;
            product.stock = update.quantity;
            Ok(())
        })
    }
}

impl AuthApi for FakeApi {
    async fn verify(&self, token: &AuthToken) -> Result<User, ApiError> {
        self.receive(ApiCall::Verify)?;
        self.user_for(token)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthGrant, ApiError> {
        self.receive(ApiCall::Login {
            email: credentials.email.clone(),
        })?;
        self.with_state(|s| {
            s.accounts
                .iter()
                .find(|a| {
                    a.user.email.as_str() == credentials.email && a.password == credentials.password
                })
                .map(|a| AuthGrant {
                    token: AuthToken::new(a.token.clone()),
                    user: a.user.clone(),
                })
                .ok_or_else(|| status(401, "Credenciales inválidas"))
        })
    }

    async fn register(&self, registration: &Registration) -> Result<AuthGrant, ApiError> {
        self.receive(ApiCall::Register {
            email: registration.email.clone(),
        })?;
        self.with_state(|s| {
            if s
                .accounts
                .iter()
                .any(|a| a.user.email.as_str() == registration.email)
            {
                return Err(status(400, "El email ya está registrado"));
            }
            let id = i64::try_from(s.accounts.len()).unwrap_or(i64::MAX) + 1;
            let email =
                Email::parse(&registration.email).map_err(|_| status(400, "Email inválido"))?;
            let account = Account {
                user: User {
                    id: UserId::new(id),
                    name: registration.name.clone(),
                    email,
                },
                password: registration.password.clone(),
                token: format!("token-{id}"),
            };
            let grant = AuthGrant {
                token: AuthToken::new(account.token.clone()),
                user: account.user.clone(),
            };
            s.accounts.push(account);
            Ok(grant)
        })
    }
}

impl OrdersApi for FakeApi {
    async fn place_order(&self, token: &AuthToken, draft: &OrderDraft) -> Result<OrderId, ApiError> {
        self.receive(ApiCall::PlaceOrder(draft.clone()))?;
        let user = self.user_for(token)?;
        self.with_state(|s| {
            if s.reject_orders {
                return Err(ApiError::Rejected("Stock insuficiente".to_string()));
            }
            let id = OrderId::new(i64::try_from(s.orders.len()).unwrap_or(i64::MAX) + 100);
            s.orders.push((user.id, id, draft.clone()));
            Ok(id)
        })
    }

    async fn order_history(&self, token: &AuthToken) -> Result<Vec<OrderRecord>, ApiError> {
        self.receive(ApiCall::OrderHistory)?;
        let user = self.user_for(token)?;
        self.with_state(|s| {
            Ok(s.orders
                .iter()
                .filter(|(owner, _, _)| *owner == user.id)
                .map(|(_, id, draft)| OrderRecord {
                    id: *id,
                    created_at: None,
                    status: OrderStatus::Pending,
                    total: draft.total,
                    items: draft
                        .lines
                        .iter()
                        .map(|line| OrderRecordItem {
                            name: line.name.clone(),
                            quantity: line.quantity,
                            price: line.price,
                        })
                        .collect(),
                    delivery_address: draft.delivery_address.clone(),
                    payment_method: draft.payment_method.clone(),
                })
                .collect())
        })
    }
}
