//! Order submission and stock reconciliation.
//!
//! A checkout runs in three sequential steps:
//!
//! 1. Place the order with the orders service, built fresh from the cart.
//! 2. Write the new stock level of every ordered product to the inventory
//!    service. These writes are issued together and joined; a single failure
//!    fails the batch and nothing already written is rolled back.
//! 3. On full success, clear the cart in memory and in the store.
//!
//! New stock levels are derived from the catalog snapshot taken before the
//! order, not re-read with it. Orders placed concurrently by other clients
//! can therefore leave inventory under- or over-decremented.

use bodega_core::{OrderId, ProductId};
use futures::future::join_all;
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiError, InventoryApi, OrdersApi, StockUpdate};
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::config::CheckoutDefaults;
use crate::models::{OrderConfirmation, OrderDraft};
use crate::session::{AuthToken, Session};
use crate::store::{KeyValueStore, keys};

/// Errors that can end a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nobody is logged in. No request was made.
    #[error("you must be logged in to place an order")]
    NotLoggedIn,

    /// The cart has no lines. No request was made.
    #[error("your cart is empty")]
    EmptyCart,

    /// A previous submission has not finished yet.
    #[error("an order is already being submitted")]
    InProgress,

    /// The orders service refused or could not be reached.
    #[error("order was not placed: {0}")]
    Rejected(#[source] ApiError),

    /// The order was placed but some stock levels were not written.
    #[error("order {order_id} placed but {} stock update(s) failed", .report.failures.len())]
    StockSync {
        order_id: OrderId,
        report: StockSyncReport,
    },
}

impl CheckoutError {
    /// Whether the checkout was refused before any network call.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::NotLoggedIn | Self::EmptyCart | Self::InProgress)
    }
}

/// A stock write that did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdateFailure {
    pub product_id: ProductId,
    pub name: String,
    pub reason: String,
}

/// Aggregated result of the stock write batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockSyncReport {
    /// Products whose stock was written.
    pub updated: Vec<ProductId>,
    /// Products whose stock was not written.
    pub failures: Vec<StockUpdateFailure>,
}

impl StockSyncReport {
    /// Whether every write succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Checkout service.
pub struct CheckoutService<'a, A, S> {
    api: &'a A,
    store: &'a S,
    defaults: &'a CheckoutDefaults,
}

impl<'a, A, S> CheckoutService<'a, A, S>
where
    A: InventoryApi + OrdersApi,
    S: KeyValueStore,
{
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(api: &'a A, store: &'a S, defaults: &'a CheckoutDefaults) -> Self {
        Self {
            api,
            store,
            defaults,
        }
    }

    /// Place an order for the cart contents and reconcile stock.
    ///
    /// The cart is cleared only when every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotLoggedIn` or `CheckoutError::EmptyCart`
    /// before any network call.
    /// Returns `CheckoutError::Rejected` if the order was not placed.
    /// Returns `CheckoutError::StockSync` if the order was placed but some
    /// stock writes failed; the cart is kept.
    #[instrument(skip_all, fields(lines = cart.lines().len()))]
    pub async fn submit(
        &self,
        session: &Session,
        cart: &mut Cart,
        catalog: &Catalog,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let Some((user, token)) = session.authenticated() else {
            return Err(CheckoutError::NotLoggedIn);
        };
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let draft = OrderDraft::from_cart(cart, self.defaults);
        let order_id = self
            .api
            .place_order(token, &draft)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "order submission failed");
                CheckoutError::Rejected(e)
            })?;
        tracing::info!(order_id = %order_id, total = %draft.total, "order placed");

        let report = self.sync_stock(token, cart, catalog).await;
        if !report.is_complete() {
            tracing::error!(
                order_id = %order_id,
                failed = report.failures.len(),
                updated = report.updated.len(),
                "stock synchronization incomplete"
            );
            return Err(CheckoutError::StockSync { order_id, report });
        }

        let confirmation = OrderConfirmation {
            order_id,
            customer: user.clone(),
            lines: cart.lines().to_vec(),
            total: draft.total,
        };

        cart.clear();
        if let Err(e) = self.store.remove(keys::CART) {
            tracing::warn!(error = %e, "could not clear stored cart");
        }

        Ok(confirmation)
    }

    /// Write the post-order stock level of every cart line, all at once.
    async fn sync_stock(&self, token: &AuthToken, cart: &Cart, catalog: &Catalog) -> StockSyncReport {
        let (updates, mut failures) = plan_stock_updates(cart, catalog);

        let results = join_all(updates.iter().map(|update| async move {
            (update, self.api.update_stock(token, update).await)
        }))
        .await;

        let mut updated = Vec::with_capacity(results.len());
        for (update, result) in results {
            match result {
                Ok(()) => updated.push(update.product_id),
                Err(e) => {
                    tracing::warn!(product_id = %update.product_id, error = %e, "stock update failed");
                    failures.push(StockUpdateFailure {
                        product_id: update.product_id,
                        name: update.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        StockSyncReport { updated, failures }
    }
}

/// New stock level per cart line: cached stock minus ordered quantity.
///
/// A line whose product is no longer cached cannot be written and is
/// reported as a failure.
fn plan_stock_updates(cart: &Cart, catalog: &Catalog) -> (Vec<StockUpdate>, Vec<StockUpdateFailure>) {
    let mut updates = Vec::with_capacity(cart.lines().len());
    let mut failures = Vec::new();

    for line in cart.lines() {
        match catalog.product(line.product_id) {
            Some(product) => updates.push(StockUpdate {
                product_id: product.id,
                name: product.name.clone(),
                category: product.category.clone(),
                quantity: product.stock.saturating_sub(line.quantity),
                price: product.price,
            }),
            None => failures.push(StockUpdateFailure {
                product_id: line.product_id,
                name: line.name.clone(),
                reason: "product is no longer in the catalog".to_string(),
            }),
        }
    }

    (updates, failures)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bodega_core::{Email, Price, UserId};
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::tests::product;
    use crate::models::User;
    use crate::store::MemoryStore;
    use crate::testing::{ApiCall, FakeApi};

    fn ana() -> User {
        User {
            id: UserId::new(1),
            name: "Ana".to_string(),
            email: Email::parse("ana@bodega.test").unwrap(),
        }
    }

    fn logged_in(store: &MemoryStore) -> Session {
        let mut session = Session::new();
        session
            .establish(store, ana(), AuthToken::new("jwt-ana"))
            .unwrap();
        session
    }

    fn fixture(api: FakeApi) -> (FakeApi, Catalog) {
        let products = vec![
            product(1, "Rice", "Granos", 1000, 5),
            product(2, "Beans", "Granos", 1500, 3),
        ];
        let mut catalog = Catalog::new();
        catalog.replace(products.clone());
        let api = api
            .with_products(products)
            .with_account(ana(), "secreto1", "jwt-ana");
        (api, catalog)
    }

    #[tokio::test]
    async fn test_rice_order_sends_total_and_clears_cart() {
        let (api, catalog) = fixture(FakeApi::new());
        let store = MemoryStore::new();
        let session = logged_in(&store);
        let defaults = CheckoutDefaults::default();

        let mut cart = Cart::new();
        cart.add(&catalog, ProductId::new(1)).unwrap();
        cart.add(&catalog, ProductId::new(1)).unwrap();
        cart.save(&store).unwrap();

        let confirmation = CheckoutService::new(&api, &store, &defaults)
            .submit(&session, &mut cart, &catalog)
            .await
            .unwrap();

        let placed = api.placed_orders();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].total.amount(), Decimal::new(2000, 2));
        assert_eq!(placed[0].payment_method, "efectivo");

        assert_eq!(confirmation.total, Price::from_cents(2000));
        assert_eq!(confirmation.customer, ana());
        assert_eq!(confirmation.lines[0].quantity, 2);

        assert!(cart.is_empty());
        assert!(store.get(keys::CART).unwrap().is_none());
        assert_eq!(api.products()[0].stock, 3);
    }

    #[tokio::test]
    async fn test_preconditions_make_no_requests() {
        let (api, catalog) = fixture(FakeApi::new());
        let store = MemoryStore::new();
        let defaults = CheckoutDefaults::default();
        let service = CheckoutService::new(&api, &store, &defaults);

        let mut cart = Cart::new();
        cart.add(&catalog, ProductId::new(2)).unwrap();
        let before = cart.clone();

        let err = service
            .submit(&Session::new(), &mut cart, &catalog)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NotLoggedIn));
        assert_eq!(cart, before);

        let session = logged_in(&store);
        let err = service
            .submit(&session, &mut Cart::new(), &catalog)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(err.is_precondition());

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_order_keeps_cart_and_skips_stock() {
        let (api, catalog) = fixture(FakeApi::new().reject_orders());
        let store = MemoryStore::new();
        let session = logged_in(&store);
        let defaults = CheckoutDefaults::default();

        let mut cart = Cart::new();
        cart.add(&catalog, ProductId::new(1)).unwrap();

        let err = CheckoutService::new(&api, &store, &defaults)
            .submit(&session, &mut cart, &catalog)
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Rejected(_)));
        assert_eq!(cart.total_items(), 1);
        assert!(
            !api.calls()
                .iter()
                .any(|c| matches!(c, ApiCall::UpdateStock(_)))
        );
    }

    #[tokio::test]
    async fn test_partial_stock_failure_is_reported_without_rollback() {
        let (api, catalog) = fixture(FakeApi::new().fail_stock_update_for(ProductId::new(2)));
        let store = MemoryStore::new();
        let session = logged_in(&store);
        let defaults = CheckoutDefaults::default();

        let mut cart = Cart::new();
        cart.add(&catalog, ProductId::new(1)).unwrap();
        cart.add(&catalog, ProductId::new(2)).unwrap();

        let err = CheckoutService::new(&api, &store, &defaults)
            .submit(&session, &mut cart, &catalog)
            .await
            .unwrap_err();

        let CheckoutError::StockSync { report, .. } = err else {
            panic!("expected stock sync failure");
        };
        assert_eq!(report.updated, vec![ProductId::new(1)]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].product_id, ProductId::new(2));

        // The successful write stays applied and the cart is kept.
        assert_eq!(api.products()[0].stock, 4);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(api.placed_orders().len(), 1);
    }

    #[test]
    fn test_plan_uses_cached_stock_and_saturates() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![product(1, "Rice", "Granos", 1000, 2)]);
        let mut cart = Cart::new();
        cart.add(&catalog, ProductId::new(1)).unwrap();
        cart.add(&catalog, ProductId::new(1)).unwrap();

        // The cached stock drops below the cart quantity after the line was added.
        catalog.replace(vec![product(1, "Rice", "Granos", 1000, 1)]);
        let (updates, failures) = plan_stock_updates(&cart, &catalog);
        assert_eq!(updates[0].quantity, 0);
        assert!(failures.is_empty());

        catalog.replace(Vec::new());
        let (updates, failures) = plan_stock_updates(&cart, &catalog);
        assert!(updates.is_empty());
        assert_eq!(failures[0].name, "Rice");
    }
}
