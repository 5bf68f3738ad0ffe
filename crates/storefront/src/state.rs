//! Application state owned by the presentation layer.
//!
//! `AppState` is the single owner of the catalog cache, the cart and the
//! session. Every user intent is a method on it that returns a [`Notice`] or
//! an [`AppError`]; nothing else mutates these three stores.

use bodega_core::ProductId;
use tracing::instrument;

use crate::api::StorefrontApi;
use crate::cart::{Cart, QuantityChange, QuantityDelta};
use crate::catalog::Catalog;
use crate::config::CheckoutDefaults;
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{OrderConfirmation, OrderRecord, User};
use crate::notice::Notice;
use crate::services::{AuthService, CheckoutError, CheckoutService, TokenCheck};
use crate::session::Session;
use crate::store::KeyValueStore;

/// The view the user is looking at.
///
/// Views that depend on identity are re-fetched on every session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Catalog,
    Cart,
    OrderHistory,
}

/// Storefront controller.
pub struct AppState<A, S> {
    api: A,
    store: S,
    checkout_defaults: CheckoutDefaults,
    catalog: Catalog,
    cart: Cart,
    session: Session,
    view: ActiveView,
    order_history: Vec<OrderRecord>,
    submitting: bool,
}

impl<A: StorefrontApi, S: KeyValueStore> AppState<A, S> {
    /// Create the state, restoring the persisted cart.
    ///
    /// The session starts anonymous and the catalog empty; call
    /// [`start`](Self::start) to verify the stored token and fetch products.
    pub fn new(api: A, store: S, checkout_defaults: CheckoutDefaults) -> Self {
        let cart = Cart::load(&store);
        Self {
            api,
            store,
            checkout_defaults,
            catalog: Catalog::new(),
            cart,
            session: Session::new(),
            view: ActiveView::default(),
            order_history: Vec::new(),
            submitting: false,
        }
    }

    /// Startup: restore the session from the stored token and load the catalog.
    #[instrument(skip_all)]
    pub async fn start(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();

        match AuthService::new(&self.api, &self.store)
            .check_existing_token(&mut self.session)
            .await
        {
            TokenCheck::Verified(user) => {
                set_sentry_user(&user);
                notices.push(Notice::info(format!("Welcome back, {}", user.name)));
            }
            TokenCheck::Rejected => {
                notices.push(Notice::info("Your session has expired, please log in again"));
            }
            TokenCheck::NoToken => {}
        }

        if let Err(e) = self.refresh_catalog().await {
            notices.push(e.into_notice());
        }

        notices
    }

    /// Re-fetch the catalog. The cached products are kept on failure.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` if the inventory service call fails.
    pub async fn refresh_catalog(&mut self) -> Result<usize> {
        Ok(self.catalog.refresh(&self.api).await?)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if the product is unknown, out of stock, or
    /// already in the cart at its full stock.
    pub fn add_to_cart(&mut self, product_id: ProductId) -> Result<Notice> {
        let line = self.cart.add(&self.catalog, product_id)?;
        let notice = Notice::success(format!("{} added to your cart", line.name));

        self.persist_cart();
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", &product_id.to_string())]),
        );
        Ok(notice)
    }

    /// Remove a product's line from the cart. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Infallible today; returns `Result` like every other command.
    pub fn remove_from_cart(&mut self, product_id: ProductId) -> Result<Notice> {
        let Some(line) = self.cart.remove(product_id) else {
            return Ok(Notice::info("That product is not in your cart"));
        };

        self.persist_cart();
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", &product_id.to_string())]),
        );
        Ok(Notice::success(format!("{} removed from your cart", line.name)))
    }

    /// Step a line's quantity by one unit.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if the line is missing or the product has no
    /// more stock.
    pub fn change_quantity(&mut self, product_id: ProductId, delta: QuantityDelta) -> Result<Notice> {
        let name = self
            .cart
            .line(product_id)
            .map(|line| line.name.clone())
            .unwrap_or_default();

        let notice = match self.cart.change_quantity(&self.catalog, product_id, delta)? {
            QuantityChange::Updated { quantity } => {
                Notice::success(format!("{name}: {quantity} in your cart"))
            }
            QuantityChange::Removed => Notice::success(format!("{name} removed from your cart")),
        };

        self.persist_cart();
        add_breadcrumb(
            "cart",
            "Changed quantity",
            Some(&[("product_id", &product_id.to_string())]),
        );
        Ok(notice)
    }

    /// The cart is mirrored after every mutation; a failed write only logs.
    fn persist_cart(&self) {
        if let Err(e) = self.cart.save(&self.store) {
            tracing::warn!(error = %e, "could not persist cart");
        }
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` if the form is invalid, the credentials are
    /// refused, or the auth service cannot be reached.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Notice> {
        let user = AuthService::new(&self.api, &self.store)
            .login(&mut self.session, email, password)
            .await?;
        self.on_authenticated(&user).await;
        Ok(Notice::success(format!("Welcome, {}", user.name)))
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` if the form is invalid, the registration is
    /// refused, or the auth service cannot be reached.
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Result<Notice> {
        let user = AuthService::new(&self.api, &self.store)
            .register(&mut self.session, name, email, password)
            .await?;
        self.on_authenticated(&user).await;
        Ok(Notice::success(format!("Account created. Welcome, {}", user.name)))
    }

    /// Log out. Identity-dependent views are cleared.
    pub fn logout(&mut self) -> Notice {
        AuthService::new(&self.api, &self.store).logout(&mut self.session);
        clear_sentry_user();
        self.order_history.clear();
        if self.view == ActiveView::OrderHistory {
            self.view = ActiveView::Catalog;
        }
        add_breadcrumb("auth", "Logged out", None);
        Notice::info("You have been logged out")
    }

    async fn on_authenticated(&mut self, user: &User) {
        set_sentry_user(user);
        add_breadcrumb("auth", "Logged in", Some(&[("user_id", &user.id.to_string())]));
        self.refresh_identity_views().await;
    }

    /// Re-fetch the views that depend on who is logged in.
    async fn refresh_identity_views(&mut self) {
        if self.view != ActiveView::OrderHistory {
            return;
        }
        if let Err(e) = self.refresh_order_history().await {
            e.report();
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Switch to the order-history view and load it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotLoggedIn` for anonymous sessions, or
    /// `AppError::Api` if the orders service call fails.
    pub async fn show_order_history(&mut self) -> Result<&[OrderRecord]> {
        if !self.session.is_authenticated() {
            return Err(AppError::NotLoggedIn);
        }
        self.view = ActiveView::OrderHistory;
        self.refresh_order_history().await?;
        Ok(&self.order_history)
    }

    #[instrument(skip_all)]
    async fn refresh_order_history(&mut self) -> Result<()> {
        let token = self.session.token().ok_or(AppError::NotLoggedIn)?;
        self.order_history = self.api.order_history(token).await?;
        tracing::debug!(count = self.order_history.len(), "order history loaded");
        Ok(())
    }

    /// Switch view. The order-history view needs a logged-in user; use
    /// [`show_order_history`](Self::show_order_history) to open it.
    pub fn set_view(&mut self, view: ActiveView) {
        if view == ActiveView::OrderHistory && !self.session.is_authenticated() {
            return;
        }
        self.view = view;
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submit the cart as an order.
    ///
    /// While the submission runs, [`is_submitting`](Self::is_submitting) is
    /// true and further checkouts are refused. After a successful order the
    /// catalog, and the order history when it is open, are re-fetched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Checkout` if a precondition fails, the order is
    /// refused, or stock could not be reconciled.
    #[instrument(skip_all)]
    pub async fn checkout(&mut self) -> Result<OrderConfirmation> {
        if self.submitting {
            return Err(CheckoutError::InProgress.into());
        }

        self.submitting = true;
        let result = CheckoutService::new(&self.api, &self.store, &self.checkout_defaults)
            .submit(&self.session, &mut self.cart, &self.catalog)
            .await;
        self.submitting = false;

        let confirmation = result?;
        add_breadcrumb(
            "checkout",
            "Order placed",
            Some(&[("order_id", &confirmation.order_id.to_string())]),
        );

        if let Err(e) = self.refresh_catalog().await {
            e.report();
        }
        self.refresh_identity_views().await;

        Ok(confirmation)
    }
}

impl<A, S> AppState<A, S> {
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn view(&self) -> ActiveView {
        self.view
    }

    /// Orders loaded by the last history fetch.
    #[must_use]
    pub fn order_history(&self) -> &[OrderRecord] {
        &self.order_history
    }

    /// Whether a checkout is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}
