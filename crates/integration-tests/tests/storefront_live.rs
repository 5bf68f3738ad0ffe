//! Live tests for the storefront flows.
//!
//! These tests require a running bodega API at `BODEGA_API_URL`
//! (default `http://localhost:3000/api`) with at least one product in stock.
//!
//! Run with: cargo test -p bodega-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use bodega_core::Price;
use bodega_integration_tests::{client, unique_email};
use bodega_storefront::api::{AuthApi, InventoryApi, LoginCredentials, OrdersApi, Registration};
use bodega_storefront::config::CheckoutDefaults;
use bodega_storefront::session::{AuthToken, SessionState};
use bodega_storefront::state::AppState;
use bodega_storefront::store::{FileStore, KeyValueStore, keys};

const PASSWORD: &str = "secreto123";

// ============================================================================
// Inventory
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bodega API"]
async fn test_inventory_lists_products() {
    let products = client()
        .list_products()
        .await
        .expect("Failed to list inventory");

    assert!(!products.is_empty(), "inventory should not be empty");
    for product in &products {
        assert!(!product.name.is_empty());
        assert!(product.price >= Price::ZERO);
    }
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bodega API"]
async fn test_register_then_login_then_verify() {
    let api = client();
    let email = unique_email();

    let registered = api
        .register(&Registration {
            name: "Integración".to_string(),
            email: email.clone(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("Failed to register");
    assert_eq!(registered.user.email.as_str(), email);

    let grant = api
        .login(&LoginCredentials {
            email: email.clone(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("Failed to log in");

    let user = api.verify(&grant.token).await.expect("Failed to verify token");
    assert_eq!(user.id, registered.user.id);
}

#[tokio::test]
#[ignore = "Requires running bodega API"]
async fn test_login_with_wrong_password_is_rejected() {
    let api = client();
    let email = unique_email();
    api.register(&Registration {
        name: "Integración".to_string(),
        email: email.clone(),
        password: PASSWORD.to_string(),
    })
    .await
    .expect("Failed to register");

    let err = api
        .login(&LoginCredentials {
            email,
            password: "incorrecta".to_string(),
        })
        .await
        .unwrap_err();

    assert!(err.server_message().is_some(), "expected a server message, got {err}");
}

#[tokio::test]
#[ignore = "Requires running bodega API"]
async fn test_order_history_rejects_unknown_token() {
    let err = client()
        .order_history(&AuthToken::new("not-a-real-token"))
        .await
        .unwrap_err();

    assert!(err.is_unauthorized(), "expected 401/403, got {err}");
}

// ============================================================================
// Full flow
// ============================================================================

#[tokio::test]
#[ignore = "Requires running bodega API"]
async fn test_register_fill_cart_and_checkout() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let mut state = AppState::new(client(), store.clone(), CheckoutDefaults::default());
    state.start().await;

    state
        .register("Integración", &unique_email(), PASSWORD)
        .await
        .expect("Failed to register");
    assert_eq!(state.session().state(), SessionState::Authenticated);

    let product = state
        .catalog()
        .products()
        .iter()
        .find(|p| p.in_stock())
        .cloned()
        .expect("no product in stock");
    state.add_to_cart(product.id).unwrap();
    assert!(store.get(keys::CART).unwrap().is_some());

    let confirmation = state.checkout().await.expect("Checkout failed");

    assert_eq!(confirmation.lines.len(), 1);
    assert_eq!(confirmation.total, product.price);
    assert!(state.cart().is_empty());
    assert!(store.get(keys::CART).unwrap().is_none());

    let refreshed = state.catalog().product(product.id).unwrap();
    assert_eq!(refreshed.stock, product.stock - 1);

    let orders = state.show_order_history().await.expect("Failed to load history");
    assert!(orders.iter().any(|o| o.id == confirmation.order_id));
}

#[tokio::test]
#[ignore = "Requires running bodega API"]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let email = unique_email();

    {
        let mut state =
            AppState::new(client(), FileStore::new(dir.path()), CheckoutDefaults::default());
        state.start().await;
        state
            .register("Integración", &email, PASSWORD)
            .await
            .expect("Failed to register");
    }

    let mut state = AppState::new(client(), FileStore::new(dir.path()), CheckoutDefaults::default());
    state.start().await;

    assert_eq!(state.session().state(), SessionState::Authenticated);
    assert_eq!(state.session().user().unwrap().email.as_str(), email);
}
