//! Checkout and order history.

use bodega_storefront::api::StorefrontApi;
use bodega_storefront::error::AppError;
use bodega_storefront::notice::Notice;
use bodega_storefront::state::AppState;
use bodega_storefront::store::KeyValueStore;

use super::Output;
use crate::render;

/// Submit the cart. Prints a progress line while the order is in flight.
///
/// # Errors
///
/// Returns `AppError::Checkout` if the order is not placed or stock could
/// not be reconciled.
pub async fn checkout<A, S>(state: &mut AppState<A, S>) -> Result<Output, AppError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    if !state.cart().is_empty() && state.session().is_authenticated() {
        render::emit("Submitting order...");
    }
    let confirmation = state.checkout().await?;
    let notice = Notice::success(format!("Order #{} placed", confirmation.order_id));
    Ok(Output::text(render::confirmation(&confirmation)).with_notice(notice))
}

/// # Errors
///
/// Returns `AppError::NotLoggedIn` for anonymous sessions, or
/// `AppError::Api` if the history cannot be fetched.
pub async fn history<A, S>(state: &mut AppState<A, S>) -> Result<Output, AppError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    let orders = state.show_order_history().await?;
    Ok(Output::text(render::orders(orders)))
}
