//! Cart commands.

use bodega_storefront::api::StorefrontApi;
use bodega_storefront::cart::QuantityDelta;
use bodega_storefront::error::AppError;
use bodega_storefront::state::AppState;
use bodega_storefront::store::KeyValueStore;

use super::{CartAction, Output};
use crate::render;

/// Apply a cart action and show the resulting cart.
///
/// # Errors
///
/// Returns `AppError::Cart` if the storefront refuses the change.
pub fn run<A, S>(state: &mut AppState<A, S>, action: CartAction) -> Result<Output, AppError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    let notice = match action {
        CartAction::Show => return Ok(Output::text(render::cart(state.cart()))),
        CartAction::Add { product_id } => state.add_to_cart(product_id)?,
        CartAction::Remove { product_id } => state.remove_from_cart(product_id)?,
        CartAction::Inc { product_id } => {
            state.change_quantity(product_id, QuantityDelta::Increment)?
        }
        CartAction::Dec { product_id } => {
            state.change_quantity(product_id, QuantityDelta::Decrement)?
        }
    };
    Ok(Output::text(render::cart(state.cart())).with_notice(notice))
}
