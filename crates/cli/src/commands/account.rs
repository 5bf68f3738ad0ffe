//! Login, registration and logout.

use bodega_storefront::api::StorefrontApi;
use bodega_storefront::error::AppError;
use bodega_storefront::state::AppState;
use bodega_storefront::store::KeyValueStore;

use super::Output;
use crate::render;

/// # Errors
///
/// Returns `AppError::Auth` if the login is refused.
pub async fn login<A, S>(
    state: &mut AppState<A, S>,
    email: &str,
    password: &str,
) -> Result<Output, AppError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    Ok(Output::notice(state.login(email, password).await?))
}

/// # Errors
///
/// Returns `AppError::Auth` if the registration is refused.
pub async fn register<A, S>(
    state: &mut AppState<A, S>,
    name: &str,
    email: &str,
    password: &str,
) -> Result<Output, AppError>
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    Ok(Output::notice(state.register(name, email, password).await?))
}

pub fn logout<A, S>(state: &mut AppState<A, S>) -> Output
where
    A: StorefrontApi,
    S: KeyValueStore,
{
    Output::notice(state.logout())
}

pub fn whoami<A, S>(state: &AppState<A, S>) -> Output {
    Output::text(render::user(state.session().user()))
}
