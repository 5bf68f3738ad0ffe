//! Bodega storefront library.
//!
//! Client-side core of the bodega storefront: the catalog cache, the cart,
//! the session, and the order submission flow, all driven through
//! [`state::AppState`] against the bodega inventory, auth and orders
//! services.
//!
//! # Example
//!
//! ```rust,ignore
//! use bodega_storefront::api::BodegaClient;
//! use bodega_storefront::config::StorefrontConfig;
//! use bodega_storefront::state::AppState;
//! use bodega_storefront::store::FileStore;
//!
//! let config = StorefrontConfig::from_env()?;
//! let client = BodegaClient::new(&config.api)?;
//! let mut state = AppState::new(client, FileStore::new(&config.data_dir), config.checkout);
//! for notice in state.start().await {
//!     println!("{notice}");
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
