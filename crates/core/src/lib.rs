//! Bodega Core - Shared types library.
//!
//! This crate provides the domain types shared by every bodega component:
//! - `storefront` - Catalog, cart, session and order submission logic
//! - `cli` - Terminal presentation of the storefront
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
