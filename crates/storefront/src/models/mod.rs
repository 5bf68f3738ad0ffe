//! Domain models for the storefront.
//!
//! These are the validated shapes the rest of the crate works with. Wire
//! formats used by the bodega API live in [`crate::api::types`] and are
//! converted into these types at the client boundary.

pub mod order;
pub mod product;
pub mod user;

pub use order::{OrderConfirmation, OrderDraft, OrderLine, OrderRecord, OrderRecordItem};
pub use product::Product;
pub use user::User;
