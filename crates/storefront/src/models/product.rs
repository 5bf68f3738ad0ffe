//! Catalog product.

use bodega_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// A product as held by the catalog cache.
///
/// Replaced wholesale on every successful catalog refresh; the stock value
/// is whatever the inventory service reported at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: u32,
    pub category: String,
    pub image_url: String,
}

impl Product {
    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Case-insensitive substring match on name or category.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.category.to_lowercase().contains(needle)
    }
}
