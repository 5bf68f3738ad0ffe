//! Cart store: the session's list of products awaiting checkout.
//!
//! Invariants held by every operation:
//! - at most one line per product
//! - every line has a quantity of at least one (a line reaching zero is removed)
//! - a mutation never raises a quantity above the product's cached stock
//!
//! The cart is mirrored to the key-value store under [`keys::CART`]. Loading
//! is best-effort: anything that cannot be parsed, or that breaks the
//! invariants above, is treated as an empty cart.

use bodega_core::{Price, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::models::Product;
use crate::store::{KeyValueStore, StoreError, keys};

/// Reasons a cart mutation is refused.
///
/// None of these change the cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product is not in the catalog cache.
    #[error("Product {0} is not available")]
    ProductNotFound(ProductId),

    /// The product has no stock at all.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// The cart already holds every unit in stock.
    #[error("Only {stock} of {name} available")]
    StockLimitReached { name: String, stock: u32 },

    /// The product is not in the cart.
    #[error("Product {0} is not in your cart")]
    LineNotFound(ProductId),
}

/// A product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub category: String,
}

impl CartLine {
    fn new(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            category: product.category.clone(),
        }
    }

    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A one-unit quantity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityDelta {
    Increment,
    Decrement,
}

impl QuantityDelta {
    /// `+1` or `-1` as a delta; any other step is not supported.
    #[must_use]
    pub const fn from_step(step: i32) -> Option<Self> {
        match step {
            1 => Some(Self::Increment),
            -1 => Some(Self::Decrement),
            _ => None,
        }
    }
}

/// Result of a successful quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now holds `quantity` units.
    Updated { quantity: u32 },
    /// The line dropped to zero and was removed.
    Removed,
}

/// Ordered cart lines; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted cart.
    ///
    /// Never fails: a missing, unreadable, or corrupt snapshot yields an
    /// empty cart.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let raw = match store.get(keys::CART) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored cart, starting empty");
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<CartLine>>(&raw) {
            Ok(lines) if Self::is_consistent(&lines) => Self { lines },
            Ok(_) => {
                tracing::warn!("stored cart breaks cart invariants, starting empty");
                Self::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored cart is corrupt, starting empty");
                Self::new()
            }
        }
    }

    /// Write the full cart to the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub fn save<S: KeyValueStore>(&self, store: &S) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.lines).map_err(|source| StoreError::Serialize {
            key: keys::CART.to_string(),
            source,
        })?;
        store.set(keys::CART, &json)
    }

    fn is_consistent(lines: &[CartLine]) -> bool {
        lines.iter().enumerate().all(|(i, line)| {
            line.quantity >= 1
                && lines
                    .iter()
                    .skip(i + 1)
                    .all(|other| other.product_id != line.product_id)
        })
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of price × quantity across lines.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Add one unit of a product.
    ///
    /// Inserts a new line on first add, otherwise bumps the existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ProductNotFound`] if the product is not in `catalog`
    /// - [`CartError::OutOfStock`] if its stock is zero
    /// - [`CartError::StockLimitReached`] if the cart already holds all of it
    pub fn add(&mut self, catalog: &Catalog, product_id: ProductId) -> Result<&CartLine, CartError> {
        let product = catalog
            .product(product_id)
            .ok_or(CartError::ProductNotFound(product_id))?;

        if !product.in_stock() {
            return Err(CartError::OutOfStock {
                name: product.name.clone(),
            });
        }

        let index = match self.lines.iter().position(|l| l.product_id == product_id) {
            Some(index) => index,
            None => {
                self.lines.push(CartLine::new(product));
                return self.lines.last().ok_or(CartError::LineNotFound(product_id));
            }
        };

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineNotFound(product_id))?;
        if line.quantity >= product.stock {
            return Err(CartError::StockLimitReached {
                name: product.name.clone(),
                stock: product.stock,
            });
        }
        line.quantity += 1;
        Ok(&*line)
    }

    /// Remove a product's line. Returns the removed line, if there was one.
    pub fn remove(&mut self, product_id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product_id == product_id)?;
        Some(self.lines.remove(index))
    }

    /// Step a line's quantity up or down by one.
    ///
    /// Stepping down from one removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`] if the product is not in the cart
    /// - [`CartError::ProductNotFound`] when incrementing a product missing from `catalog`
    /// - [`CartError::StockLimitReached`] when incrementing past the cached stock
    pub fn change_quantity(
        &mut self,
        catalog: &Catalog,
        product_id: ProductId,
        delta: QuantityDelta,
    ) -> Result<QuantityChange, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::LineNotFound(product_id))?;

        match delta {
            QuantityDelta::Increment => {
                let product = catalog
                    .product(product_id)
                    .ok_or(CartError::ProductNotFound(product_id))?;
                if line.quantity >= product.stock {
                    return Err(CartError::StockLimitReached {
                        name: product.name.clone(),
                        stock: product.stock,
                    });
                }
                line.quantity += 1;
                Ok(QuantityChange::Updated {
                    quantity: line.quantity,
                })
            }
            QuantityDelta::Decrement if line.quantity > 1 => {
                line.quantity -= 1;
                Ok(QuantityChange::Updated {
                    quantity: line.quantity,
                })
            }
            QuantityDelta::Decrement => {
                self.remove(product_id);
                Ok(QuantityChange::Removed)
            }
        }
    }

    /// Empty the cart in memory.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;
    use crate::store::MemoryStore;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.replace(vec![
            product(1, "Rice", "Grains", 1000, 2),
            product(2, "Beans", "Grains", 1500, 5),
            product(3, "Milk", "Dairy", 2200, 0),
        ]);
        catalog
    }

    const RICE: ProductId = ProductId::new(1);
    const BEANS: ProductId = ProductId::new(2);
    const MILK: ProductId = ProductId::new(3);

    #[test]
    fn test_add_inserts_then_increments() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert_eq!(cart.add(&catalog, RICE).unwrap().quantity, 1);
        assert_eq!(cart.add(&catalog, RICE).unwrap().quantity, 2);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_add_out_of_stock_never_mutates() {
        let catalog = catalog();
        let mut cart = Cart::new();

        let err = cart.add(&catalog, MILK).unwrap_err();

        assert_eq!(
            err,
            CartError::OutOfStock {
                name: "Milk".to_string()
            }
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_unknown_product() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(&catalog(), ProductId::new(99)).unwrap_err(),
            CartError::ProductNotFound(ProductId::new(99))
        );
    }

    #[test]
    fn test_add_stops_at_stock() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, RICE).unwrap();
        cart.add(&catalog, RICE).unwrap();

        let err = cart.add(&catalog, RICE).unwrap_err();

        assert!(matches!(err, CartError::StockLimitReached { stock: 2, .. }));
        assert_eq!(cart.line(RICE).unwrap().quantity, 2);
    }

    #[test]
    fn test_increment_at_stock_is_rejected() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, RICE).unwrap();
        cart.add(&catalog, RICE).unwrap();
        let before = cart.clone();

        let err = cart
            .change_quantity(&catalog, RICE, QuantityDelta::Increment)
            .unwrap_err();

        assert!(matches!(err, CartError::StockLimitReached { .. }));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_to_zero_removes_line() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, BEANS).unwrap();
        cart.add(&catalog, BEANS).unwrap();

        assert_eq!(
            cart.change_quantity(&catalog, BEANS, QuantityDelta::Decrement)
                .unwrap(),
            QuantityChange::Updated { quantity: 1 }
        );
        assert_eq!(
            cart.change_quantity(&catalog, BEANS, QuantityDelta::Decrement)
                .unwrap(),
            QuantityChange::Removed
        );
        assert!(cart.line(BEANS).is_none());
    }

    #[test]
    fn test_change_quantity_on_missing_line() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.change_quantity(&catalog(), RICE, QuantityDelta::Decrement)
                .unwrap_err(),
            CartError::LineNotFound(RICE)
        );
    }

    #[test]
    fn test_remove_is_noop_when_absent() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add(&catalog, RICE).unwrap();

        assert!(cart.remove(BEANS).is_none());
        assert!(cart.remove(RICE).is_some());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let catalog = catalog();
        let mut cart = Cart::new();

        cart.add(&catalog, RICE).unwrap();
        cart.add(&catalog, BEANS).unwrap();
        cart.add(&catalog, BEANS).unwrap();
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Price::from_cents(4000));

        cart.change_quantity(&catalog, BEANS, QuantityDelta::Decrement)
            .unwrap();
        assert_eq!(cart.total_price(), Price::from_cents(2500));

        cart.remove(RICE);
        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.total_price(), Price::from_cents(1500));
    }

    #[test]
    fn test_mixed_operations_keep_invariants() {
        let catalog = catalog();
        let mut cart = Cart::new();
        let ops = [1, 2, 1, 1, 3, 2, -2, 2, 2, 2, 2, 2, -1, -1, 1];

        for op in ops {
            let id = ProductId::new(i64::from(op).abs());
            let _ = if op > 0 {
                cart.add(&catalog, id).map(|_| ())
            } else {
                cart.change_quantity(&catalog, id, QuantityDelta::Decrement)
                    .map(|_| ())
            };

            for line in cart.lines() {
                let stock = catalog.product(line.product_id).unwrap().stock;
                assert!(line.quantity >= 1 && line.quantity <= stock);
                assert_eq!(
                    cart.lines()
                        .iter()
                        .filter(|l| l.product_id == line.product_id)
                        .count(),
                    1
                );
            }
        }
    }

    #[test]
    fn test_persist_and_reload_preserves_order() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let mut cart = Cart::new();
        cart.add(&catalog, BEANS).unwrap();
        cart.add(&catalog, RICE).unwrap();
        cart.add(&catalog, BEANS).unwrap();

        cart.save(&store).unwrap();
        let reloaded = Cart::load(&store);

        assert_eq!(reloaded, cart);
        assert_eq!(reloaded.lines()[0].product_id, BEANS);
    }

    #[test]
    fn test_corrupt_snapshot_loads_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json").unwrap();
        assert!(Cart::load(&store).is_empty());
    }

    #[test]
    fn test_inconsistent_snapshot_loads_empty() {
        let store = MemoryStore::new();
        store
            .set(
                keys::CART,
                r#"[{"productId":1,"name":"Rice","price":"10","quantity":1,"category":"Grains"},
                    {"productId":1,"name":"Rice","price":"10","quantity":2,"category":"Grains"}]"#,
            )
            .unwrap();
        assert!(Cart::load(&store).is_empty());

        store
            .set(
                keys::CART,
                r#"[{"productId":1,"name":"Rice","price":"10","quantity":0,"category":"Grains"}]"#,
            )
            .unwrap();
        assert!(Cart::load(&store).is_empty());
    }

    #[test]
    fn test_quantity_delta_from_step() {
        assert_eq!(QuantityDelta::from_step(1), Some(QuantityDelta::Increment));
        assert_eq!(QuantityDelta::from_step(-1), Some(QuantityDelta::Decrement));
        assert_eq!(QuantityDelta::from_step(2), None);
    }
}
