//! Catalog cache: the client's snapshot of the remote inventory.
//!
//! The snapshot is replaced wholesale on each successful refresh and left
//! untouched when a refresh fails. Everything else here is a read-only query
//! over the cached list.

use std::str::FromStr;

use bodega_core::ProductId;
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::api::{ApiError, InventoryApi};
use crate::models::Product;

/// Maximum number of autocomplete suggestions.
pub const MAX_SUGGESTIONS: usize = 8;

/// Minimum number of characters before suggestions are offered.
pub const MIN_SUGGEST_CHARS: usize = 2;

/// Category selection for catalog browsing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every product.
    #[default]
    All,
    /// Products whose category matches, ignoring case.
    Named(String),
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("todos") {
            Ok(Self::All)
        } else {
            Ok(Self::Named(s.to_string()))
        }
    }
}

/// Cached product list.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Catalog {
    /// An empty catalog that has never been fetched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full product list and replace the cache with it.
    ///
    /// Returns the number of products now cached.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the fetch; the cache is left as it was.
    #[instrument(skip_all)]
    pub async fn refresh<A: InventoryApi>(&mut self, api: &A) -> Result<usize, ApiError> {
        match api.list_products().await {
            Ok(products) => {
                self.replace(products);
                tracing::info!(count = self.products.len(), "catalog refreshed");
                Ok(self.products.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, kept = self.products.len(), "catalog refresh failed");
                Err(e)
            }
        }
    }

    /// Replace the cached list.
    pub fn replace(&mut self, products: Vec<Product>) {
        self.products = products;
        self.fetched_at = Some(Utc::now());
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// When the cache was last replaced.
    #[must_use]
    pub const fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Distinct categories, in the order they first appear.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            let category = product.category.as_str();
            if !category.is_empty() && !seen.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                seen.push(category);
            }
        }
        seen
    }

    /// Products in a category. Unbounded.
    #[must_use]
    pub fn filter_by_category(&self, filter: &CategoryFilter) -> Vec<&Product> {
        match filter {
            CategoryFilter::All => self.products.iter().collect(),
            CategoryFilter::Named(tag) => self
                .products
                .iter()
                .filter(|p| p.category.to_lowercase() == tag.to_lowercase())
                .collect(),
        }
    }

    /// Products whose name or category contains `term`, ignoring case.
    ///
    /// A blank term matches nothing. `limit` caps the number of results.
    #[must_use]
    pub fn search(&self, term: &str, limit: Option<usize>) -> Vec<&Product> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.products
            .iter()
            .filter(|p| p.matches(&needle))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Search-as-you-type suggestions.
    ///
    /// Nothing is suggested until the term has [`MIN_SUGGEST_CHARS`]
    /// characters; at most [`MAX_SUGGESTIONS`] products are returned.
    #[must_use]
    pub fn suggest(&self, term: &str) -> Vec<&Product> {
        if term.trim().chars().count() < MIN_SUGGEST_CHARS {
            return Vec::new();
        }
        self.search(term, Some(MAX_SUGGESTIONS))
    }
}
