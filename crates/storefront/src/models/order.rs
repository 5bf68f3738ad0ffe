//! Order types: the submission payload, the confirmation shown after a
//! successful checkout, and the records listed in the order history.

use bodega_core::{OrderId, OrderStatus, Price, ProductId};
use chrono::{DateTime, Utc};

use crate::cart::{Cart, CartLine};
use crate::config::CheckoutDefaults;
use crate::models::User;

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// Order payload built fresh from the cart at submission time.
///
/// The total is computed client-side; the orders service recomputes and
/// validates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub lines: Vec<OrderLine>,
    pub total: Price,
    pub delivery_address: String,
    pub payment_method: String,
}

impl OrderDraft {
    /// Build a draft from the current cart contents.
    #[must_use]
    pub fn from_cart(cart: &Cart, defaults: &CheckoutDefaults) -> Self {
        Self {
            lines: cart.lines().iter().map(OrderLine::from).collect(),
            total: cart.total_price(),
            delivery_address: defaults.delivery_address.clone(),
            payment_method: defaults.payment_method.clone(),
        }
    }
}

/// Summary shown once an order has been placed and stock reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub customer: User,
    pub lines: Vec<CartLine>,
    pub total: Price,
}

/// A past order as listed by the orders service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub created_at: Option<DateTime<Utc>>,
    pub status: OrderStatus,
    pub total: Price,
    pub items: Vec<OrderRecordItem>,
    pub delivery_address: String,
    pub payment_method: String,
}

/// A line of a past order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecordItem {
    pub name: String,
    pub quantity: u32,
    pub price: Price,
}

impl OrderRecordItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}
