//! Terminal rendering.
//!
//! Everything is formatted into strings first so the layout can be tested;
//! only [`emit`], [`notice`] and [`prompt`] touch stdout.

use std::fmt::Write as _;
use std::io::Write as _;

use bodega_storefront::cart::Cart;
use bodega_storefront::models::{OrderConfirmation, OrderRecord, Product, User};
use bodega_storefront::notice::Notice;

/// Print a block of rendered output.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    println!("{text}");
}

/// Print a notice.
pub fn notice(notice: &Notice) {
    emit(&notice.to_string());
}

/// Print a prompt without a trailing newline.
#[allow(clippy::print_stdout)]
pub fn prompt(text: &str) -> std::io::Result<()> {
    print!("{text}");
    std::io::stdout().flush()
}

/// Product table.
pub fn products(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<28} {:<14} {:>10} {:>6}",
        "ID", "NAME", "CATEGORY", "PRICE", "STOCK"
    );
    for product in products {
        let stock = if product.in_stock() {
            product.stock.to_string()
        } else {
            "sold out".to_string()
        };
        let _ = write!(
            out,
            "\n{:>5}  {:<28} {:<14} {:>10} {:>6}",
            product.id.to_string(),
            product.name,
            product.category,
            product.price.to_string(),
            stock
        );
    }
    out
}

/// One category per line.
pub fn categories(categories: &[&str]) -> String {
    if categories.is_empty() {
        return "No categories".to_string();
    }
    categories.join("\n")
}

/// Cart lines with totals.
pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<28} {:>4} {:>10} {:>10}",
        "ID", "PRODUCT", "QTY", "UNIT", "TOTAL"
    );
    for line in cart.lines() {
        let _ = write!(
            out,
            "\n{:>5}  {:<28} {:>4} {:>10} {:>10}",
            line.product_id.to_string(),
            line.name,
            line.quantity,
            line.price.to_string(),
            line.line_total().to_string()
        );
    }
    let _ = write!(
        out,
        "\n\nItems: {}  Total: {}",
        cart.total_items(),
        cart.total_price()
    );
    out
}

/// Summary shown after a successful order.
pub fn confirmation(confirmation: &OrderConfirmation) -> String {
    let mut out = format!(
        "Order #{} confirmed\nCustomer: {} <{}>",
        confirmation.order_id, confirmation.customer.name, confirmation.customer.email
    );
    for line in &confirmation.lines {
        let _ = write!(
            out,
            "\n  {} x {}  {}",
            line.quantity,
            line.name,
            line.line_total()
        );
    }
    let _ = write!(out, "\nTotal: {}", confirmation.total);
    out
}

/// Order history, newest as the service lists them.
pub fn orders(orders: &[OrderRecord]) -> String {
    if orders.is_empty() {
        return "You have no orders yet".to_string();
    }

    let mut out = String::new();
    for (i, order) in orders.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        let date = order
            .created_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string());
        let _ = write!(
            out,
            "Order #{}  {}  {}  {}",
            order.id, date, order.status, order.total
        );
        for item in &order.items {
            let _ = write!(
                out,
                "\n  {} x {}  {}",
                item.quantity,
                item.name,
                item.line_total()
            );
        }
        if !order.delivery_address.is_empty() {
            let _ = write!(
                out,
                "\n  Delivery: {}  Payment: {}",
                order.delivery_address, order.payment_method
            );
        }
    }
    out
}

/// The logged-in user, if any.
pub fn user(user: Option<&User>) -> String {
    user.map_or_else(
        || "Not logged in".to_string(),
        |u| format!("{} <{}> (#{})", u.name, u.email, u.id),
    )
}
