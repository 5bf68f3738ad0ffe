//! Conversions from wire types to domain types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::api::types::{InventoryItem, OrderHistoryEntry, OrderHistoryItem, WireUser};
use crate::models::{OrderRecord, OrderRecordItem, Product, User};

impl From<InventoryItem> for Product {
    fn from(item: InventoryItem) -> Self {
        Self {
            id: item.id,
            name: item.nombre,
            description: item.descripcion.unwrap_or_default(),
            price: item.precio,
            stock: item.stock,
            category: item.categoria.unwrap_or_default(),
            image_url: item.imagen_url.unwrap_or_default(),
        }
    }
}

impl From<WireUser> for User {
    fn from(user: WireUser) -> Self {
        Self {
            id: user.id,
            name: user.nombre,
            email: user.email,
        }
    }
}

impl From<OrderHistoryItem> for OrderRecordItem {
    fn from(item: OrderHistoryItem) -> Self {
        Self {
            name: item.nombre,
            quantity: item.cantidad,
            price: item.precio,
        }
    }
}

impl From<OrderHistoryEntry> for OrderRecord {
    fn from(entry: OrderHistoryEntry) -> Self {
        Self {
            id: entry.id,
            created_at: entry.fecha_creacion.as_deref().and_then(parse_timestamp),
            status: entry.estado,
            total: entry.total,
            items: entry.items.into_iter().map(OrderRecordItem::from).collect(),
            delivery_address: entry.direccion_entrega.unwrap_or_default(),
            payment_method: entry.metodo_pago.unwrap_or_default(),
        }
    }
}

/// Parse an order timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DD HH:MM:SS` (taken as UTC), or a bare
/// date. Anything else is dropped rather than failing the whole history.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    tracing::debug!(raw, "unrecognized order timestamp");
    None
}
