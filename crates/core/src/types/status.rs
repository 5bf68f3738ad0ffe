//! Order status as reported by the orders service.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a placed order (`estado` on the wire).
///
/// Statuses the client does not know about deserialize as [`OrderStatus::Unknown`]
/// so a new server-side state never breaks the order-history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "pendiente", alias = "pending")]
    Pending,
    #[serde(rename = "confirmado", alias = "confirmed", alias = "procesando")]
    Confirmed,
    #[serde(rename = "enviado", alias = "shipped")]
    Shipped,
    #[serde(rename = "entregado", alias = "delivered", alias = "completado")]
    Delivered,
    #[serde(rename = "cancelado", alias = "cancelled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    /// Whether the order can still change state.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Shipped)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
