use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_CANCELED: &str = "canceled";
pub const STATUS_CLOSED: &str = "closed";
pub const STATUS_COMPLETE: &str = "complete";

/// The order aggregate the ledger reconciles against.
///
/// Status is a free-form string rather than an enum: part of the status
/// vocabulary (the refunded status) is store-configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Payment method code (e.g. "gateway_cc", "gateway_apm").
    pub payment_method: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Closed and complete orders are terminal: refunds no longer override
    /// their status.
    pub fn is_closed(&self) -> bool {
        matches!(self.status.as_str(), STATUS_CLOSED | STATUS_COMPLETE)
    }
}

/// Data required to create a new order
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub payment_method: String,
    pub status: String,
}

/// An append-only order status history entry.
///
/// The newest entry's status always mirrors the order's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: String,
    pub order_id: String,
    pub status: String,
    pub comment: String,
    pub created_at: i64,
}
