use serde::{Deserialize, Serialize};

/// A persisted gateway webhook notification.
///
/// Created on ingestion, mutated only to flip `processed` once a
/// corresponding transaction exists, and deleted by the retention sweeper
/// once safely superseded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRecord {
    pub id: String,
    /// Gateway-assigned event id, globally unique per event.
    pub event_id: String,
    pub event_type: String,
    /// Gateway action correlation id, unique per gateway-side operation.
    pub action_id: String,
    pub payment_id: String,
    pub order_id: String,
    /// The raw payload, preserved verbatim.
    pub event_data: String,
    pub received_at: i64,
    pub processed: bool,
}

/// Data required to persist a new webhook record
#[derive(Debug, Clone)]
pub struct CreateWebhook {
    pub event_id: String,
    pub event_type: String,
    pub action_id: String,
    pub payment_id: String,
    pub order_id: String,
    pub event_data: String,
    pub received_at: i64,
}

/// Filters for querying webhook records
#[derive(Debug, Default, Clone)]
pub struct WebhookFilters {
    pub order_id: Option<String>,
    pub action_id: Option<String>,
    pub event_type: Option<String>,
    pub processed: Option<bool>,
}
