use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A gateway webhook payload, validated at the ingestion boundary.
///
/// Only the correlation fields are typed; everything else the gateway sends
/// is carried in the flattened `extra` maps and preserved verbatim when the
/// record is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEventPayload {
    /// Gateway-assigned event id.
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PayloadData,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadData {
    /// Gateway payment id.
    pub id: String,
    /// Action correlation id. Gateways omit this on some event shapes, so
    /// absence is handled at ingestion rather than rejected at parse time.
    #[serde(default, rename = "action_id", alias = "actionId")]
    pub action_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
