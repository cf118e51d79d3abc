//! Webhook ingestion: validate the payload shape, persist the record, and
//! drive the ledger for everything known about the gateway action.

use chrono::Utc;
use rusqlite::Connection;

use crate::config::Config;
use crate::db::queries;
use crate::error::Result;
use crate::ledger;
use crate::models::{CreateWebhook, GatewayEventPayload, Order, WebhookFilters};

/// Outcome of ingesting a single webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The record was persisted and forwarded to the ledger, along with any
    /// earlier records for the same gateway action.
    Applied { records: usize },
    /// The payload carried no action id. Logged and dropped - the gateway
    /// will retry with a complete payload if the action matters.
    MissingActionId,
}

/// Ingest one webhook notification for an order.
pub fn ingest_one(
    conn: &mut Connection,
    config: &Config,
    order: &Order,
    payload: &GatewayEventPayload,
) -> Result<IngestOutcome> {
    let Some(action_id) = payload.data.action_id.as_deref() else {
        tracing::warn!(
            "missing action id for webhook with payment ID {}",
            payload.data.id
        );
        return Ok(IngestOutcome::MissingActionId);
    };

    queries::save_webhook(
        conn,
        &CreateWebhook {
            event_id: payload.id.clone(),
            event_type: payload.event_type.clone(),
            action_id: action_id.to_string(),
            payment_id: payload.data.id.clone(),
            order_id: order.id.clone(),
            event_data: serde_json::to_string(payload)?,
            received_at: Utc::now().timestamp(),
        },
    )?;

    // Apply every record known for this action, not just the new one, so a
    // re-delivery after a partial failure still settles the ledger.
    let records = queries::query_webhooks(
        conn,
        &WebhookFilters {
            order_id: Some(order.id.clone()),
            action_id: Some(action_id.to_string()),
            ..Default::default()
        },
    )?;
    let count = records.len();

    ledger::apply_webhooks(conn, config, order, &records)?;

    Ok(IngestOutcome::Applied { records: count })
}

/// Re-apply every stored webhook for an order (bulk reprocessing, e.g.
/// order status sync).
pub fn ingest_all(conn: &mut Connection, config: &Config, order: &Order) -> Result<usize> {
    let records = queries::query_webhooks(
        conn,
        &WebhookFilters {
            order_id: Some(order.id.clone()),
            ..Default::default()
        },
    )?;
    let count = records.len();

    ledger::apply_webhooks(conn, config, order, &records)?;

    Ok(count)
}
