//! The transaction ledger: maps stored webhooks to order transactions,
//! enforcing parent/child relationships and idempotent creation.

use rusqlite::Connection;

use crate::config::Config;
use crate::db::queries;
use crate::error::Result;
use crate::events::{map_event, EventMapping};
use crate::models::{CreateTransaction, Order, TransactionType, WebhookRecord};
use crate::reconcile;

/// Apply a batch of webhook records to the order's transaction ledger.
///
/// Each record is applied in its own database transaction: the ledger row,
/// parent closure, processed flag, and order status update commit together
/// or not at all.
pub fn apply_webhooks(
    conn: &mut Connection,
    config: &Config,
    order: &Order,
    records: &[WebhookRecord],
) -> Result<()> {
    for record in records {
        apply_one(conn, config, order, record)?;
    }
    Ok(())
}

fn apply_one(
    conn: &mut Connection,
    config: &Config,
    order: &Order,
    record: &WebhookRecord,
) -> Result<()> {
    let (txn_type, advances_status) = match map_event(&record.event_type) {
        EventMapping::Mapped {
            txn_type,
            advances_status,
        } => (txn_type, advances_status),
        EventMapping::Unmapped => {
            // Recorded for audit; nothing to derive.
            tracing::debug!(
                "webhook {} has unmapped event type {}, no transaction derived",
                record.event_id,
                record.event_type
            );
            return Ok(());
        }
    };

    let tx = conn.transaction()?;

    let parent = find_parent(&tx, &order.id, txn_type)?;
    if parent.is_none() && txn_type != TransactionType::Authorization {
        tracing::warn!(
            "no parent authorization for {} {} on order {}",
            txn_type,
            record.action_id,
            order.id
        );
    }

    let created = queries::try_create_transaction(
        &tx,
        &CreateTransaction {
            order_id: order.id.clone(),
            action_id: record.action_id.clone(),
            txn_type,
            parent_type: parent.as_ref().map(|p| p.txn_type),
        },
    )?;

    if created && advances_status {
        settle_relatives(&tx, &order.id, txn_type, parent.as_ref().map(|p| p.id.as_str()))?;
        reconcile::apply_status(&tx, config, &order.id, txn_type)?;
    }

    // A transaction for this action now exists either way (a lost insert
    // race means another ingestion created it), so the record is processed.
    queries::mark_webhook_processed(&tx, &record.id)?;

    tx.commit()?;

    if created {
        tracing::info!(
            "recorded {} transaction for order {} (action {})",
            txn_type,
            order.id,
            record.action_id
        );
    }

    Ok(())
}

/// Pick the parent transaction for a new ledger entry. Captures and voids
/// settle against the most recent authorization; refunds prefer the most
/// recent closed capture and fall back to the authorization.
fn find_parent(
    conn: &Connection,
    order_id: &str,
    txn_type: TransactionType,
) -> Result<Option<crate::models::Transaction>> {
    match txn_type {
        TransactionType::Authorization => Ok(None),
        TransactionType::Capture | TransactionType::Void => {
            queries::get_transaction_by_type(conn, order_id, TransactionType::Authorization)
        }
        TransactionType::Refund => {
            if let Some(capture) = queries::get_closed_capture(conn, order_id)? {
                return Ok(Some(capture));
            }
            queries::get_transaction_by_type(conn, order_id, TransactionType::Authorization)
        }
    }
}

/// Close the transactions a new successful entry resolves, and repair
/// linkage for children that arrived before their authorization.
fn settle_relatives(
    conn: &Connection,
    order_id: &str,
    txn_type: TransactionType,
    parent_id: Option<&str>,
) -> Result<()> {
    match txn_type {
        TransactionType::Authorization => {
            // Out-of-order delivery: children may already exist. Link them
            // to this authorization, and close it if its fate is already
            // decided by a capture or void.
            queries::backfill_parent_type(conn, order_id)?;

            let resolved = queries::get_transaction_by_type(conn, order_id, TransactionType::Capture)?
                .is_some()
                || queries::get_transaction_by_type(conn, order_id, TransactionType::Void)?
                    .is_some();
            if resolved {
                if let Some(auth) =
                    queries::get_transaction_by_type(conn, order_id, TransactionType::Authorization)?
                {
                    queries::close_transaction(conn, &auth.id)?;
                }
            }
        }
        TransactionType::Capture | TransactionType::Void => {
            if let Some(id) = parent_id {
                queries::close_transaction(conn, id)?;
            }
        }
        TransactionType::Refund => {
            // The refund settles the capture it returns funds from.
            if let Some(capture) =
                queries::get_transaction_by_type(conn, order_id, TransactionType::Capture)?
            {
                if !capture.is_closed {
                    queries::close_transaction(conn, &capture.id)?;
                }
            }
        }
    }
    Ok(())
}
