//! Order state reconciliation: the policy mapping ledger changes to order
//! status and history.

use rusqlite::Connection;

use crate::config::Config;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{TransactionType, STATUS_CANCELED, STATUS_PROCESSING};

/// A planned order mutation. `status: None` means the order keeps its
/// current status and only gains a history comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: Option<String>,
    pub comment: String,
}

/// The status policy table. Pure function of the transaction type, the
/// order's current status, and configuration.
///
/// Returns `None` when the order must not be touched at all (refund against
/// a closed or complete order).
pub fn plan(
    txn_type: TransactionType,
    current_status: &str,
    config: &Config,
) -> Option<StatusChange> {
    match txn_type {
        TransactionType::Authorization => Some(StatusChange {
            status: None,
            comment: "Payment authorized".to_string(),
        }),
        TransactionType::Capture => Some(StatusChange {
            status: Some(STATUS_PROCESSING.to_string()),
            comment: "Payment captured".to_string(),
        }),
        TransactionType::Void => Some(StatusChange {
            status: Some(STATUS_CANCELED.to_string()),
            comment: "Payment voided".to_string(),
        }),
        TransactionType::Refund => {
            if is_terminal(current_status) {
                return None;
            }
            Some(StatusChange {
                status: Some(config.refunded_order_status.clone()),
                comment: "Payment refunded".to_string(),
            })
        }
    }
}

fn is_terminal(status: &str) -> bool {
    matches!(
        status,
        crate::models::STATUS_CLOSED | crate::models::STATUS_COMPLETE
    )
}

/// Apply the policy for a transaction type to an order.
///
/// Status and history are written on the same connection; callers run this
/// inside a database transaction so the pair commits as one unit.
pub fn apply_status(
    conn: &Connection,
    config: &Config,
    order_id: &str,
    txn_type: TransactionType,
) -> Result<()> {
    let order = queries::get_order_by_id(conn, order_id)?
        .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;

    let Some(change) = plan(txn_type, &order.status, config) else {
        tracing::info!(
            "order {} is {}, refund leaves status untouched",
            order.id,
            order.status
        );
        return Ok(());
    };

    // The history comment carries the status the order ends up with, so the
    // newest entry always mirrors the order.
    let status = change.status.as_deref().unwrap_or(&order.status);
    if change.status.is_some() {
        queries::set_order_status(conn, order_id, status)?;
    }
    queries::append_status_history(conn, order_id, status, &change.comment)?;

    Ok(())
}

/// Reconcile order status after a credit memo is created.
///
/// Only touches orders paid through one of the configured gateway methods;
/// everything else belongs to another payment module.
pub fn apply_credit_memo(conn: &mut Connection, config: &Config, order_id: &str) -> Result<()> {
    let order = queries::get_order_by_id(conn, order_id)?
        .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;

    if !config.is_gateway_method(&order.payment_method) {
        return Ok(());
    }

    let tx = conn.transaction()?;
    apply_status(&tx, config, order_id, TransactionType::Refund)?;
    tx.commit()?;

    Ok(())
}
