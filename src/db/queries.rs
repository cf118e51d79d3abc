use chrono::Utc;
use rusqlite::{params, types::Value, Connection};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    query_all, query_one, FromRow, HISTORY_COLS, ORDER_COLS, TRANSACTION_COLS, WEBHOOK_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Orders ============

pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = EntityType::Order.gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO orders (id, payment_method, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&id, &input.payment_method, &input.status, now, now],
    )?;

    Ok(Order {
        id,
        payment_method: input.payment_method.clone(),
        status: input.status.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

pub fn set_order_status(conn: &Connection, order_id: &str, status: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status, now(), order_id],
    )?;
    Ok(affected > 0)
}

pub fn append_status_history(
    conn: &Connection,
    order_id: &str,
    status: &str,
    comment: &str,
) -> Result<StatusHistoryEntry> {
    let id = EntityType::StatusHistory.gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO order_status_history (id, order_id, status, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![&id, order_id, status, comment, now],
    )?;

    Ok(StatusHistoryEntry {
        id,
        order_id: order_id.to_string(),
        status: status.to_string(),
        comment: comment.to_string(),
        created_at: now,
    })
}

/// The newest history entry for an order. Its status mirrors the order's
/// current status.
pub fn latest_status_history(
    conn: &Connection,
    order_id: &str,
) -> Result<Option<StatusHistoryEntry>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM order_status_history WHERE order_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            HISTORY_COLS
        ),
        &[&order_id],
    )
}

pub fn list_status_history(conn: &Connection, order_id: &str) -> Result<Vec<StatusHistoryEntry>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM order_status_history WHERE order_id = ?1
             ORDER BY created_at ASC, rowid ASC",
            HISTORY_COLS
        ),
        &[&order_id],
    )
}

// ============ Webhooks ============

/// Persist an incoming webhook.
///
/// event_id is gateway-unique, so a re-delivered event is ignored and
/// `None` is returned instead of a second row.
pub fn save_webhook(conn: &Connection, input: &CreateWebhook) -> Result<Option<WebhookRecord>> {
    let id = EntityType::Webhook.gen_id();

    let affected = conn.execute(
        "INSERT OR IGNORE INTO webhooks
         (id, event_id, event_type, action_id, payment_id, order_id, event_data, received_at, processed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0)",
        params![
            &id,
            &input.event_id,
            &input.event_type,
            &input.action_id,
            &input.payment_id,
            &input.order_id,
            &input.event_data,
            input.received_at,
        ],
    )?;

    if affected == 0 {
        return Ok(None);
    }

    Ok(Some(WebhookRecord {
        id,
        event_id: input.event_id.clone(),
        event_type: input.event_type.clone(),
        action_id: input.action_id.clone(),
        payment_id: input.payment_id.clone(),
        order_id: input.order_id.clone(),
        event_data: input.event_data.clone(),
        received_at: input.received_at,
        processed: false,
    }))
}

/// Load webhook records matching the given field filters.
pub fn query_webhooks(conn: &Connection, filters: &WebhookFilters) -> Result<Vec<WebhookRecord>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(order_id) = &filters.order_id {
        clauses.push("order_id = ?");
        values.push(order_id.clone().into());
    }
    if let Some(action_id) = &filters.action_id {
        clauses.push("action_id = ?");
        values.push(action_id.clone().into());
    }
    if let Some(event_type) = &filters.event_type {
        clauses.push("event_type = ?");
        values.push(event_type.clone().into());
    }
    if let Some(processed) = filters.processed {
        clauses.push("processed = ?");
        values.push(processed.into());
    }

    let mut sql = format!("SELECT {} FROM webhooks", WEBHOOK_COLS);
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY received_at ASC, rowid ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(values), WebhookRecord::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_webhooks(conn: &Connection) -> Result<Vec<WebhookRecord>> {
    query_webhooks(conn, &WebhookFilters::default())
}

pub fn get_webhook_by_id(conn: &Connection, id: &str) -> Result<Option<WebhookRecord>> {
    query_one(
        conn,
        &format!("SELECT {} FROM webhooks WHERE id = ?1", WEBHOOK_COLS),
        &[&id],
    )
}

pub fn mark_webhook_processed(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("UPDATE webhooks SET processed = 1 WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

pub fn delete_webhook(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("DELETE FROM webhooks WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

// ============ Transactions ============

/// Atomically create a transaction unless one already exists for
/// (order_id, action_id, txn_type).
///
/// Returns false when another ingestion already created it - callers treat
/// that as a success no-op.
pub fn try_create_transaction(conn: &Connection, input: &CreateTransaction) -> Result<bool> {
    let id = EntityType::Transaction.gen_id();

    let affected = conn.execute(
        "INSERT OR IGNORE INTO transactions
         (id, order_id, action_id, txn_type, parent_type, is_closed, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            &id,
            &input.order_id,
            &input.action_id,
            input.txn_type.as_str(),
            input.parent_type.map(|t| t.as_str()),
            now(),
        ],
    )?;

    Ok(affected > 0)
}

/// The transaction created for a specific gateway action, if any.
pub fn get_transaction_for_action(
    conn: &Connection,
    order_id: &str,
    action_id: &str,
) -> Result<Option<Transaction>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE order_id = ?1 AND action_id = ?2
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            TRANSACTION_COLS
        ),
        &[&order_id, &action_id],
    )
}

/// The most recent transaction of a given type for an order.
pub fn get_transaction_by_type(
    conn: &Connection,
    order_id: &str,
    txn_type: TransactionType,
) -> Result<Option<Transaction>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE order_id = ?1 AND txn_type = ?2
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            TRANSACTION_COLS
        ),
        &[&order_id, &txn_type.as_str()],
    )
}

/// The most recent closed capture for an order (refund parent lookup).
pub fn get_closed_capture(conn: &Connection, order_id: &str) -> Result<Option<Transaction>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM transactions
             WHERE order_id = ?1 AND txn_type = 'capture' AND is_closed = 1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            TRANSACTION_COLS
        ),
        &[&order_id],
    )
}

pub fn list_transactions(conn: &Connection, order_id: &str) -> Result<Vec<Transaction>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM transactions WHERE order_id = ?1
             ORDER BY created_at ASC, rowid ASC",
            TRANSACTION_COLS
        ),
        &[&order_id],
    )
}

pub fn close_transaction(conn: &Connection, id: &str) -> Result<bool> {
    let affected = conn.execute("UPDATE transactions SET is_closed = 1 WHERE id = ?1", [id])?;
    Ok(affected > 0)
}

/// Link orphaned child transactions to an authorization that arrived after
/// them (out-of-order delivery repair).
pub fn backfill_parent_type(conn: &Connection, order_id: &str) -> Result<usize> {
    let affected = conn.execute(
        "UPDATE transactions SET parent_type = 'authorization'
         WHERE order_id = ?1 AND parent_type IS NULL AND txn_type != 'authorization'",
        [order_id],
    )?;
    Ok(affected)
}
