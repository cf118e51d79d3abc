//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted rows.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const ORDER_COLS: &str = "id, payment_method, status, created_at, updated_at";

pub const HISTORY_COLS: &str = "id, order_id, status, comment, created_at";

pub const WEBHOOK_COLS: &str =
    "id, event_id, event_type, action_id, payment_id, order_id, event_data, received_at, processed";

pub const TRANSACTION_COLS: &str =
    "id, order_id, action_id, txn_type, parent_type, is_closed, created_at";

// ============ FromRow Implementations ============

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            payment_method: row.get(1)?,
            status: row.get(2)?,
            created_at: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl FromRow for StatusHistoryEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(StatusHistoryEntry {
            id: row.get(0)?,
            order_id: row.get(1)?,
            status: row.get(2)?,
            comment: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl FromRow for WebhookRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(WebhookRecord {
            id: row.get(0)?,
            event_id: row.get(1)?,
            event_type: row.get(2)?,
            action_id: row.get(3)?,
            payment_id: row.get(4)?,
            order_id: row.get(5)?,
            event_data: row.get(6)?,
            received_at: row.get(7)?,
            processed: row.get(8)?,
        })
    }
}

impl FromRow for Transaction {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        // parent_type is optional - parse it if present
        let parent_type: Option<TransactionType> = row
            .get::<_, Option<String>>(4)?
            .and_then(|s| s.parse().ok());
        Ok(Transaction {
            id: row.get(0)?,
            order_id: row.get(1)?,
            action_id: row.get(2)?,
            txn_type: parse_enum(row, 3, "txn_type")?,
            parent_type,
            is_closed: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
