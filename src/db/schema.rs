use rusqlite::Connection;

/// Initialize the database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Orders (the aggregate the ledger reconciles against)
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            payment_method TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Append-only order status history. The newest entry mirrors the
        -- order's current status.
        CREATE TABLE IF NOT EXISTS order_status_history (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            status TEXT NOT NULL,
            comment TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_history_order ON order_status_history(order_id, created_at);

        -- Received gateway webhooks. event_id is gateway-unique, so a
        -- re-delivered event never accumulates a second row.
        CREATE TABLE IF NOT EXISTS webhooks (
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL UNIQUE,
            event_type TEXT NOT NULL,
            action_id TEXT NOT NULL,
            payment_id TEXT NOT NULL,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            event_data TEXT NOT NULL,
            received_at INTEGER NOT NULL,
            processed INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_webhooks_order_action ON webhooks(order_id, action_id);
        CREATE INDEX IF NOT EXISTS idx_webhooks_received ON webhooks(received_at);

        -- The transaction ledger. The unique key is the idempotency
        -- boundary: concurrent ingestion of the same action resolves to a
        -- single row via INSERT OR IGNORE.
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            action_id TEXT NOT NULL,
            txn_type TEXT NOT NULL CHECK (txn_type IN ('authorization', 'capture', 'void', 'refund')),
            parent_type TEXT CHECK (parent_type IS NULL OR parent_type IN ('authorization', 'capture')),
            is_closed INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            UNIQUE(order_id, action_id, txn_type)
        );
        CREATE INDEX IF NOT EXISTS idx_transactions_order_type ON transactions(order_id, txn_type);
        "#,
    )
}
