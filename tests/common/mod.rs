//! Test utilities and fixtures for settler integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use rusqlite::Connection;

pub use settler::config::Config;
pub use settler::db::{init_db, queries};
pub use settler::ingest::{self, IngestOutcome};
pub use settler::ledger;
pub use settler::models::*;
pub use settler::reconcile;
pub use settler::sweep;

/// Config with the default method lists, detached from the environment.
pub fn test_config() -> Config {
    Config {
        database_path: ":memory:".to_string(),
        refunded_order_status: "refunded".to_string(),
        gateway_methods: vec![
            "gateway_cc".to_string(),
            "gateway_apm".to_string(),
            "gateway_vault".to_string(),
        ],
        apm_methods: vec!["gateway_apm".to_string()],
    }
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create a test order with the given payment method and status
pub fn create_test_order(conn: &Connection, payment_method: &str, status: &str) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            payment_method: payment_method.to_string(),
            status: status.to_string(),
        },
    )
    .expect("Failed to create test order")
}

/// Build a gateway payload the way the webhook transport hands it over.
pub fn payload(
    event_id: &str,
    event_type: &str,
    payment_id: &str,
    action_id: Option<&str>,
) -> GatewayEventPayload {
    let mut data = serde_json::json!({ "id": payment_id });
    if let Some(action_id) = action_id {
        data["action_id"] = action_id.into();
    }
    serde_json::from_value(serde_json::json!({
        "id": event_id,
        "type": event_type,
        "data": data,
        "created_on": "2024-01-01T00:00:00Z",
    }))
    .expect("Failed to build payload")
}

/// Ingest a well-formed event for an order.
pub fn ingest_event(
    conn: &mut Connection,
    config: &Config,
    order: &Order,
    event_id: &str,
    event_type: &str,
    action_id: &str,
) -> IngestOutcome {
    let payment_id = format!("pay_{}", action_id);
    ingest::ingest_one(
        conn,
        config,
        order,
        &payload(event_id, event_type, &payment_id, Some(action_id)),
    )
    .expect("Ingest failed")
}

/// Persist a webhook record directly, bypassing the ledger.
pub fn save_webhook_at(
    conn: &Connection,
    order_id: &str,
    event_id: &str,
    event_type: &str,
    action_id: &str,
    received_at: i64,
) -> WebhookRecord {
    queries::save_webhook(
        conn,
        &CreateWebhook {
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            action_id: action_id.to_string(),
            payment_id: format!("pay_{}", action_id),
            order_id: order_id.to_string(),
            event_data: "{}".to_string(),
            received_at,
        },
    )
    .expect("Save failed")
    .expect("Webhook already recorded")
}

/// Unix timestamp for noon UTC on the given date.
pub fn ts(year: i32, month: u32, day: u32) -> i64 {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
        .and_utc()
        .timestamp()
}
