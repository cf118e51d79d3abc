//! Transaction ledger tests: parent linkage, closure, ordering independence

mod common;

use common::*;

#[test]
fn test_capture_closes_authorization() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_cc", STATUS_PENDING);

    ingest_event(&mut conn, &config, &order, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn, &config, &order, "evt_1", "payment_captured", "act_1");

    let auth = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Authorization)
        .expect("Query failed")
        .expect("Authorization not found");
    assert!(auth.is_closed, "capture resolves the authorization");

    let capture = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Capture)
        .expect("Query failed")
        .expect("Capture not found");
    assert!(!capture.is_closed, "capture stays open until refunded");
}

#[test]
fn test_void_closes_authorization_and_cancels_order() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_cc", STATUS_PENDING);

    ingest_event(&mut conn, &config, &order, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn, &config, &order, "evt_1", "payment_voided", "act_1");

    let auth = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Authorization)
        .expect("Query failed")
        .expect("Authorization not found");
    assert!(auth.is_closed);

    let updated = queries::get_order_by_id(&conn, &order.id)
        .expect("Query failed")
        .expect("Order not found");
    assert_eq!(updated.status, STATUS_CANCELED);
}

#[test]
fn test_out_of_order_delivery_converges() {
    let config = test_config();

    // Authorization first, then capture
    let mut conn_a = setup_test_db();
    let order_a = create_test_order(&conn_a, "gateway_cc", STATUS_PENDING);
    ingest_event(&mut conn_a, &config, &order_a, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn_a, &config, &order_a, "evt_1", "payment_captured", "act_1");

    // Capture first, then authorization
    let mut conn_b = setup_test_db();
    let order_b = create_test_order(&conn_b, "gateway_cc", STATUS_PENDING);
    ingest_event(&mut conn_b, &config, &order_b, "evt_1", "payment_captured", "act_1");
    ingest_event(&mut conn_b, &config, &order_b, "evt_0", "payment_approved", "act_0");

    for (conn, order) in [(&conn_a, &order_a), (&conn_b, &order_b)] {
        let status = queries::get_order_by_id(conn, &order.id)
            .expect("Query failed")
            .expect("Order not found")
            .status;
        assert_eq!(status, STATUS_PROCESSING);

        let capture = queries::get_transaction_by_type(conn, &order.id, TransactionType::Capture)
            .expect("Query failed")
            .expect("Capture not found");
        assert_eq!(
            capture.parent_type,
            Some(TransactionType::Authorization),
            "linkage must converge regardless of delivery order"
        );

        let auth =
            queries::get_transaction_by_type(conn, &order.id, TransactionType::Authorization)
                .expect("Query failed")
                .expect("Authorization not found");
        assert!(auth.is_closed, "authorization fate is decided either way");
    }
}

#[test]
fn test_capture_without_authorization_is_recorded() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_apm", STATUS_PENDING);

    // APM flows capture without an authorization step; absence of the
    // parent is a logged condition, not an error.
    ingest_event(&mut conn, &config, &order, "evt_1", "payment_captured", "act_1");

    let capture = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Capture)
        .expect("Query failed")
        .expect("Capture not found");
    assert_eq!(capture.parent_type, None);

    let updated = queries::get_order_by_id(&conn, &order.id)
        .expect("Query failed")
        .expect("Order not found");
    assert_eq!(updated.status, STATUS_PROCESSING);
}

#[test]
fn test_refund_closes_capture_and_falls_back_to_authorization_parent() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_cc", STATUS_PENDING);

    ingest_event(&mut conn, &config, &order, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn, &config, &order, "evt_1", "payment_captured", "act_1");
    ingest_event(&mut conn, &config, &order, "evt_2", "payment_refunded", "act_2");

    // The capture was still open when the refund arrived, so the refund
    // references the authorization and closes the capture behind it.
    let refund = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Refund)
        .expect("Query failed")
        .expect("Refund not found");
    assert_eq!(refund.parent_type, Some(TransactionType::Authorization));

    let capture = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Capture)
        .expect("Query failed")
        .expect("Capture not found");
    assert!(capture.is_closed);
}

#[test]
fn test_second_refund_references_closed_capture() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_cc", STATUS_PENDING);

    ingest_event(&mut conn, &config, &order, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn, &config, &order, "evt_1", "payment_captured", "act_1");
    ingest_event(&mut conn, &config, &order, "evt_2", "payment_refunded", "act_2");
    // Partial refund follow-up: the capture is closed by now.
    ingest_event(&mut conn, &config, &order, "evt_3", "payment_refunded", "act_3");

    let second = queries::get_transaction_for_action(&conn, &order.id, "act_3")
        .expect("Query failed")
        .expect("Second refund not found");
    assert_eq!(second.parent_type, Some(TransactionType::Capture));
}

#[test]
fn test_declined_capture_is_recorded_without_side_effects() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_cc", STATUS_PENDING);

    ingest_event(&mut conn, &config, &order, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn, &config, &order, "evt_1", "payment_capture_declined", "act_1");

    // Recorded in the ledger...
    let declined = queries::get_transaction_for_action(&conn, &order.id, "act_1")
        .expect("Query failed")
        .expect("Declined capture not recorded");
    assert_eq!(declined.txn_type, TransactionType::Capture);

    // ...but the order is untouched and the authorization stays open for a
    // retry.
    let updated = queries::get_order_by_id(&conn, &order.id)
        .expect("Query failed")
        .expect("Order not found");
    assert_eq!(updated.status, STATUS_PENDING);

    let auth = queries::get_transaction_by_type(&conn, &order.id, TransactionType::Authorization)
        .expect("Query failed")
        .expect("Authorization not found");
    assert!(!auth.is_closed);

    let history = queries::list_status_history(&conn, &order.id).expect("Query failed");
    assert_eq!(history.len(), 1, "only the authorization commented");
}

#[test]
fn test_at_most_one_authorization_per_order() {
    let mut conn = setup_test_db();
    let config = test_config();
    let order = create_test_order(&conn, "gateway_cc", STATUS_PENDING);

    ingest_event(&mut conn, &config, &order, "evt_0", "payment_approved", "act_0");
    ingest_event(&mut conn, &config, &order, "evt_0b", "payment_approved", "act_0");

    let transactions = queries::list_transactions(&conn, &order.id).expect("Query failed");
    assert_eq!(transactions.len(), 1);
}
