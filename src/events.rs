//! Gateway event type dispatch.
//!
//! The mapping from gateway event strings to ledger transaction types is a
//! fixed, closed table. Declined variants are recorded in the ledger but
//! never advance order status; anything outside the table is `Unmapped` and
//! produces no transaction at all.

use crate::models::TransactionType;

/// How a gateway event type relates to the transaction ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMapping {
    Mapped {
        txn_type: TransactionType,
        /// Whether the event drives an order status update. Declined
        /// variants are recorded without touching the order.
        advances_status: bool,
    },
    Unmapped,
}

/// Resolve a gateway event type against the fixed mapping table.
pub fn map_event(event_type: &str) -> EventMapping {
    use TransactionType::*;

    let (txn_type, advances_status) = match event_type {
        "payment_approved" => (Authorization, true),
        "payment_captured" => (Capture, true),
        "payment_voided" => (Void, true),
        "payment_refunded" => (Refund, true),
        "payment_capture_declined" => (Capture, false),
        "payment_void_declined" => (Void, false),
        "payment_refund_declined" => (Refund, false),
        _ => return EventMapping::Unmapped,
    };

    EventMapping::Mapped {
        txn_type,
        advances_status,
    }
}

/// Whether the retention sweeper tracks this event type. Unmonitored
/// records have nothing downstream depending on them.
pub fn is_monitored(event_type: &str) -> bool {
    map_event(event_type) != EventMapping::Unmapped
}
