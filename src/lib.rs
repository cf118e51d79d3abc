//! Settler - payment gateway webhook reconciliation
//!
//! This library reconciles asynchronous gateway webhooks with locally
//! recorded order state: webhook persistence, an idempotent transaction
//! ledger (authorize, capture, void, refund), order status reconciliation,
//! and the retention sweep that purges superseded webhook records.

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod id;
pub mod ingest;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod sweep;
