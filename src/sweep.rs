//! Retention sweeping for the webhooks table.
//!
//! The sweeper deletes records only once a confirmed downstream transaction
//! supersedes them; deleting a webhook is terminal, so anything uncertain is
//! retained for a future sweep.

use chrono::{DateTime, NaiveDate};
use rusqlite::Connection;

use crate::config::Config;
use crate::db::queries;
use crate::error::Result;
use crate::events;
use crate::models::{TransactionType, WebhookRecord};

/// Records received within this window are retained unconditionally,
/// covering in-flight processing.
pub const GRACE_PERIOD_SECS: i64 = 5 * 60;

/// The maintenance purge never touches records younger than this.
pub const MAINTENANCE_MIN_AGE_SECS: i64 = 24 * 60 * 60;

/// Sweep the webhooks table, deleting records that are safely superseded by
/// confirmed transactions. Returns the number of deleted records.
pub fn clean(conn: &Connection, config: &Config, now: i64) -> Result<usize> {
    let mut deleted = 0;

    for webhook in queries::list_webhooks(conn)? {
        if webhook.received_at > now - GRACE_PERIOD_SECS {
            continue;
        }

        if !events::is_monitored(&webhook.event_type) {
            // Nothing downstream depends on it.
            queries::delete_webhook(conn, &webhook.id)?;
            deleted += 1;
            continue;
        }

        if is_superseded(conn, config, &webhook)? {
            queries::delete_webhook(conn, &webhook.id)?;
            deleted += 1;
        }
    }

    tracing::info!("retention sweep removed {} webhook records", deleted);
    Ok(deleted)
}

/// Whether a monitored record's transaction exists and its type-specific
/// closure rule is satisfied.
fn is_superseded(conn: &Connection, config: &Config, webhook: &WebhookRecord) -> Result<bool> {
    let Some(order) = queries::get_order_by_id(conn, &webhook.order_id)? else {
        tracing::warn!(
            "webhook {} references missing order {}, retaining",
            webhook.id,
            webhook.order_id
        );
        return Ok(false);
    };

    // No transaction means the ledger has not absorbed this record yet.
    // Unprocessed work is never deleted.
    let Some(transaction) =
        queries::get_transaction_for_action(conn, &order.id, &webhook.action_id)?
    else {
        return Ok(false);
    };

    let by_type = |t: TransactionType| queries::get_transaction_by_type(conn, &order.id, t);

    let resolved = match transaction.txn_type {
        // An authorization's fate is decided by a capture or a void.
        TransactionType::Authorization => {
            by_type(TransactionType::Capture)?.is_some() || by_type(TransactionType::Void)?.is_some()
        }
        // Alternative payment methods capture without an authorization step.
        TransactionType::Capture => {
            by_type(TransactionType::Authorization)?.is_some()
                || config.is_apm_method(&order.payment_method)
        }
        TransactionType::Void => by_type(TransactionType::Authorization)?.is_some(),
        TransactionType::Refund => {
            by_type(TransactionType::Authorization)?.is_some()
                && by_type(TransactionType::Capture)?.is_some_and(|c| c.is_closed)
        }
    };

    Ok(resolved)
}

/// Date filter for the maintenance purge. Exactly one form is honored: an
/// exact date wins over a start/end range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Exact(NaiveDate),
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateFilter {
    /// Build a filter from CLI options. Returns `None` when no date option
    /// was given at all.
    pub fn from_options(
        date: Option<NaiveDate>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Option<Self> {
        if let Some(date) = date {
            return Some(Self::Exact(date));
        }
        if start.is_some() || end.is_some() {
            return Some(Self::Range { start, end });
        }
        None
    }

    /// Whether a received-at date falls inside the filter (inclusive).
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::Exact(exact) => *exact == date,
            Self::Range { start, end } => {
                start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
            }
        }
    }
}

/// Maintenance purge: delete processed records older than a day whose
/// received date matches the filter, regardless of the grace window and
/// closure rules. Returns the deleted records for reporting.
pub fn clean_by_date(
    conn: &Connection,
    filter: &DateFilter,
    now: i64,
) -> Result<Vec<WebhookRecord>> {
    let mut removed = Vec::new();

    for webhook in queries::list_webhooks(conn)? {
        if webhook.received_at > now - MAINTENANCE_MIN_AGE_SECS {
            continue;
        }

        let Some(received) = DateTime::from_timestamp(webhook.received_at, 0) else {
            continue;
        };
        if !filter.matches(received.date_naive()) {
            continue;
        }

        if !webhook.processed {
            continue;
        }

        queries::delete_webhook(conn, &webhook.id)?;
        removed.push(webhook);
    }

    Ok(removed)
}
