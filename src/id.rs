//! Prefixed ID generation for settler entities.
//!
//! All IDs use a `st_` brand prefix to guarantee collision avoidance with
//! gateway-assigned IDs (event ids, action ids, payment ids).
//!
//! Format: `st_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use uuid::Uuid;

/// All known entity prefixes for validation.
const ALL_PREFIXES: &[&str] = &["st_ord_", "st_wh_", "st_txn_", "st_hist_"];

/// Validate that a string is a valid settler prefixed ID.
///
/// This is a cheap check to reject garbage before hitting the database.
/// Validates format: `st_{entity}_{32_hex_chars}`
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

/// Entity types that have prefixed IDs in settler.
#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    Order,
    Webhook,
    Transaction,
    StatusHistory,
}

impl EntityType {
    /// Returns the prefix for this entity type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Order => "st_ord",
            Self::Webhook => "st_wh",
            Self::Transaction => "st_txn",
            Self::StatusHistory => "st_hist",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}
