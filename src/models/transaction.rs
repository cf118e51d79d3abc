use serde::{Deserialize, Serialize};

/// A ledger entry derived from a gateway webhook.
///
/// Transactions are created exclusively by the ledger in response to webhook
/// events, never mutated except to flip `is_closed`. At most one transaction
/// exists per (order_id, action_id, txn_type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub order_id: String,
    /// Gateway action correlation id, unique per gateway-side operation.
    pub action_id: String,
    pub txn_type: TransactionType,
    /// The transaction this one settles against: captures, voids and refunds
    /// reference the authorization; a refund may reference a closed capture.
    pub parent_type: Option<TransactionType>,
    pub is_closed: bool,
    pub created_at: i64,
}

/// Data required to create a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub order_id: String,
    pub action_id: String,
    pub txn_type: TransactionType,
    pub parent_type: Option<TransactionType>,
}

/// Transaction lifecycle types, in the order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Authorization,
    Capture,
    Void,
    Refund,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Capture => "capture",
            Self::Void => "void",
            Self::Refund => "refund",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "authorization" => Ok(Self::Authorization),
            "capture" => Ok(Self::Capture),
            "void" => Ok(Self::Void),
            "refund" => Ok(Self::Refund),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
