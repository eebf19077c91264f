//! # Audit Log
//!
//! One entry per adjudicated permission check, keyed
//! `<content_id><separator><tx_id>`. The transaction id suffix keeps
//! concurrent checks on the same resource on distinct keys, so appends never
//! conflict with each other.
//!
//! Range scans return entries in key order, which is transaction-id order
//! rather than time order; [`AuditLog::query_chronological`] re-sorts by the
//! recorded timestamp.

use crate::error::ContractResult;
use acmc_ledger::ChaincodeStub;
use acmc_rbac::Decision;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default infix of audit keys.
pub const DEFAULT_LOG_SEPARATOR: &str = "_log_";

/// Exclusive upper bound appended to an audit prefix.
const RANGE_END: char = '\u{FFFF}';

/// A recorded access decision.
///
/// Stored as `{"uid": ..., "decision": "Permit"|"Deny", "time": <RFC 3339>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLog {
    /// Requesting identity
    pub uid: String,
    /// Outcome of the check
    pub decision: Decision,
    /// Timestamp of the checking transaction
    pub time: DateTime<Utc>,
}

/// Append-only per-resource access log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    separator: String,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_SEPARATOR)
    }
}

impl AuditLog {
    /// Create a log using `separator` between content id and transaction id.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    fn prefix(&self, content_id: &str) -> String {
        format!("{}{}", content_id, self.separator)
    }

    /// State key of the entry written by transaction `tx_id`.
    pub fn entry_key(&self, content_id: &str, tx_id: &str) -> String {
        format!("{}{}", self.prefix(content_id), tx_id)
    }

    /// Record a decision for the current transaction.
    ///
    /// Written with a blind put; the content id need not be registered.
    pub async fn append(
        &self,
        stub: &dyn ChaincodeStub,
        content_id: &str,
        identity: &str,
        decision: Decision,
    ) -> ContractResult<AccessLog> {
        let entry = AccessLog {
            uid: identity.to_string(),
            decision,
            time: stub.tx_timestamp(),
        };
        let key = self.entry_key(content_id, stub.tx_id());
        stub.put_state(&key, serde_json::to_vec(&entry)?).await?;

        tracing::debug!(key = %key, decision = %decision, "Audit entry staged");
        Ok(entry)
    }

    /// All entries for a resource, in key order.
    ///
    /// Entries that do not decode are skipped.
    pub async fn query_by_resource(&self, stub: &dyn ChaincodeStub, content_id: &str) -> ContractResult<Vec<AccessLog>> {
        let start_key = self.prefix(content_id);
        let mut end_key = start_key.clone();
        end_key.push(RANGE_END);

        let mut entries = Vec::new();
        for item in stub.get_state_by_range(&start_key, &end_key).await? {
            let item = item?;
            match serde_json::from_slice::<AccessLog>(&item.value) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::debug!(key = %item.key, error = %e, "Skipping undecodable audit entry"),
            }
        }
        Ok(entries)
    }

    /// All entries for a resource, oldest first.
    ///
    /// Entries with equal timestamps keep their key order.
    pub async fn query_chronological(
        &self,
        stub: &dyn ChaincodeStub,
        content_id: &str,
    ) -> ContractResult<Vec<AccessLog>> {
        let mut entries = self.query_by_resource(stub, content_id).await?;
        entries.sort_by_key(|e| e.time);
        Ok(entries)
    }
}
