//! Error types for ledger operations
//!
//! Covers key validation and commit-time concurrency conflicts.

use thiserror::Error;

/// Ledger error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Key or composite key attribute is not acceptable to the store
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A key read by the transaction changed before commit
    #[error("MVCC read conflict on key {key}")]
    MvccReadConflict {
        /// Conflicting key.
        key: String,
    },

    /// A range scanned by the transaction gained, lost, or changed keys before commit
    #[error("Phantom read conflict in range [{start_key}, {end_key})")]
    PhantomReadConflict {
        /// Inclusive start of the scanned range.
        start_key: String,
        /// Exclusive end of the scanned range.
        end_key: String,
    },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Check if this error is a commit-time concurrency conflict.
    ///
    /// Conflicting transactions may be resubmitted; every other error is final.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            LedgerError::MvccReadConflict { .. } | LedgerError::PhantomReadConflict { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_conflict() {
        assert!(LedgerError::MvccReadConflict { key: "k".to_string() }.is_conflict());
        assert!(LedgerError::PhantomReadConflict {
            start_key: "a".to_string(),
            end_key: "b".to_string(),
        }
        .is_conflict());
        assert!(!LedgerError::InvalidKey("k".to_string()).is_conflict());
    }
}
