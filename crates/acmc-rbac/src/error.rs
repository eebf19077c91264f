//! Error types for role and policy operations

use acmc_ledger::LedgerError;
use thiserror::Error;

/// RBAC error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RbacError {
    /// Role is not a member of the role set
    #[error("role {0:?} not in system role set")]
    UnknownRole(String),

    /// Role list argument could not be parsed
    #[error("parse role list failed: {0}")]
    MalformedRoleList(String),

    /// Stored record could not be decoded
    #[error("corrupt record at key {key}: {message}")]
    CorruptRecord {
        /// Key of the unreadable record
        key: String,
        /// Decoder message
        message: String,
    },

    /// Underlying ledger failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type for RBAC operations.
pub type RbacResult<T> = Result<T, RbacError>;
