//! Error types for registry operations

use acmc_auth::AuthError;
use acmc_ledger::LedgerError;
use acmc_rbac::RbacError;
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No record under the key
    #[error("{entity} {id} not found")]
    NotFound {
        /// Record kind ("identity" or "resource")
        entity: &'static str,
        /// Key that was looked up
        id: String,
    },

    /// A record already occupies the key
    #[error("{entity} {id} already exists")]
    AlreadyExists {
        /// Record kind ("identity" or "resource")
        entity: &'static str,
        /// Key that was taken
        id: String,
    },

    /// Key parsing or signature verification failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Role set access failed
    #[error(transparent)]
    Rbac(#[from] RbacError),

    /// Underlying ledger failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Record could not be encoded or decoded
    #[error("serialization error at key {key}: {message}")]
    Serialization {
        /// Key of the record
        key: String,
        /// Encoder or decoder message
        message: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn already_exists(entity: &'static str, id: &str) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
