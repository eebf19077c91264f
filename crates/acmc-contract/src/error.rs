//! Error types for contract operations
//!
//! Every lower-layer error is folded into one taxonomy so callers see a
//! single error value with a kind and a message.

use acmc_auth::AuthError;
use acmc_ledger::LedgerError;
use acmc_rbac::RbacError;
use acmc_registry::RegistryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Identity or resource is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity or resource is already registered
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Public key is malformed or not RSA
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Signature is not valid base64
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Signature does not verify
    #[error("Signature verification failed: {0}")]
    SignatureInvalid(String),

    /// Caller does not own the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Grant targets a role outside the role set
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Argument could not be parsed or has the wrong shape
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Dispatch received a function name it does not know
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Ledger failure, including commit conflicts
    #[error("Ledger error: {0}")]
    Ledger(LedgerError),

    /// Stored record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration or other internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// Failure kind, without the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidKeyMaterial,
    InvalidEncoding,
    SignatureInvalid,
    PermissionDenied,
    UnknownRole,
    MalformedInput,
    UnknownFunction,
    Ledger,
    Serialization,
    Internal,
}

impl ContractError {
    /// Failure kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContractError::NotFound(_) => ErrorKind::NotFound,
            ContractError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ContractError::InvalidKeyMaterial(_) => ErrorKind::InvalidKeyMaterial,
            ContractError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            ContractError::SignatureInvalid(_) => ErrorKind::SignatureInvalid,
            ContractError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            ContractError::UnknownRole(_) => ErrorKind::UnknownRole,
            ContractError::MalformedInput(_) => ErrorKind::MalformedInput,
            ContractError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            ContractError::Ledger(_) => ErrorKind::Ledger,
            ContractError::Serialization(_) => ErrorKind::Serialization,
            ContractError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            ContractError::NotFound(_) => "NOT_FOUND",
            ContractError::AlreadyExists(_) => "ALREADY_EXISTS",
            ContractError::InvalidKeyMaterial(_) => "INVALID_KEY_MATERIAL",
            ContractError::InvalidEncoding(_) => "INVALID_ENCODING",
            ContractError::SignatureInvalid(_) => "SIGNATURE_INVALID",
            ContractError::PermissionDenied(_) => "PERMISSION_DENIED",
            ContractError::UnknownRole(_) => "UNKNOWN_ROLE",
            ContractError::MalformedInput(_) => "MALFORMED_INPUT",
            ContractError::UnknownFunction(_) => "UNKNOWN_FUNCTION",
            ContractError::Ledger(e) if e.is_conflict() => "LEDGER_CONFLICT",
            ContractError::Ledger(_) => "LEDGER_ERROR",
            ContractError::Serialization(_) => "SERIALIZATION_ERROR",
            ContractError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the failure lies with the host rather than the caller's input.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ContractError::Ledger(_) | ContractError::Serialization(_) | ContractError::Internal(_)
        )
    }

    /// Check if the caller's credentials failed verification.
    ///
    /// A permission check that fails this way has already staged a `Deny`
    /// audit entry.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            ContractError::SignatureInvalid(_) | ContractError::InvalidEncoding(_)
        )
    }
}

impl From<LedgerError> for ContractError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidKey(message) => ContractError::MalformedInput(message),
            other => ContractError::Ledger(other),
        }
    }
}

impl From<AuthError> for ContractError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidKeyMaterial(m) => ContractError::InvalidKeyMaterial(m),
            AuthError::InvalidEncoding(m) => ContractError::InvalidEncoding(m),
            AuthError::SignatureInvalid(m) => ContractError::SignatureInvalid(m),
            AuthError::SigningFailed(m) => ContractError::Internal(m),
        }
    }
}

impl From<RbacError> for ContractError {
    fn from(err: RbacError) -> Self {
        match err {
            RbacError::UnknownRole(role) => ContractError::UnknownRole(role),
            RbacError::MalformedRoleList(m) => ContractError::MalformedInput(m),
            RbacError::CorruptRecord { key, message } => {
                ContractError::Serialization(format!("{}: {}", key, message))
            }
            RbacError::Ledger(e) => e.into(),
        }
    }
}

impl From<RegistryError> for ContractError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { .. } => ContractError::NotFound(err.to_string()),
            RegistryError::AlreadyExists { .. } => ContractError::AlreadyExists(err.to_string()),
            RegistryError::Auth(e) => e.into(),
            RegistryError::Rbac(e) => e.into(),
            RegistryError::Ledger(e) => e.into(),
            RegistryError::Serialization { key, message } => {
                ContractError::Serialization(format!("{}: {}", key, message))
            }
        }
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        ContractError::Serialization(err.to_string())
    }
}
