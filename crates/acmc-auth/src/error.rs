//! Error types for credential verification
//!
//! This module defines the errors raised while parsing key material,
//! decoding signatures, and verifying or producing signatures.

use thiserror::Error;

/// Credential error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Public or private key PEM is malformed or not an RSA key
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// Signature is not valid standard base64
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Signature does not verify against the message and key
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// Producing a signature failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Result type for credential operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidKeyMaterial(_) => "INVALID_KEY_MATERIAL",
            AuthError::InvalidEncoding(_) => "INVALID_ENCODING",
            AuthError::SignatureInvalid(_) => "SIGNATURE_INVALID",
            AuthError::SigningFailed(_) => "SIGNING_FAILED",
        }
    }
}
