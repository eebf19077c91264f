//! Identity derivation
//!
//! Clients name an identity by the lowercase hex SHA-256 digest of its public
//! key PEM text. The contract itself treats identities as opaque strings and
//! never recomputes this.

use sha2::{Digest, Sha256};

/// Derive the identity string for a PEM public key.
///
/// # Example
///
/// ```
/// use acmc_auth::identity_from_public_key;
///
/// let id = identity_from_public_key("-----BEGIN PUBLIC KEY-----\n...");
/// assert_eq!(id.len(), 64);
/// ```
pub fn identity_from_public_key(public_key_pem: &str) -> String {
    hex::encode(Sha256::digest(public_key_pem.as_bytes()))
}
