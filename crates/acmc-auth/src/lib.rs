//! # ACMC Auth
//!
//! Credential verification for the access-control contract.
//!
//! ## Overview
//!
//! The acmc-auth crate handles:
//! - **Keys**: PEM parsing of RSA public keys (and private keys for signers)
//! - **Messages**: The two canonical signed-message variants
//! - **Verification**: RSASSA-PKCS1-v1_5 / SHA-256 over standard base64 signatures
//! - **Signing**: A client-side signer producing signatures the contract accepts
//! - **Identity**: Deriving an identity string from a public key
//!
//! ## Message Variants
//!
//! ```text
//! OwnershipBinding = identity ++ content_id   (grants, permission checks)
//! IdentityOnly     = identity                 (resource creation)
//! ```
//!
//! Neither variant carries a nonce, timestamp, or counter: a captured
//! signature can be resubmitted indefinitely.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acmc_auth::{verify_with_pem, RsaSigner, SignedMessage};
//!
//! let private_pem = std::fs::read_to_string("user_1_private_key.pem").unwrap();
//! let public_pem = std::fs::read_to_string("user_1_public_key.pem").unwrap();
//!
//! let message = SignedMessage::ownership_binding("user-1", "QmCid");
//! let signature = RsaSigner::from_pem(&private_pem).unwrap().sign(&message).unwrap();
//!
//! verify_with_pem(&message, &signature, &public_pem).unwrap();
//! ```
//!
//! ## Features
//!
//! - `test-fixtures`: Fixed RSA key pairs for tests in dependent crates

pub mod error;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod identity;
pub mod keys;
pub mod message;
pub mod signature;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use identity::identity_from_public_key;
pub use keys::{RsaPrivateKey, RsaPublicKey, MAX_MODULUS_BITS, MIN_MODULUS_BITS};
pub use message::SignedMessage;
pub use signature::{verify, verify_with_pem, RsaSigner};
