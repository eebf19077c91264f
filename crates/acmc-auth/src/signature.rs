//! Signature verification and signing
//!
//! RSASSA-PKCS1-v1_5 with SHA-256 (RS256). Signatures travel as standard,
//! padded base64; the message is hashed as part of verification.

use crate::error::{AuthError, AuthResult};
use crate::keys::{RsaPrivateKey, RsaPublicKey};
use crate::message::SignedMessage;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use jsonwebtoken::Algorithm;

/// Verify a base64 signature over a message with an already parsed key.
///
/// # Arguments
///
/// * `message` - The signed statement
/// * `signature_b64` - Standard base64 signature
/// * `key` - Signer's public key
///
/// # Returns
///
/// `Ok(())` on a valid signature; `InvalidEncoding` if the signature is not
/// base64, `SignatureInvalid` if it does not verify
pub fn verify(message: &SignedMessage<'_>, signature_b64: &str, key: &RsaPublicKey) -> AuthResult<()> {
    let raw = STANDARD
        .decode(signature_b64)
        .map_err(|e| AuthError::InvalidEncoding(format!("decode signature failed: {}", e)))?;

    let valid = jsonwebtoken::crypto::verify(
        &URL_SAFE_NO_PAD.encode(raw),
        &message.to_bytes(),
        key.decoding_key(),
        Algorithm::RS256,
    )
    .map_err(|e| AuthError::SignatureInvalid(e.to_string()))?;

    if valid {
        Ok(())
    } else {
        Err(AuthError::SignatureInvalid(format!(
            "signature does not match message for identity {}",
            message.identity()
        )))
    }
}

/// Parse a PEM public key and verify a signature with it.
///
/// Keys are parsed on every call; nothing is cached between calls.
pub fn verify_with_pem(message: &SignedMessage<'_>, signature_b64: &str, public_key_pem: &str) -> AuthResult<()> {
    let key = RsaPublicKey::from_pem(public_key_pem)?;
    verify(message, signature_b64, &key)
}

/// Client-side signer producing signatures the contract accepts.
///
/// # Example
///
/// ```rust,no_run
/// use acmc_auth::{RsaSigner, SignedMessage};
///
/// let pem = std::fs::read_to_string("user_1_private_key.pem").unwrap();
/// let signer = RsaSigner::from_pem(&pem).unwrap();
/// let signature = signer
///     .sign(&SignedMessage::ownership_binding("user-1", "QmCid"))
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RsaSigner {
    key: RsaPrivateKey,
}

impl RsaSigner {
    /// Create a signer from a parsed private key.
    pub fn new(key: RsaPrivateKey) -> Self {
        Self { key }
    }

    /// Create a signer from a PEM private key.
    pub fn from_pem(pem: &str) -> AuthResult<Self> {
        Ok(Self::new(RsaPrivateKey::from_pem(pem)?))
    }

    /// Sign a message, returning standard base64.
    pub fn sign(&self, message: &SignedMessage<'_>) -> AuthResult<String> {
        let url_safe = jsonwebtoken::crypto::sign(&message.to_bytes(), self.key.encoding_key(), Algorithm::RS256)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        let raw = URL_SAFE_NO_PAD
            .decode(url_safe)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        Ok(STANDARD.encode(raw))
    }
}
