//! # Signed Messages
//!
//! The canonical byte strings a caller signs. Neither variant carries a nonce
//! or expiry, so a signature stays valid for as long as the key does.

/// A message covered by a caller's signature.
///
/// # Example
///
/// ```
/// use acmc_auth::SignedMessage;
///
/// let binding = SignedMessage::ownership_binding("user-1", "QmCid");
/// assert_eq!(binding.to_bytes(), b"user-1QmCid".to_vec());
///
/// let identity_only = SignedMessage::identity_only("user-1");
/// assert_eq!(identity_only.to_bytes(), b"user-1".to_vec());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedMessage<'a> {
    /// `identity ++ content_id`; binds the statement to one resource.
    /// Used for permission grants and permission checks.
    OwnershipBinding {
        /// Signing identity
        identity: &'a str,
        /// Resource the statement is about
        content_id: &'a str,
    },

    /// `identity` alone; used for resource creation, before the content id exists on the ledger.
    IdentityOnly {
        /// Signing identity
        identity: &'a str,
    },
}

impl<'a> SignedMessage<'a> {
    /// Message binding `identity` to `content_id`.
    pub fn ownership_binding(identity: &'a str, content_id: &'a str) -> Self {
        Self::OwnershipBinding { identity, content_id }
    }

    /// Message covering only `identity`.
    pub fn identity_only(identity: &'a str) -> Self {
        Self::IdentityOnly { identity }
    }

    /// The signer's identity.
    pub fn identity(&self) -> &'a str {
        match self {
            Self::OwnershipBinding { identity, .. } | Self::IdentityOnly { identity } => identity,
        }
    }

    /// Canonical bytes to sign and verify.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::OwnershipBinding { identity, content_id } => {
                let mut bytes = Vec::with_capacity(identity.len() + content_id.len());
                bytes.extend_from_slice(identity.as_bytes());
                bytes.extend_from_slice(content_id.as_bytes());
                bytes
            }
            Self::IdentityOnly { identity } => identity.as_bytes().to_vec(),
        }
    }
}
