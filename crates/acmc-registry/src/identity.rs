//! # Identity Registry
//!
//! Maps an identity string to its PEM public key and role. Entries are written
//! once and never updated or removed.
//!
//! Identities share the plain key space with resources: the identity string is
//! the state key.

use crate::error::{RegistryError, RegistryResult};
use crate::record;
use acmc_auth::RsaPublicKey;
use acmc_ledger::ChaincodeStub;
use acmc_rbac::RoleSetStore;
use serde::{Deserialize, Serialize};

const ENTITY: &str = "identity";

/// A registered identity.
///
/// Stored as `{"pk": <PEM>, "role": <role>}`.
///
/// # Examples
///
/// ```
/// use acmc_registry::Identity;
///
/// let identity = Identity::new("-----BEGIN PUBLIC KEY-----\n...", "Creator");
/// let json = serde_json::to_string(&identity).unwrap();
/// assert!(json.contains("\"pk\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// PEM-encoded RSA public key
    #[serde(rename = "pk")]
    pub public_key: String,

    /// Role name, used verbatim in permission checks
    pub role: String,
}

impl Identity {
    /// Create an identity record.
    pub fn new(public_key: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            role: role.into(),
        }
    }
}

/// Registration and lookup of identities.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    role_sets: RoleSetStore,
}

impl IdentityRegistry {
    /// Create a registry seeding the given role set store on first registration.
    pub fn new(role_sets: RoleSetStore) -> Self {
        Self { role_sets }
    }

    /// Role set store seeded by [`register`](Self::register).
    pub fn role_sets(&self) -> &RoleSetStore {
        &self.role_sets
    }

    /// Register a new identity.
    ///
    /// The role set is initialized before anything else is checked, so the
    /// seed is staged even when registration then fails.
    ///
    /// The role is stored as given; it is not checked against the role set.
    ///
    /// # Arguments
    ///
    /// * `stub` - Transaction-scoped ledger access
    /// * `identity` - Identity string (state key)
    /// * `public_key_pem` - PEM-encoded RSA public key
    /// * `role` - Role name
    ///
    /// # Returns
    ///
    /// The stored record, `AlreadyExists` if the identity is taken, or
    /// `Auth(InvalidKeyMaterial)` if the key does not parse
    pub async fn register(
        &self,
        stub: &dyn ChaincodeStub,
        identity: &str,
        public_key_pem: &str,
        role: &str,
    ) -> RegistryResult<Identity> {
        self.role_sets.ensure_initialized(stub).await?;

        if stub.get_state(identity).await?.is_some() {
            return Err(RegistryError::already_exists(ENTITY, identity));
        }

        RsaPublicKey::from_pem(public_key_pem)?;

        let record = Identity::new(public_key_pem, role);
        stub.put_state(identity, record::encode(identity, &record)?).await?;

        tracing::debug!(identity = %identity, role = %role, "Identity staged");
        Ok(record)
    }

    /// Load an identity if registered.
    pub async fn find(&self, stub: &dyn ChaincodeStub, identity: &str) -> RegistryResult<Option<Identity>> {
        match stub.get_state(identity).await? {
            Some(bytes) => Ok(Some(record::decode(identity, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Load an identity, failing `NotFound` if it was never registered.
    pub async fn lookup(&self, stub: &dyn ChaincodeStub, identity: &str) -> RegistryResult<Identity> {
        self.find(stub, identity)
            .await?
            .ok_or_else(|| RegistryError::not_found(ENTITY, identity))
    }
}
