//! # Resource Registry
//!
//! Records the owner of each content identifier. Ownership is established by
//! the first successful creation and never changes.

use crate::error::{RegistryError, RegistryResult};
use crate::identity::IdentityRegistry;
use crate::record;
use acmc_auth::SignedMessage;
use acmc_ledger::ChaincodeStub;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ENTITY: &str = "resource";

/// A registered resource.
///
/// Stored as `{"ownerUID": ..., "cid": ..., "created": <RFC 3339>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Identity that created the resource
    #[serde(rename = "ownerUID")]
    pub owner: String,

    /// Content identifier
    pub cid: String,

    /// Timestamp of the creating transaction
    pub created: DateTime<Utc>,
}

impl Resource {
    /// Check if the given identity owns this resource.
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.owner == identity
    }
}

/// Creation and lookup of resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    identities: IdentityRegistry,
}

impl ResourceRegistry {
    /// Create a registry resolving owners through `identities`.
    pub fn new(identities: IdentityRegistry) -> Self {
        Self { identities }
    }

    /// Create a resource owned by `identity`.
    ///
    /// Checks run in order: content id free, identity registered, then the
    /// identity-only signature against the identity's registered key.
    ///
    /// # Arguments
    ///
    /// * `stub` - Transaction-scoped ledger access
    /// * `signature_b64` - Standard base64 signature over the identity
    /// * `identity` - Creating identity
    /// * `content_id` - Content identifier (state key)
    pub async fn create(
        &self,
        stub: &dyn ChaincodeStub,
        signature_b64: &str,
        identity: &str,
        content_id: &str,
    ) -> RegistryResult<Resource> {
        if stub.get_state(content_id).await?.is_some() {
            return Err(RegistryError::already_exists(ENTITY, content_id));
        }

        let creator = self.identities.lookup(stub, identity).await?;
        acmc_auth::verify_with_pem(
            &SignedMessage::identity_only(identity),
            signature_b64,
            &creator.public_key,
        )?;

        let resource = Resource {
            owner: identity.to_string(),
            cid: content_id.to_string(),
            created: stub.tx_timestamp(),
        };
        stub.put_state(content_id, record::encode(content_id, &resource)?).await?;

        tracing::debug!(content_id = %content_id, owner = %identity, "Resource staged");
        Ok(resource)
    }

    /// Load a resource, failing `NotFound` if absent.
    pub async fn lookup(&self, stub: &dyn ChaincodeStub, content_id: &str) -> RegistryResult<Resource> {
        match stub.get_state(content_id).await? {
            Some(bytes) => record::decode(content_id, &bytes),
            None => Err(RegistryError::not_found(ENTITY, content_id)),
        }
    }

    /// Owner identity of a resource.
    pub async fn lookup_owner(&self, stub: &dyn ChaincodeStub, content_id: &str) -> RegistryResult<String> {
        Ok(self.lookup(stub, content_id).await?.owner)
    }
}
