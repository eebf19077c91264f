//! # Policy Store
//!
//! Permissions are individual composite keys, one per
//! `(role, content_id, operation)` tuple:
//!
//! ```text
//! \0 policy \0 <role> \0 <content_id> \0 <operation> \0   =>   0x01
//! ```
//!
//! Existence of the key is the whole grant. Granting is a blind write (no read
//! first), so concurrent grants on any tuples never produce read-write
//! conflicts, and re-granting the same tuple is a harmless overwrite. A check
//! is a single point lookup, independent of how many grants exist.
//!
//! There is no revoke operation.

use crate::error::RbacResult;
use acmc_ledger::ChaincodeStub;
use serde::{Deserialize, Serialize};

/// Namespace of policy composite keys.
pub const DEFAULT_POLICY_NAMESPACE: &str = "policy";

/// Value stored under every policy key.
pub const PRESENCE_MARKER: [u8; 1] = [0x01];

/// "Role `role` may perform `operation` on resource `content_id`."
///
/// # Example
///
/// ```
/// use acmc_rbac::PolicyKey;
///
/// let key = PolicyKey::new("Creator", "QmCid", "download");
/// assert_eq!(key.to_string(), "Creator:QmCid:download");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyKey {
    /// Role the grant applies to
    pub role: String,
    /// Resource the grant applies to
    pub content_id: String,
    /// Permitted operation (e.g., "download")
    pub operation: String,
}

impl PolicyKey {
    /// Create a policy key.
    pub fn new(role: impl Into<String>, content_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content_id: content_id.into(),
            operation: operation.into(),
        }
    }
}

impl std::fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.role, self.content_id, self.operation)
    }
}

/// Composite-key permission index.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    namespace: String,
}

impl Default for PolicyStore {
    fn default() -> Self {
        Self::new(DEFAULT_POLICY_NAMESPACE)
    }
}

impl PolicyStore {
    /// Create a store writing under the given composite-key namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Composite-key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn state_key(&self, stub: &dyn ChaincodeStub, key: &PolicyKey) -> RbacResult<String> {
        Ok(stub.create_composite_key(
            &self.namespace,
            &[key.role.as_str(), key.content_id.as_str(), key.operation.as_str()],
        )?)
    }

    /// Record a grant with a blind write.
    pub async fn grant(&self, stub: &dyn ChaincodeStub, key: &PolicyKey) -> RbacResult<()> {
        let state_key = self.state_key(stub, key)?;
        stub.put_state(&state_key, PRESENCE_MARKER.to_vec()).await?;
        tracing::debug!(policy = %key, "Policy entry written");
        Ok(())
    }

    /// Check whether a grant exists.
    pub async fn has_permission(&self, stub: &dyn ChaincodeStub, key: &PolicyKey) -> RbacResult<bool> {
        let state_key = self.state_key(stub, key)?;
        Ok(stub.get_state(&state_key).await?.is_some())
    }

    /// List every grant held by a role, in key order.
    ///
    /// Keys that do not split into exactly three attributes are skipped.
    pub async fn grants_for_role(&self, stub: &dyn ChaincodeStub, role: &str) -> RbacResult<Vec<PolicyKey>> {
        let iter = stub
            .get_state_by_partial_composite_key(&self.namespace, &[role])
            .await?;

        let mut grants = Vec::new();
        for entry in iter {
            let entry = entry?;
            let (_, attributes) = stub.split_composite_key(&entry.key)?;
            if let [role, content_id, operation] = attributes.as_slice() {
                grants.push(PolicyKey::new(role.as_str(), content_id.as_str(), operation.as_str()));
            }
        }
        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acmc_ledger::MemoryLedger;

    #[tokio::test]
    async fn test_grant_then_check() {
        let ledger = MemoryLedger::new();
        let store = PolicyStore::default();
        let key = PolicyKey::new("Creator", "cid-1", "download");

        let tx = ledger.begin();
        assert!(!store.has_permission(&tx, &key).await.unwrap());
        store.grant(&tx, &key).await.unwrap();
        tx.commit().await.unwrap();

        let tx = ledger.begin();
        assert!(store.has_permission(&tx, &key).await.unwrap());
        assert!(!store
            .has_permission(&tx, &PolicyKey::new("Public", "cid-1", "download"))
            .await
            .unwrap());
        assert!(!store
            .has_permission(&tx, &PolicyKey::new("Creator", "cid-1", "upload"))
            .await
            .unwrap());
        assert!(!store
            .has_permission(&tx, &PolicyKey::new("Creator", "cid-2", "download"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_grant_is_blind_write() {
        let ledger = MemoryLedger::new();
        let store = PolicyStore::default();

        let tx = ledger.begin();
        store
            .grant(&tx, &PolicyKey::new("Creator", "cid-1", "download"))
            .await
            .unwrap();
        let receipt = tx.commit().await.unwrap();
        assert_eq!(receipt.reads, 0);
        assert_eq!(receipt.writes, 1);
    }

    #[tokio::test]
    async fn test_concurrent_grants_commit() {
        let ledger = MemoryLedger::new();
        let store = PolicyStore::default();

        let first = ledger.begin();
        let second = ledger.begin();
        store
            .grant(&first, &PolicyKey::new("Creator", "cid-1", "download"))
            .await
            .unwrap();
        store
            .grant(&second, &PolicyKey::new("Creator", "cid-1", "download"))
            .await
            .unwrap();
        store
            .grant(&second, &PolicyKey::new("Public", "cid-1", "download"))
            .await
            .unwrap();

        first.commit().await.unwrap();
        second.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_regrant_is_idempotent() {
        let ledger = MemoryLedger::new();
        let store = PolicyStore::default();
        let key = PolicyKey::new("Creator", "cid-1", "download");

        for _ in 0..2 {
            let tx = ledger.begin();
            store.grant(&tx, &key).await.unwrap();
            tx.commit().await.unwrap();
        }

        assert_eq!(ledger.len().await, 1);
        let tx = ledger.begin();
        assert_eq!(store.grants_for_role(&tx, "Creator").await.unwrap(), vec![key]);
    }

    #[tokio::test]
    async fn test_grants_for_role() {
        let ledger = MemoryLedger::new();
        let store = PolicyStore::default();

        let tx = ledger.begin();
        for key in [
            PolicyKey::new("Creator", "cid-1", "download"),
            PolicyKey::new("Creator", "cid-2", "upload"),
            PolicyKey::new("Contributor", "cid-1", "download"),
        ] {
            store.grant(&tx, &key).await.unwrap();
        }
        tx.commit().await.unwrap();

        let tx = ledger.begin();
        let grants = store.grants_for_role(&tx, "Creator").await.unwrap();
        assert_eq!(
            grants,
            vec![
                PolicyKey::new("Creator", "cid-1", "download"),
                PolicyKey::new("Creator", "cid-2", "upload"),
            ]
        );
        assert!(store.grants_for_role(&tx, "Public").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reserved_characters_rejected() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        let key = PolicyKey::new("Creator", "cid\u{0}evil", "download");
        assert!(PolicyStore::default().grant(&tx, &key).await.is_err());
    }
}
