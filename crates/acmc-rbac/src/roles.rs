//! # Role Set
//!
//! The closed set of role names a permission grant may target. It is stored
//! once under a fixed key, seeded lazily the first time an identity registers,
//! and never modified afterwards.

use crate::error::{RbacError, RbacResult};
use acmc_ledger::ChaincodeStub;
use serde::{Deserialize, Serialize};

/// Key the role set is stored under.
pub const DEFAULT_ROLE_SET_KEY: &str = "roleSet";

/// Roles seeded on first registration.
pub const DEFAULT_ROLES: [&str; 3] = ["Creator", "Contributor", "Public"];

/// Ordered collection of valid role names.
///
/// Serialized as a plain JSON array of strings.
///
/// # Examples
///
/// ```
/// use acmc_rbac::RoleSet;
///
/// let roles = RoleSet::default_seed();
/// assert!(roles.contains("Creator"));
/// assert!(!roles.contains("creator"));
/// assert_eq!(roles.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: Vec<String>,
}

impl RoleSet {
    /// Create a role set from names, keeping the given order.
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// The default seed (`Creator`, `Contributor`, `Public`).
    pub fn default_seed() -> Self {
        Self::new(DEFAULT_ROLES)
    }

    /// Check membership (case-sensitive).
    pub fn contains(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Role names in stored order.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// A role list supplied to a grant, parsed from its JSON array form.
///
/// # Examples
///
/// ```
/// use acmc_rbac::{RoleList, RoleSet};
///
/// let list = RoleList::parse_json(r#"["Creator","Contributor"]"#).unwrap();
/// assert_eq!(list.roles(), ["Creator", "Contributor"]);
/// assert!(list.validate(&RoleSet::default_seed()).is_ok());
///
/// assert!(RoleList::parse_json("Creator").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleList {
    roles: Vec<String>,
}

impl RoleList {
    /// Create from role names.
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a JSON array of strings.
    ///
    /// # Returns
    ///
    /// The list, or `RbacError::MalformedRoleList` for anything other than an
    /// array of strings
    pub fn parse_json(json: &str) -> RbacResult<Self> {
        serde_json::from_str(json).map_err(|e| RbacError::MalformedRoleList(e.to_string()))
    }

    /// Requested roles in the order given.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Check if no role was requested.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Check every requested role against the role set, in order.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all roles are known, otherwise `RbacError::UnknownRole`
    /// naming the first unknown role
    pub fn validate(&self, role_set: &RoleSet) -> RbacResult<()> {
        match self.roles.iter().find(|role| !role_set.contains(role)) {
            Some(unknown) => Err(RbacError::UnknownRole(unknown.clone())),
            None => Ok(()),
        }
    }
}

/// Reads and lazily seeds the stored role set.
#[derive(Debug, Clone)]
pub struct RoleSetStore {
    key: String,
    seed: RoleSet,
}

impl Default for RoleSetStore {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_SET_KEY, RoleSet::default_seed())
    }
}

impl RoleSetStore {
    /// Create a store for the given key and seed.
    ///
    /// # Arguments
    ///
    /// * `key` - State key holding the role set
    /// * `seed` - Roles written when the key is absent
    pub fn new(key: impl Into<String>, seed: RoleSet) -> Self {
        Self { key: key.into(), seed }
    }

    /// State key of the role set.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the role set, if it was ever written.
    pub async fn load(&self, stub: &dyn ChaincodeStub) -> RbacResult<Option<RoleSet>> {
        let Some(bytes) = stub.get_state(&self.key).await? else {
            return Ok(None);
        };

        let roles = serde_json::from_slice(&bytes).map_err(|e| RbacError::CorruptRecord {
            key: self.key.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(roles))
    }

    /// Load the role set, treating an absent set as empty.
    ///
    /// Before any identity has registered no role is valid.
    pub async fn current(&self, stub: &dyn ChaincodeStub) -> RbacResult<RoleSet> {
        Ok(self.load(stub).await?.unwrap_or_default())
    }

    /// Load the role set, writing the seed first if it is absent.
    ///
    /// # Returns
    ///
    /// The stored set, or the seed if it was just written
    pub async fn ensure_initialized(&self, stub: &dyn ChaincodeStub) -> RbacResult<RoleSet> {
        if let Some(existing) = self.load(stub).await? {
            return Ok(existing);
        }

        let bytes = serde_json::to_vec(&self.seed).map_err(|e| RbacError::CorruptRecord {
            key: self.key.clone(),
            message: e.to_string(),
        })?;
        stub.put_state(&self.key, bytes).await?;

        tracing::debug!(key = %self.key, roles = ?self.seed.roles(), "Role set initialized");
        Ok(self.seed.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acmc_ledger::MemoryLedger;

    #[test]
    fn test_role_set_membership() {
        let roles = RoleSet::new(["Creator", "Public"]);
        assert!(roles.contains("Creator"));
        assert!(roles.contains("Public"));
        assert!(!roles.contains("Contributor"));
        assert!(!roles.contains("public"));
    }

    #[test]
    fn test_role_set_serializes_as_array() {
        let json = serde_json::to_string(&RoleSet::default_seed()).unwrap();
        assert_eq!(json, r#"["Creator","Contributor","Public"]"#);
    }

    #[test]
    fn test_role_list_parse() {
        let list = RoleList::parse_json(r#"["Creator"]"#).unwrap();
        assert_eq!(list.roles(), ["Creator"]);
        assert!(RoleList::parse_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_role_list_parse_rejects_non_string_arrays() {
        assert!(matches!(RoleList::parse_json("[1, 2]"), Err(RbacError::MalformedRoleList(_))));
        assert!(matches!(RoleList::parse_json(r#"{"role":"x"}"#), Err(RbacError::MalformedRoleList(_))));
        assert!(matches!(RoleList::parse_json(""), Err(RbacError::MalformedRoleList(_))));
    }

    #[test]
    fn test_role_list_validate_reports_first_unknown() {
        let list = RoleList::new(["Creator", "Admin", "Root"]);
        assert_eq!(
            list.validate(&RoleSet::default_seed()),
            Err(RbacError::UnknownRole("Admin".to_string()))
        );
    }

    #[tokio::test]
    async fn test_ensure_initialized_seeds_once() {
        let ledger = MemoryLedger::new();
        let store = RoleSetStore::default();

        let tx = ledger.begin();
        assert!(store.load(&tx).await.unwrap().is_none());
        let seeded = store.ensure_initialized(&tx).await.unwrap();
        assert_eq!(seeded, RoleSet::default_seed());
        tx.commit().await.unwrap();

        let tx = ledger.begin();
        assert_eq!(store.load(&tx).await.unwrap(), Some(RoleSet::default_seed()));
        store.ensure_initialized(&tx).await.unwrap();
        assert!(tx.pending_writes().await.is_empty());
    }

    #[tokio::test]
    async fn test_existing_role_set_is_not_overwritten() {
        let ledger = MemoryLedger::new();
        let custom = RoleSetStore::new(DEFAULT_ROLE_SET_KEY, RoleSet::new(["Auditor"]));

        let tx = ledger.begin();
        custom.ensure_initialized(&tx).await.unwrap();
        tx.commit().await.unwrap();

        let tx = ledger.begin();
        let roles = RoleSetStore::default().ensure_initialized(&tx).await.unwrap();
        assert_eq!(roles, RoleSet::new(["Auditor"]));
    }

    #[tokio::test]
    async fn test_current_is_empty_before_seed() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        assert!(RoleSetStore::default().current(&tx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_role_set() {
        use acmc_ledger::ChaincodeStub;

        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state(DEFAULT_ROLE_SET_KEY, b"not json".to_vec()).await.unwrap();
        tx.commit().await.unwrap();

        let tx = ledger.begin();
        assert!(matches!(
            RoleSetStore::default().load(&tx).await,
            Err(RbacError::CorruptRecord { .. })
        ));
    }
}
