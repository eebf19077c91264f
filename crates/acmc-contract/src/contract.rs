//! # Access Control Contract
//!
//! Orchestrates registration, resource creation, ownership-gated grants and
//! permission checks on top of the registries, the policy store and the audit
//! log. Every method runs inside the caller's transaction; the contract keeps
//! no state of its own between calls.
//!
//! ## Grant path
//!
//! ```text
//! resource exists? ─► caller owns it? ─► caller registered? ─► signature ok?
//!     ─► role list parses? ─► every role in role set? ─► blind-write each grant
//! ```
//!
//! ## Check path
//!
//! ```text
//! caller registered? ─► signature ok? ──no──► audit Deny, fail SignatureInvalid
//!                            │
//!                           yes ─► policy lookup ──error──► audit Deny, fail
//!                                        │
//!                                        ok ─► audit decision ─► Permit | Deny
//! ```

use crate::audit::{AccessLog, AuditLog};
use crate::config::ContractConfig;
use crate::error::{ContractError, ContractResult};
use acmc_auth::SignedMessage;
use acmc_ledger::ChaincodeStub;
use acmc_rbac::{Decision, PolicyKey, PolicyStore, RoleList, RoleSet, RoleSetStore};
use acmc_registry::{Identity, IdentityRegistry, Resource, ResourceRegistry};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// The access-control contract.
///
/// # Example
///
/// ```rust,no_run
/// use acmc_contract::AccessControlContract;
/// use acmc_ledger::MemoryLedger;
///
/// async fn example(public_pem: &str) {
///     let contract = AccessControlContract::default();
///     let ledger = MemoryLedger::new();
///
///     let tx = ledger.begin();
///     contract.register(&tx, "user-1", public_pem, "Creator").await.unwrap();
///     tx.commit().await.unwrap();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AccessControlContract {
    config: ContractConfig,
    role_sets: RoleSetStore,
    identities: IdentityRegistry,
    resources: ResourceRegistry,
    policies: PolicyStore,
    audit: AuditLog,
}

impl Default for AccessControlContract {
    fn default() -> Self {
        Self::build(ContractConfig::default())
    }
}

impl AccessControlContract {
    /// Create a contract from a validated configuration.
    pub fn new(config: ContractConfig) -> ContractResult<Self> {
        config
            .validate()
            .map_err(|e| ContractError::Internal(e.to_string()))?;
        Ok(Self::build(config))
    }

    /// Create a contract from environment configuration.
    pub fn from_env() -> ContractResult<Self> {
        Self::new(ContractConfig::from_env())
    }

    fn build(config: ContractConfig) -> Self {
        let role_sets = RoleSetStore::new(
            config.role_set_key.clone(),
            RoleSet::new(config.default_roles.iter().cloned()),
        );
        let identities = IdentityRegistry::new(role_sets.clone());
        Self {
            resources: ResourceRegistry::new(identities.clone()),
            identities,
            role_sets,
            policies: PolicyStore::new(config.policy_namespace.clone()),
            audit: AuditLog::new(config.log_separator.clone()),
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Audit log used by permission checks.
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Register an identity with its public key and role.
    ///
    /// Seeds the role set on first use. Fails `AlreadyExists` for a taken
    /// identity and `InvalidKeyMaterial` for an unusable key.
    #[instrument(skip(self, stub, public_key_pem), fields(tx_id = %stub.tx_id()))]
    pub async fn register(
        &self,
        stub: &dyn ChaincodeStub,
        identity: &str,
        public_key_pem: &str,
        role: &str,
    ) -> ContractResult<()> {
        let start = Instant::now();
        self.identities.register(stub, identity, public_key_pem, role).await?;

        info!(
            identity = %identity,
            role = %role,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Identity registered"
        );
        Ok(())
    }

    /// Look up a registered identity.
    #[instrument(skip(self, stub))]
    pub async fn query_identity(&self, stub: &dyn ChaincodeStub, identity: &str) -> ContractResult<Identity> {
        Ok(self.identities.lookup(stub, identity).await?)
    }

    /// Create a resource owned by `identity`.
    ///
    /// The signature covers the identity alone.
    #[instrument(skip(self, stub, signature_b64), fields(tx_id = %stub.tx_id()))]
    pub async fn create_resource(
        &self,
        stub: &dyn ChaincodeStub,
        signature_b64: &str,
        identity: &str,
        content_id: &str,
    ) -> ContractResult<Resource> {
        let start = Instant::now();
        let resource = match self.resources.create(stub, signature_b64, identity, content_id).await {
            Ok(resource) => resource,
            Err(e) => {
                let err = ContractError::from(e);
                if err.is_credential_failure() {
                    warn!(identity = %identity, content_id = %content_id, error = %err, "Resource creation signature rejected");
                }
                return Err(err);
            }
        };

        info!(
            identity = %identity,
            content_id = %content_id,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resource created"
        );
        Ok(resource)
    }

    /// Grant `operation` on `content_id` to every role in `role_list_json`.
    ///
    /// Only the resource owner may grant, with a signature over
    /// `identity ++ content_id`. The whole role list is checked against the
    /// role set before anything is written; the first unknown role fails the
    /// call and no grant is staged.
    ///
    /// # Returns
    ///
    /// The policy entries written, in role-list order
    #[instrument(skip(self, stub, signature_b64, role_list_json), fields(tx_id = %stub.tx_id()))]
    pub async fn grant_permissions(
        &self,
        stub: &dyn ChaincodeStub,
        signature_b64: &str,
        identity: &str,
        content_id: &str,
        operation: &str,
        role_list_json: &str,
    ) -> ContractResult<Vec<PolicyKey>> {
        let start = Instant::now();

        let resource = self.resources.lookup(stub, content_id).await?;
        if !resource.is_owned_by(identity) {
            warn!(identity = %identity, content_id = %content_id, owner = %resource.owner, "Grant denied to non-owner");
            return Err(ContractError::PermissionDenied(format!(
                "{} is not the owner of {}",
                identity, content_id
            )));
        }

        let caller = self.identities.lookup(stub, identity).await?;
        self.verify_binding(identity, content_id, signature_b64, &caller)?;

        let roles = RoleList::parse_json(role_list_json)?;
        let role_set = self.role_sets.current(stub).await?;
        if let Err(e) = roles.validate(&role_set) {
            warn!(content_id = %content_id, operation = %operation, error = %e, "Grant rejected");
            return Err(e.into());
        }

        let mut granted = Vec::with_capacity(roles.roles().len());
        for role in roles.roles() {
            let key = PolicyKey::new(role.as_str(), content_id, operation);
            self.policies.grant(stub, &key).await?;
            granted.push(key);
        }

        info!(
            identity = %identity,
            content_id = %content_id,
            operation = %operation,
            roles = ?roles.roles(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Permissions granted"
        );
        Ok(granted)
    }

    /// Decide whether `identity` may perform `operation` on `content_id`.
    ///
    /// Every adjudicated request appends one audit entry. A rejected
    /// signature or a failed policy lookup appends `Deny` before the call
    /// fails; an unregistered identity fails without an entry. `Deny` is an
    /// ordinary result.
    #[instrument(skip(self, stub, signature_b64), fields(tx_id = %stub.tx_id()))]
    pub async fn check_permission(
        &self,
        stub: &dyn ChaincodeStub,
        signature_b64: &str,
        operation: &str,
        identity: &str,
        content_id: &str,
    ) -> ContractResult<Decision> {
        let start = Instant::now();

        let caller = self.identities.lookup(stub, identity).await?;
        if let Err(e) = self.verify_binding(identity, content_id, signature_b64, &caller) {
            self.audit.append(stub, content_id, identity, Decision::Deny).await?;
            return Err(e);
        }

        let key = PolicyKey::new(caller.role.as_str(), content_id, operation);
        let decision = match self.policies.has_permission(stub, &key).await {
            Ok(allowed) => Decision::from_allowed(allowed),
            Err(e) => {
                warn!(policy = %key, error = %e, "Policy lookup failed");
                self.audit.append(stub, content_id, identity, Decision::Deny).await?;
                return Err(e.into());
            }
        };
        self.audit.append(stub, content_id, identity, decision).await?;

        info!(
            identity = %identity,
            role = %caller.role,
            content_id = %content_id,
            operation = %operation,
            decision = %decision,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Permission checked"
        );
        Ok(decision)
    }

    /// Owner identity of a resource.
    #[instrument(skip(self, stub))]
    pub async fn query_resource_owner(&self, stub: &dyn ChaincodeStub, content_id: &str) -> ContractResult<String> {
        Ok(self.resources.lookup_owner(stub, content_id).await?)
    }

    /// Audit entries for a resource, in key order.
    #[instrument(skip(self, stub))]
    pub async fn trace_resource(&self, stub: &dyn ChaincodeStub, content_id: &str) -> ContractResult<Vec<AccessLog>> {
        let start = Instant::now();
        let entries = self.audit.query_by_resource(stub, content_id).await?;

        info!(
            content_id = %content_id,
            entries = entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Resource traced"
        );
        Ok(entries)
    }

    /// Grants held by `role`, in key order.
    #[instrument(skip(self, stub))]
    pub async fn query_role_grants(&self, stub: &dyn ChaincodeStub, role: &str) -> ContractResult<Vec<PolicyKey>> {
        Ok(self.policies.grants_for_role(stub, role).await?)
    }

    /// Current role set; empty until the first registration.
    #[instrument(skip(self, stub))]
    pub async fn query_role_set(&self, stub: &dyn ChaincodeStub) -> ContractResult<RoleSet> {
        Ok(self.role_sets.current(stub).await?)
    }

    fn verify_binding(
        &self,
        identity: &str,
        content_id: &str,
        signature_b64: &str,
        caller: &Identity,
    ) -> ContractResult<()> {
        let message = SignedMessage::ownership_binding(identity, content_id);
        acmc_auth::verify_with_pem(&message, signature_b64, &caller.public_key).map_err(|e| {
            warn!(identity = %identity, content_id = %content_id, error = %e, "Signature rejected");
            ContractError::from(e)
        })
    }
}
