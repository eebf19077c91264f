//! Function dispatch
//!
//! Maps invocation requests (a function name plus positional string
//! arguments, as the host platform delivers them) onto contract operations
//! and encodes the results as JSON.

use crate::contract::AccessControlContract;
use crate::error::{ContractError, ContractResult};
use acmc_ledger::{ChaincodeStub, MemoryLedger};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A contract function, under its deployed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    /// `Register(identity, publicKeyPEM, role)`
    Register,
    /// `QueryUserID(identity)`
    QueryUserID,
    /// `AddResource(signature, identity, contentID)`
    AddResource,
    /// `AddPerm(signature, identity, contentID, operation, rolesJSON)`
    AddPerm,
    /// `CheckPerm(signature, operation, identity, contentID)`
    CheckPerm,
    /// `QueryCid(contentID)`
    QueryCid,
    /// `TraceCid(contentID)`
    TraceCid,
    /// `QueryRoleSet()`
    QueryRoleSet,
    /// `QueryGrants(role)`
    QueryGrants,
}

impl Function {
    /// Every function, in declaration order.
    pub const ALL: [Function; 9] = [
        Function::Register,
        Function::QueryUserID,
        Function::AddResource,
        Function::AddPerm,
        Function::CheckPerm,
        Function::QueryCid,
        Function::TraceCid,
        Function::QueryRoleSet,
        Function::QueryGrants,
    ];

    /// Resolve a deployed or descriptive function name.
    ///
    /// # Examples
    ///
    /// ```
    /// use acmc_contract::Function;
    ///
    /// assert_eq!(Function::parse("CheckPerm"), Some(Function::CheckPerm));
    /// assert_eq!(Function::parse("CheckPermission"), Some(Function::CheckPerm));
    /// assert_eq!(Function::parse("Revoke"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Register" | "register" => Some(Function::Register),
            "QueryUserID" | "QueryIdentity" => Some(Function::QueryUserID),
            "AddResource" | "CreateResource" => Some(Function::AddResource),
            "AddPerm" | "GrantPermissions" => Some(Function::AddPerm),
            "CheckPerm" | "CheckPermission" => Some(Function::CheckPerm),
            "QueryCid" | "QueryResourceOwner" => Some(Function::QueryCid),
            "TraceCid" | "TraceResource" => Some(Function::TraceCid),
            "QueryRoleSet" => Some(Function::QueryRoleSet),
            "QueryGrants" | "QueryRoleGrants" => Some(Function::QueryGrants),
            _ => None,
        }
    }

    /// Deployed name.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Register => "Register",
            Function::QueryUserID => "QueryUserID",
            Function::AddResource => "AddResource",
            Function::AddPerm => "AddPerm",
            Function::CheckPerm => "CheckPerm",
            Function::QueryCid => "QueryCid",
            Function::TraceCid => "TraceCid",
            Function::QueryRoleSet => "QueryRoleSet",
            Function::QueryGrants => "QueryGrants",
        }
    }

    /// Number of positional arguments.
    pub fn arity(&self) -> usize {
        match self {
            Function::Register => 3,
            Function::QueryUserID | Function::QueryCid | Function::TraceCid | Function::QueryGrants => 1,
            Function::AddResource => 3,
            Function::AddPerm => 5,
            Function::CheckPerm => 4,
            Function::QueryRoleSet => 0,
        }
    }

    /// Check if the function never writes state.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Function::QueryUserID
                | Function::QueryCid
                | Function::TraceCid
                | Function::QueryRoleSet
                | Function::QueryGrants
        )
    }
}

impl std::fmt::Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// Function that ran (deployed name)
    pub function: Function,

    /// Transaction the call ran in
    pub tx_id: String,

    /// JSON result; `null` for functions without output
    pub payload: serde_json::Value,
}

impl InvokeResponse {
    /// Payload as a string, for functions returning one (owner, decision).
    pub fn payload_str(&self) -> Option<&str> {
        self.payload.as_str()
    }
}

impl AccessControlContract {
    /// Run a function by name against the given transaction.
    ///
    /// # Arguments
    ///
    /// * `stub` - Transaction-scoped ledger access
    /// * `function` - Deployed or descriptive function name
    /// * `args` - Positional arguments
    ///
    /// # Returns
    ///
    /// The JSON-encoded result, `UnknownFunction` for an unrecognized name, or
    /// `MalformedInput` for a wrong argument count
    pub async fn invoke(
        &self,
        stub: &dyn ChaincodeStub,
        function: &str,
        args: &[String],
    ) -> ContractResult<InvokeResponse> {
        let func = Function::parse(function).ok_or_else(|| ContractError::UnknownFunction(function.to_string()))?;
        if args.len() != func.arity() {
            return Err(ContractError::MalformedInput(format!(
                "{} expects {} arguments, got {}",
                func,
                func.arity(),
                args.len()
            )));
        }

        debug!(function = %func, tx_id = %stub.tx_id(), "Dispatching");

        let a = |i: usize| args[i].as_str();
        let payload = match func {
            Function::Register => {
                self.register(stub, a(0), a(1), a(2)).await?;
                serde_json::Value::Null
            }
            Function::QueryUserID => serde_json::to_value(self.query_identity(stub, a(0)).await?)?,
            Function::AddResource => {
                self.create_resource(stub, a(0), a(1), a(2)).await?;
                serde_json::Value::Null
            }
            Function::AddPerm => {
                self.grant_permissions(stub, a(0), a(1), a(2), a(3), a(4)).await?;
                serde_json::Value::Null
            }
            Function::CheckPerm => {
                let decision = self.check_permission(stub, a(0), a(1), a(2), a(3)).await?;
                serde_json::Value::String(decision.as_str().to_string())
            }
            Function::QueryCid => serde_json::Value::String(self.query_resource_owner(stub, a(0)).await?),
            Function::TraceCid => serde_json::to_value(self.trace_resource(stub, a(0)).await?)?,
            Function::QueryRoleSet => serde_json::to_value(self.query_role_set(stub).await?)?,
            Function::QueryGrants => serde_json::to_value(self.query_role_grants(stub, a(0)).await?)?,
        };

        Ok(InvokeResponse {
            function: func,
            tx_id: stub.tx_id().to_string(),
            payload,
        })
    }

    /// Run a function in a fresh transaction and commit it on success.
    ///
    /// Read-only functions are never committed. A failed call is not
    /// committed either, with one exception: a permission check that staged
    /// its `Deny` audit entry before failing (rejected signature or failed
    /// policy lookup) still commits that entry before the error is returned.
    pub async fn submit(&self, ledger: &MemoryLedger, function: &str, args: &[String]) -> ContractResult<InvokeResponse> {
        let tx = ledger.begin();
        match self.invoke(&tx, function, args).await {
            Ok(response) if response.function.is_read_only() => {
                tx.abort();
                Ok(response)
            }
            Ok(response) => {
                tx.commit().await?;
                Ok(response)
            }
            Err(err) => {
                if err.is_server_error() {
                    warn!(function = %function, error = %err, "Submitted call failed");
                } else {
                    debug!(function = %function, error = %err, "Submitted call rejected");
                }

                let audited = Function::parse(function) == Some(Function::CheckPerm);
                if audited && !tx.pending_writes().await.is_empty() {
                    if let Err(commit_err) = tx.commit().await {
                        warn!(function = %function, error = %commit_err, "Failed to commit audit entry for rejected call");
                    }
                } else {
                    tx.abort();
                }
                Err(err)
            }
        }
    }

    /// Run a function in a fresh transaction without committing it.
    pub async fn evaluate(&self, ledger: &MemoryLedger, function: &str, args: &[String]) -> ContractResult<InvokeResponse> {
        let tx = ledger.begin();
        let response = self.invoke(&tx, function, args).await;
        tx.abort();
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_function_names_round_trip() {
        for func in Function::ALL {
            assert_eq!(Function::parse(func.name()), Some(func));
        }
        assert_eq!(Function::parse("register"), Some(Function::Register));
        assert_eq!(Function::parse("GrantPermissions"), Some(Function::AddPerm));
        assert_eq!(Function::parse("QueryRoleGrants"), Some(Function::QueryGrants));
        assert_eq!(Function::parse("checkperm"), None);
    }

    #[test]
    fn test_read_only_functions() {
        assert!(Function::TraceCid.is_read_only());
        assert!(Function::QueryGrants.is_read_only());
        assert!(!Function::CheckPerm.is_read_only());
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let ledger = MemoryLedger::new();
        let err = AccessControlContract::default()
            .evaluate(&ledger, "RevokePerm", &[])
            .await
            .unwrap_err();
        assert_eq!(err, ContractError::UnknownFunction("RevokePerm".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_argument_count() {
        let ledger = MemoryLedger::new();
        let err = AccessControlContract::default()
            .evaluate(&ledger, "QueryCid", &args(&["a", "b"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::MalformedInput(_)));
    }

    #[tokio::test]
    async fn test_query_role_set_before_registration() {
        let ledger = MemoryLedger::new();
        let response = AccessControlContract::default()
            .evaluate(&ledger, "QueryRoleSet", &[])
            .await
            .unwrap();
        assert_eq!(response.function, Function::QueryRoleSet);
        assert_eq!(response.payload, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_submit_does_not_commit_read_only_calls() {
        let ledger = MemoryLedger::new();
        let contract = AccessControlContract::default();
        let response = contract.submit(&ledger, "QueryGrants", &args(&["Creator"])).await.unwrap();
        assert_eq!(response.function, Function::QueryGrants);
        assert_eq!(response.payload, serde_json::json!([]));
        assert_eq!(ledger.height().await, 0);
    }

    #[tokio::test]
    async fn test_submit_discards_failed_registration() {
        let ledger = MemoryLedger::new();
        let contract = AccessControlContract::default();
        let err = contract
            .submit(&ledger, "Register", &args(&["u1", "not a key", "Creator"]))
            .await
            .unwrap_err();
        assert!(!err.is_server_error());
        assert!(ledger.is_empty().await);
        assert_eq!(ledger.height().await, 0);
    }

    #[tokio::test]
    async fn test_evaluate_never_commits() {
        let ledger = MemoryLedger::new();
        let contract = AccessControlContract::default();
        let err = contract
            .evaluate(&ledger, "Register", &args(&["u1", "not a key", "Creator"]))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_KEY_MATERIAL");
        assert!(ledger.is_empty().await);
    }
}
