//! # ACMC Contract
//!
//! Access-control management for content-addressed resources kept on a
//! permissioned key-value ledger.
//!
//! ## Overview
//!
//! The acmc-contract crate handles:
//! - **Contract**: Registration, resource creation, grants and checks
//! - **Audit**: One log entry per adjudicated permission check
//! - **Dispatch**: Function-name invocation with JSON results
//! - **Configuration**: Storage locations and seed roles from the environment
//!
//! ## Architecture
//!
//! ```text
//! invoke(function, args)
//!   └─ AccessControlContract
//!        ├─ IdentityRegistry ──► RoleSetStore (lazy seed)
//!        ├─ ResourceRegistry ──► credential verifier
//!        ├─ PolicyStore       (composite keys, blind writes)
//!        └─ AuditLog          (<cid>_log_<txid>)
//!              │
//!              ▼
//!        ChaincodeStub (one transaction)
//! ```
//!
//! The contract performs no locking and holds no state between calls. Any
//! failure leaves the transaction to be discarded by the host.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acmc_contract::AccessControlContract;
//! use acmc_ledger::MemoryLedger;
//!
//! async fn example(public_pem: String, signature: String) {
//!     let contract = AccessControlContract::default();
//!     let ledger = MemoryLedger::new();
//!
//!     let args = vec!["user-1".to_string(), public_pem, "Creator".to_string()];
//!     contract.submit(&ledger, "Register", &args).await.unwrap();
//!
//!     let args = vec![signature, "user-1".to_string(), "QmCid".to_string()];
//!     contract.submit(&ledger, "AddResource", &args).await.unwrap();
//!
//!     let response = contract
//!         .evaluate(&ledger, "QueryCid", &["QmCid".to_string()])
//!         .await
//!         .unwrap();
//!     assert_eq!(response.payload_str(), Some("user-1"));
//! }
//! ```

pub mod audit;
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;

// Re-export main types for convenience
pub use audit::{AccessLog, AuditLog, DEFAULT_LOG_SEPARATOR};
pub use config::{ConfigError, ContractConfig};
pub use contract::AccessControlContract;
pub use dispatch::{Function, InvokeResponse};
pub use error::{ContractError, ContractResult, ErrorKind};

pub use acmc_rbac::Decision;
