//! # ACMC RBAC (Role-Based Access Control)
//!
//! Role set and permission index for the access-control contract.
//!
//! ## Overview
//!
//! The acmc-rbac crate handles:
//! - **Role Set**: The closed list of valid role names, seeded lazily
//! - **Role Lists**: Typed parsing and validation of grant role arguments
//! - **Policy Store**: One composite key per `(role, content_id, operation)`
//! - **Decisions**: `Permit` / `Deny`
//!
//! ## Architecture
//!
//! ```text
//! Permission = Role + Content ID + Operation
//!
//! Examples:
//!   Creator:QmCid:download      - Creators may download QmCid
//!   Public:QmCid:preview        - Anyone registered as Public may preview QmCid
//! ```
//!
//! A permission is a key, not an entry in a shared list. Grants never read
//! before writing and checks never scan, so neither contends with concurrent
//! transactions touching other tuples.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acmc_ledger::MemoryLedger;
//! use acmc_rbac::{Decision, PolicyKey, PolicyStore};
//!
//! async fn example() {
//!     let ledger = MemoryLedger::new();
//!     let store = PolicyStore::default();
//!     let key = PolicyKey::new("Creator", "QmCid", "download");
//!
//!     let tx = ledger.begin();
//!     store.grant(&tx, &key).await.unwrap();
//!     tx.commit().await.unwrap();
//!
//!     let tx = ledger.begin();
//!     let allowed = store.has_permission(&tx, &key).await.unwrap();
//!     assert_eq!(Decision::from_allowed(allowed), Decision::Permit);
//! }
//! ```

pub mod decision;
pub mod error;
pub mod policy;
pub mod roles;

// Re-export main types for convenience
pub use decision::Decision;
pub use error::{RbacError, RbacResult};
pub use policy::{PolicyKey, PolicyStore, DEFAULT_POLICY_NAMESPACE, PRESENCE_MARKER};
pub use roles::{RoleList, RoleSet, RoleSetStore, DEFAULT_ROLES, DEFAULT_ROLE_SET_KEY};
