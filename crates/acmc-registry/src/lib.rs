//! # ACMC Registry
//!
//! Identity and resource records for the access-control contract.
//!
//! ## Overview
//!
//! The acmc-registry crate handles:
//! - **Identities**: Write-once mapping of identity string to public key and role
//! - **Resources**: Write-once mapping of content id to owner and creation time
//!
//! ## Architecture
//!
//! ```text
//! Identity  <identity>  => {"pk", "role"}
//!    ▲
//!    │ owner (checked at creation only)
//!    │
//! Resource  <cid>       => {"ownerUID", "cid", "created"}
//! ```
//!
//! Both record kinds live in the same plain key space, so an identity string
//! and a content id can never coincide.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acmc_ledger::MemoryLedger;
//! use acmc_registry::{IdentityRegistry, ResourceRegistry};
//!
//! async fn example(public_pem: &str, signature: &str) {
//!     let ledger = MemoryLedger::new();
//!     let identities = IdentityRegistry::default();
//!     let resources = ResourceRegistry::new(identities.clone());
//!
//!     let tx = ledger.begin();
//!     identities.register(&tx, "user-1", public_pem, "Creator").await.unwrap();
//!     tx.commit().await.unwrap();
//!
//!     let tx = ledger.begin();
//!     resources.create(&tx, signature, "user-1", "QmCid").await.unwrap();
//!     tx.commit().await.unwrap();
//! }
//! ```

pub mod error;
pub mod identity;
mod record;
pub mod resource;

// Re-export main types
pub use error::{RegistryError, RegistryResult};
pub use identity::{Identity, IdentityRegistry};
pub use resource::{Resource, ResourceRegistry};
