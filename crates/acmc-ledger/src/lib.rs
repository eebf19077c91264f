//! # ACMC Ledger
//!
//! This crate provides the key-value ledger contract that every other ACMC
//! crate reads and writes through, plus an in-memory ledger that hosts the
//! contract in-process.
//!
//! ## Overview
//!
//! The acmc-ledger crate handles:
//! - **Stub**: The [`ChaincodeStub`] trait (get, put, range scan, composite keys,
//!   transaction id and timestamp)
//! - **Composite Keys**: Namespaced multi-part keys in the platform encoding
//! - **Memory Ledger**: Ordered world state with optimistic concurrency control
//!   (read-set versions and range results validated at commit)
//!
//! ## Transaction Model
//!
//! ```text
//! begin ──► get/put/range (read set recorded, writes buffered)
//!              │
//!              ├─► commit: validate reads ─► apply writes ─► CommitReceipt
//!              │                  └─► MvccReadConflict / PhantomReadConflict
//!              └─► abort / drop: write set discarded
//! ```
//!
//! Reads always observe committed state. A transaction never sees its own
//! buffered writes, the same way the host platform simulates proposals.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use acmc_ledger::{ChaincodeStub, MemoryLedger};
//!
//! async fn example() -> acmc_ledger::LedgerResult<()> {
//!     let ledger = MemoryLedger::new();
//!
//!     let tx = ledger.begin();
//!     tx.put_state("cid-1", b"{}".to_vec()).await?;
//!     tx.commit().await?;
//!
//!     let tx = ledger.begin();
//!     assert!(tx.get_state("cid-1").await?.is_some());
//!     Ok(())
//! }
//! ```

pub mod composite;
pub mod error;
pub mod memory;
pub mod stub;

// Re-export main types for convenience
pub use composite::{create_composite_key, split_composite_key, COMPOSITE_KEY_NAMESPACE, MAX_UNICODE_RUNE};
pub use error::{LedgerError, LedgerResult};
pub use memory::{CommitReceipt, MemoryLedger, MemoryTransaction, Version};
pub use stub::{ChaincodeStub, KeyValue, StateIterator};
