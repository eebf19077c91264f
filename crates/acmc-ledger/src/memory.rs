//! In-memory ledger implementation
//!
//! An ordered world state with optimistic concurrency control. Transactions
//! record what they read (with versions) and buffer what they write; commit
//! validates the reads against current state and applies the writes as one
//! block. This is suitable for embedding the contract and for testing; it does
//! not order or replicate transactions across peers.

use crate::composite;
use crate::error::{LedgerError, LedgerResult};
use crate::stub::{prefix_end, ChaincodeStub, KeyValue, StateIterator};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Height at which a value was committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Block number of the committing block
    pub block_num: u64,
    /// Position of the transaction within the block
    pub tx_num: u64,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    /// Committed transaction
    pub tx_id: String,
    /// Block the write set was applied in
    pub block_num: u64,
    /// Number of keys read and validated
    pub reads: usize,
    /// Number of keys written
    pub writes: usize,
}

#[derive(Debug, Clone)]
struct VersionedValue {
    value: Vec<u8>,
    version: Version,
}

#[derive(Debug, Default)]
struct WorldState {
    entries: BTreeMap<String, VersionedValue>,
    height: u64,
}

impl WorldState {
    fn version_of(&self, key: &str) -> Option<Version> {
        self.entries.get(key).map(|v| v.version)
    }

    /// Entries in `[start, end)`; an empty `end` is unbounded.
    fn range(&self, start: &str, end: &str) -> Vec<(String, VersionedValue)> {
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            if start > end {
                return Vec::new();
            }
            Bound::Excluded(end)
        };

        self.entries
            .range::<str, _>((Bound::Included(start), upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[derive(Debug)]
struct RangeRead {
    start_key: String,
    end_key: String,
    observed: Vec<(String, Version)>,
}

#[derive(Debug, Default)]
struct ReadWriteSet {
    /// First observed version of each key read (None = absent).
    reads: BTreeMap<String, Option<Version>>,
    ranges: Vec<RangeRead>,
    writes: BTreeMap<String, Vec<u8>>,
}

/// In-memory ledger with MVCC validation at commit.
///
/// # Example
///
/// ```rust,no_run
/// use acmc_ledger::{ChaincodeStub, MemoryLedger};
///
/// async fn example() {
///     let ledger = MemoryLedger::new();
///
///     let tx = ledger.begin();
///     tx.put_state("k", vec![1]).await.unwrap();
///     let receipt = tx.commit().await.unwrap();
///     assert_eq!(receipt.writes, 1);
/// }
/// ```
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<WorldState>>,
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger").finish_non_exhaustive()
    }
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a transaction with a fresh UUID v7 id and the current time.
    pub fn begin(&self) -> MemoryTransaction {
        self.begin_with(uuid::Uuid::now_v7().to_string(), Utc::now())
    }

    /// Start a transaction with an explicit id and timestamp.
    ///
    /// # Arguments
    ///
    /// * `tx_id` - Transaction identifier (must be unique per ledger)
    /// * `timestamp` - Proposal timestamp exposed through the stub
    pub fn begin_with(&self, tx_id: impl Into<String>, timestamp: DateTime<Utc>) -> MemoryTransaction {
        MemoryTransaction {
            tx_id: tx_id.into(),
            timestamp,
            state: Arc::clone(&self.state),
            rwset: Mutex::new(ReadWriteSet::default()),
        }
    }

    /// Number of blocks committed so far.
    pub async fn height(&self) -> u64 {
        self.state.read().await.height
    }

    /// Read a committed value outside any transaction.
    pub async fn committed_value(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().await.entries.get(key).map(|v| v.value.clone())
    }

    /// Number of committed keys, composite keys included.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Check if nothing has been committed.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}

/// A transaction against a [`MemoryLedger`].
///
/// Dropping a transaction without committing discards its write set.
pub struct MemoryTransaction {
    tx_id: String,
    timestamp: DateTime<Utc>,
    state: Arc<RwLock<WorldState>>,
    rwset: Mutex<ReadWriteSet>,
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("tx_id", &self.tx_id)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

impl MemoryTransaction {
    /// Validate the read set and apply the write set atomically.
    ///
    /// # Returns
    ///
    /// A receipt, or `MvccReadConflict`/`PhantomReadConflict` if state the
    /// transaction depended on changed since it was read
    pub async fn commit(self) -> LedgerResult<CommitReceipt> {
        let rwset = self.rwset.into_inner();
        let mut state = self.state.write().await;

        for (key, observed) in &rwset.reads {
            if state.version_of(key) != *observed {
                tracing::debug!(tx_id = %self.tx_id, key = %key, "MVCC read conflict");
                return Err(LedgerError::MvccReadConflict { key: key.clone() });
            }
        }

        for range in &rwset.ranges {
            let current: Vec<(String, Version)> = state
                .range(&range.start_key, &range.end_key)
                .into_iter()
                .map(|(k, v)| (k, v.version))
                .collect();
            if current != range.observed {
                tracing::debug!(tx_id = %self.tx_id, start_key = %range.start_key, "Phantom read conflict");
                return Err(LedgerError::PhantomReadConflict {
                    start_key: range.start_key.clone(),
                    end_key: range.end_key.clone(),
                });
            }
        }

        let block_num = state.height + 1;
        let version = Version { block_num, tx_num: 0 };
        let writes = rwset.writes.len();
        for (key, value) in rwset.writes {
            state.entries.insert(key, VersionedValue { value, version });
        }
        state.height = block_num;

        tracing::debug!(
            tx_id = %self.tx_id,
            block_num,
            reads = rwset.reads.len(),
            writes,
            "Transaction committed"
        );

        Ok(CommitReceipt {
            tx_id: self.tx_id,
            block_num,
            reads: rwset.reads.len(),
            writes,
        })
    }

    /// Discard the transaction.
    pub fn abort(self) {
        tracing::debug!(tx_id = %self.tx_id, "Transaction aborted");
    }

    /// Keys staged for writing, in key order.
    pub async fn pending_writes(&self) -> Vec<String> {
        self.rwset.lock().await.writes.keys().cloned().collect()
    }

    async fn scan(&self, start_key: &str, end_key: &str) -> StateIterator {
        let snapshot = self.state.read().await.range(start_key, end_key);

        self.rwset.lock().await.ranges.push(RangeRead {
            start_key: start_key.to_string(),
            end_key: end_key.to_string(),
            observed: snapshot.iter().map(|(k, v)| (k.clone(), v.version)).collect(),
        });

        StateIterator::new(
            snapshot
                .into_iter()
                .map(|(key, v)| Ok(KeyValue { key, value: v.value })),
        )
    }
}

fn validate_simple_key(key: &str) -> LedgerResult<()> {
    if composite::is_composite_key(key) {
        return Err(LedgerError::InvalidKey(format!(
            "simple key {:?} must not start with the composite key namespace",
            key
        )));
    }
    Ok(())
}

#[async_trait]
impl ChaincodeStub for MemoryTransaction {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    async fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let (value, version) = {
            let state = self.state.read().await;
            match state.entries.get(key) {
                Some(v) => (Some(v.value.clone()), Some(v.version)),
                None => (None, None),
            }
        };

        self.rwset
            .lock()
            .await
            .reads
            .entry(key.to_string())
            .or_insert(version);

        Ok(value)
    }

    async fn put_state(&self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey("empty key".to_string()));
        }
        self.rwset.lock().await.writes.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_state_by_range(&self, start_key: &str, end_key: &str) -> LedgerResult<StateIterator> {
        validate_simple_key(start_key)?;
        validate_simple_key(end_key)?;

        // An empty start must still skip the composite key namespace.
        let start_key = if start_key.is_empty() { "\u{1}" } else { start_key };
        Ok(self.scan(start_key, end_key).await)
    }

    async fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> LedgerResult<StateIterator> {
        let start_key = composite::create_composite_key(object_type, attributes)?;
        let end_key = prefix_end(&start_key);
        Ok(self.scan(&start_key, &end_key).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(ledger: &MemoryLedger, entries: &[(&str, &str)]) {
        let tx = ledger.begin();
        for (key, value) in entries {
            tx.put_state(key, value.as_bytes().to_vec()).await.unwrap();
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("k", vec![1]).await.unwrap();

        // No read-your-own-writes
        assert_eq!(tx.get_state("k").await.unwrap(), None);
        assert_eq!(tx.pending_writes().await, vec!["k".to_string()]);
        assert!(ledger.committed_value("k").await.is_none());

        tx.commit().await.unwrap();
        assert_eq!(ledger.committed_value("k").await, Some(vec![1]));
        assert_eq!(ledger.height().await, 1);
    }

    #[tokio::test]
    async fn test_abort_discards_writes() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        tx.put_state("k", vec![1]).await.unwrap();
        tx.abort();

        assert!(ledger.is_empty().await);
        assert_eq!(ledger.height().await, 0);
    }

    #[tokio::test]
    async fn test_read_conflict_detected() {
        let ledger = MemoryLedger::new();
        seed(&ledger, &[("k", "v1")]).await;

        let reader = ledger.begin();
        reader.get_state("k").await.unwrap();
        reader.put_state("other", vec![1]).await.unwrap();

        let writer = ledger.begin();
        writer.put_state("k", b"v2".to_vec()).await.unwrap();
        writer.commit().await.unwrap();

        let err = reader.commit().await.unwrap_err();
        assert_eq!(err, LedgerError::MvccReadConflict { key: "k".to_string() });
        assert!(ledger.committed_value("other").await.is_none());
    }

    #[tokio::test]
    async fn test_absent_read_conflicts_with_insert() {
        let ledger = MemoryLedger::new();

        let first = ledger.begin();
        let second = ledger.begin();
        assert!(first.get_state("roles").await.unwrap().is_none());
        assert!(second.get_state("roles").await.unwrap().is_none());
        first.put_state("roles", vec![1]).await.unwrap();
        second.put_state("roles", vec![2]).await.unwrap();

        first.commit().await.unwrap();
        assert!(second.commit().await.unwrap_err().is_conflict());
        assert_eq!(ledger.committed_value("roles").await, Some(vec![1]));
    }

    #[tokio::test]
    async fn test_blind_writes_never_conflict() {
        let ledger = MemoryLedger::new();

        let first = ledger.begin();
        let second = ledger.begin();
        first.put_state("same", vec![1]).await.unwrap();
        second.put_state("same", vec![1]).await.unwrap();

        first.commit().await.unwrap();
        second.commit().await.unwrap();
        assert_eq!(ledger.height().await, 2);
    }

    #[tokio::test]
    async fn test_range_scan_order_and_bounds() {
        let ledger = MemoryLedger::new();
        seed(
            &ledger,
            &[("cid_log_b", "2"), ("cid_log_a", "1"), ("cid_lof", "x"), ("cid_loh", "y")],
        )
        .await;

        let tx = ledger.begin();
        let keys: Vec<String> = tx
            .get_state_by_range("cid_log_", "cid_log_\u{FFFF}")
            .await
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["cid_log_a", "cid_log_b"]);
    }

    #[tokio::test]
    async fn test_range_scan_excludes_composite_keys() {
        let ledger = MemoryLedger::new();
        let composite = composite::create_composite_key("policy", &["r", "c", "op"]).unwrap();
        seed(&ledger, &[(composite.as_str(), "1"), ("plain", "v")]).await;

        let tx = ledger.begin();
        let keys: Vec<String> = tx
            .get_state_by_range("", "")
            .await
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(keys, vec!["plain"]);

        assert!(tx.get_state_by_range(&composite, "").await.is_err());
    }

    #[tokio::test]
    async fn test_inverted_range_is_empty() {
        let ledger = MemoryLedger::new();
        seed(&ledger, &[("a", "1"), ("z", "2")]).await;

        let tx = ledger.begin();
        assert_eq!(tx.get_state_by_range("z", "a").await.unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_partial_composite_key_scan() {
        let ledger = MemoryLedger::new();
        let a = composite::create_composite_key("policy", &["Creator", "c1", "read"]).unwrap();
        let b = composite::create_composite_key("policy", &["Creator", "c2", "write"]).unwrap();
        let c = composite::create_composite_key("policy", &["Public", "c1", "read"]).unwrap();
        seed(&ledger, &[(a.as_str(), "1"), (b.as_str(), "1"), (c.as_str(), "1")]).await;

        let tx = ledger.begin();
        let keys: Vec<String> = tx
            .get_state_by_partial_composite_key("policy", &["Creator"])
            .await
            .unwrap()
            .map(|kv| kv.unwrap().key)
            .collect();
        assert_eq!(keys, vec![a, b]);
    }

    #[tokio::test]
    async fn test_phantom_read_detected() {
        let ledger = MemoryLedger::new();
        seed(&ledger, &[("cid_log_a", "1")]).await;

        let scanner = ledger.begin();
        assert_eq!(scanner.get_state_by_range("cid_log_", "cid_log_\u{FFFF}").await.unwrap().count(), 1);

        let appender = ledger.begin();
        appender.put_state("cid_log_b", b"2".to_vec()).await.unwrap();
        appender.commit().await.unwrap();

        assert!(matches!(
            scanner.commit().await,
            Err(LedgerError::PhantomReadConflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_begin_with_exposes_id_and_timestamp() {
        let ledger = MemoryLedger::new();
        let ts = Utc::now();
        let tx = ledger.begin_with("tx-42", ts);
        assert_eq!(tx.tx_id(), "tx-42");
        assert_eq!(tx.tx_timestamp(), ts);

        let receipt = tx.commit().await.unwrap();
        assert_eq!(receipt.tx_id, "tx-42");
        assert_eq!(receipt.writes, 0);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let ledger = MemoryLedger::new();
        let tx = ledger.begin();
        assert!(matches!(tx.put_state("", vec![1]).await, Err(LedgerError::InvalidKey(_))));
    }
}
